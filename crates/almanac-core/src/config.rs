use std::collections::HashSet;
use std::fs;
use std::path::{
  Path,
  PathBuf
};

use anyhow::Context;
use chrono::{
  Datelike,
  NaiveDate,
  Weekday
};
use chrono_tz::Tz;
use serde::{
  Deserialize,
  Serialize
};
use tracing::{
  debug,
  error,
  info,
  warn
};

use crate::day::{
  DayRules,
  TimeBounds
};
use crate::zone;

const CONFIG_FILE: &str =
  "almanac.toml";
const CONFIG_ENV_VAR: &str =
  "ALMANAC_CONFIG";
const TIMEZONE_ENV_VAR: &str =
  "ALMANAC_TIMEZONE";

fn default_week_start() -> String {
  "monday".to_string()
}

/// Declarative picker settings, as read
/// from `almanac.toml`.
#[derive(
  Debug,
  Clone,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
#[serde(default)]
pub struct PickerConfig {
  pub timezone:            Option<String>,
  pub week_start:          String,
  pub allowed_time_of_day:
    Option<TimeBounds>,
  pub disabled_weekdays:   Vec<String>,
  pub disabled_before:
    Option<NaiveDate>,
  pub disabled_after:
    Option<NaiveDate>
}

impl Default for PickerConfig {
  fn default() -> Self {
    Self {
      timezone:            None,
      week_start:
        default_week_start(),
      allowed_time_of_day: None,
      disabled_weekdays:   Vec::new(),
      disabled_before:     None,
      disabled_after:      None
    }
  }
}

impl PickerConfig {
  /// Loads the config from `path`, or
  /// from `$ALMANAC_CONFIG`, or from
  /// `~/almanac.toml`. Missing files
  /// mean defaults; unreadable or
  /// malformed files are errors.
  #[tracing::instrument]
  pub fn load(
    path: Option<&Path>
  ) -> anyhow::Result<Self> {
    let Some(path) = resolve_config_path(
      path
    ) else {
      info!(
        "no picker config found; \
         using defaults"
      );
      return Ok(Self::default());
    };

    info!(
      file = %path.display(),
      "loading picker config"
    );
    let raw = fs::read_to_string(&path)
      .with_context(|| {
        format!(
          "failed to read {}",
          path.display()
        )
      })?;
    Self::from_toml_str(&raw)
      .with_context(|| {
        format!(
          "failed to parse {}",
          path.display()
        )
      })
  }

  pub fn from_toml_str(
    raw: &str
  ) -> anyhow::Result<Self> {
    let mut config =
      toml::from_str::<Self>(raw)
        .context(
          "invalid picker config"
        )?;
    config.sanitize();
    Ok(config)
  }

  fn sanitize(&mut self) {
    if self.week_start.trim().is_empty()
    {
      self.week_start =
        default_week_start();
    }

    if let Some(bounds) =
      self.allowed_time_of_day
    {
      let normalized =
        bounds.normalized();
      if normalized != bounds {
        warn!(
          ?bounds,
          ?normalized,
          "allowed_time_of_day was out \
           of range; normalized"
        );
      }
      self.allowed_time_of_day =
        Some(normalized);
    }

    if let (Some(before), Some(after)) =
      (self.disabled_before, self.disabled_after)
      && after < before
    {
      warn!(
        %before,
        %after,
        "disabled_after precedes \
         disabled_before; every day \
         is disabled"
      );
    }
  }

  /// Configured zone, else
  /// `$ALMANAC_TIMEZONE`, else UTC.
  #[must_use]
  pub fn timezone(&self) -> Tz {
    if let Some(raw) =
      self.timezone.as_deref()
      && let Some(tz) =
        parse_timezone(raw, "config")
    {
      return tz;
    }

    if let Ok(raw) =
      std::env::var(TIMEZONE_ENV_VAR)
      && let Some(tz) = parse_timezone(
        &raw,
        TIMEZONE_ENV_VAR
      )
    {
      return tz;
    }

    chrono_tz::UTC
  }

  #[must_use]
  pub fn first_weekday(&self) -> Weekday {
    parse_weekday_name(&self.week_start)
      .unwrap_or_else(|| {
        error!(
          week_start = %self.week_start,
          "unknown week_start; using \
           monday"
        );
        Weekday::Mon
      })
  }

  /// Turns the declarative limits into
  /// day rules.
  #[must_use]
  pub fn day_rules(&self) -> DayRules {
    let weekdays = self
      .disabled_weekdays
      .iter()
      .filter_map(|name| {
        let parsed =
          parse_weekday_name(name);
        if parsed.is_none() {
          error!(
            weekday = %name,
            "unknown disabled weekday; \
             ignoring"
          );
        }
        parsed
      })
      .collect::<HashSet<_>>();
    let before = self.disabled_before;
    let after = self.disabled_after;
    debug!(
      weekdays = weekdays.len(),
      ?before,
      ?after,
      "building day rules"
    );

    let mut rules = DayRules::new()
      .with_disabled(move |tz, start| {
        let date =
          zone::local_date(tz, start);
        weekdays.contains(&date.weekday())
          || before
            .is_some_and(|b| date < b)
          || after
            .is_some_and(|a| date > a)
      });
    if let Some(bounds) =
      self.allowed_time_of_day
    {
      rules = rules
        .with_fixed_time_of_day(bounds);
    }
    rules
  }
}

fn resolve_config_path(
  override_path: Option<&Path>
) -> Option<PathBuf> {
  if let Some(path) = override_path {
    return Some(path.to_path_buf());
  }

  if let Ok(raw) =
    std::env::var(CONFIG_ENV_VAR)
  {
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
      return Some(PathBuf::from(
        trimmed
      ));
    }
  }

  let candidate =
    dirs::home_dir()?.join(CONFIG_FILE);
  if candidate.exists() {
    Some(candidate)
  } else {
    None
  }
}

fn parse_timezone(
  raw: &str,
  source: &str
) -> Option<Tz> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    warn!(
      source,
      "timezone source was empty"
    );
    return None;
  }

  match trimmed.parse::<Tz>() {
    | Ok(tz) => Some(tz),
    | Err(err) => {
      error!(
        source,
        timezone = %trimmed,
        error = %err,
        "failed to parse timezone id"
      );
      None
    }
  }
}

fn parse_weekday_name(
  token: &str
) -> Option<Weekday> {
  match token
    .trim()
    .to_ascii_lowercase()
    .as_str()
  {
    | "monday" | "mon" => {
      Some(Weekday::Mon)
    }
    | "tuesday" | "tue" | "tues" => {
      Some(Weekday::Tue)
    }
    | "wednesday" | "wed" => {
      Some(Weekday::Wed)
    }
    | "thursday" | "thu" | "thur"
    | "thurs" => Some(Weekday::Thu),
    | "friday" | "fri" => {
      Some(Weekday::Fri)
    }
    | "saturday" | "sat" => {
      Some(Weekday::Sat)
    }
    | "sunday" | "sun" => {
      Some(Weekday::Sun)
    }
    | _ => None
  }
}
