use almanac_core::zone;
use almanac_core::{
    DurationPicker, Endpoint, PickerConfig, PickerDay, PickerSettings, Selection, SinglePicker,
    Week,
};
use anyhow::{Context, anyhow};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::debug;

const LOCAL_FORMAT: &str = "%Y-%m-%dT%H:%M";

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Single,
    #[default]
    Duration,
}

#[derive(Debug, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub mode: Mode,
    #[serde(default)]
    pub config: PickerConfig,
    pub base: String,
    #[serde(default)]
    pub focused: Option<String>,
    #[serde(default)]
    pub picked_start: Option<String>,
    #[serde(default)]
    pub picked_end: Option<String>,
    pub steps: Vec<Step>,
    #[serde(default)]
    pub expect: Option<Outcome>,
}

/// One user interaction. Dates and times
/// are wall clock in the scenario's zone.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    Click { date: String },
    Hover { date: String },
    Leave,
    Hour { value: u32 },
    Minute { value: u32 },
    StartHour { value: u32 },
    StartMinute { value: u32 },
    EndHour { value: u32 },
    EndMinute { value: u32 },
    Type { at: String },
    TypeStart { at: String },
    TypeEnd { at: String },
    NextMonth,
    PreviousMonth,
    NextYear,
    PreviousYear,
    ToggleTime,
    Clear,
    Close,
}

/// What a scenario ends with, in zoned
/// wall clock.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Outcome {
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub view_offset: i32,
}

#[derive(Debug)]
pub struct Run {
    pub outcome: Outcome,
    pub grids: Vec<Vec<Week>>,
    pub rendered: Vec<String>,
}

enum Picker {
    Single(SinglePicker),
    Duration(DurationPicker),
}

pub fn run(scenario: &Scenario) -> anyhow::Result<Run> {
    let tz = scenario.config.timezone();
    let mut settings = PickerSettings::from_config(&scenario.config);
    if let Some(raw) = scenario.focused.as_deref() {
        settings = settings.with_focused(parse_local(tz, raw)?);
    }

    let base = parse_local(tz, &scenario.base)?;
    let picked_start = parse_optional(tz, scenario.picked_start.as_deref())?;
    let picked_end = parse_optional(tz, scenario.picked_end.as_deref())?;

    let mut picker = match scenario.mode {
        Mode::Single => {
            let mut picker = SinglePicker::new(settings);
            picker.open(base, picked_start);
            Picker::Single(picker)
        }
        Mode::Duration => {
            let mut picker = DurationPicker::new(settings);
            picker.open(base, picked_start, picked_end);
            Picker::Duration(picker)
        }
    };

    for (idx, step) in scenario.steps.iter().enumerate() {
        apply(&mut picker, tz, step)
            .with_context(|| format!("step {} ({step:?}) failed", idx + 1))?;
    }

    let (outcome, grids) = match &picker {
        Picker::Single(p) => (
            Outcome {
                start: p.selection().map(|s| format_local(tz, s.instant())),
                end: None,
                view_offset: p.view_offset().months(),
            },
            p.grid().into_iter().collect::<Vec<_>>(),
        ),
        Picker::Duration(p) => (
            Outcome {
                start: p.selection().start().map(|s| format_local(tz, s.instant())),
                end: p.selection().end().map(|e| format_local(tz, e.instant())),
                view_offset: p.view_offset().months(),
            },
            p.grids()
                .map(|(left, right)| vec![left, right])
                .unwrap_or_default(),
        ),
    };
    let rendered = grids
        .iter()
        .map(|weeks| render_grid(&picker, tz, weeks))
        .collect();

    Ok(Run {
        outcome,
        grids,
        rendered,
    })
}

fn apply(picker: &mut Picker, tz: Tz, step: &Step) -> anyhow::Result<()> {
    match (picker, step) {
        (Picker::Single(p), Step::Click { date }) => {
            let day = p.settings().day(parse_local(tz, date)?);
            log_single(p.click_day(&day));
        }
        (Picker::Duration(p), Step::Click { date }) => {
            let day = p.settings().day(parse_local(tz, date)?);
            p.click_day(&day);
        }
        (Picker::Duration(p), Step::Hover { date }) => {
            let day = p.settings().day(parse_local(tz, date)?);
            p.hover(&day);
        }
        (Picker::Duration(p), Step::Leave) => p.leave(),
        (Picker::Single(p), Step::Hour { value }) => log_single(p.select_hour(*value)),
        (Picker::Single(p), Step::Minute { value }) => log_single(p.select_minute(*value)),
        (Picker::Duration(p), Step::StartHour { value }) => {
            p.select_start_hour(*value);
        }
        (Picker::Duration(p), Step::StartMinute { value }) => {
            p.select_start_minute(*value);
        }
        (Picker::Duration(p), Step::EndHour { value }) => {
            p.select_end_hour(*value);
        }
        (Picker::Duration(p), Step::EndMinute { value }) => {
            p.select_end_minute(*value);
        }
        (Picker::Single(p), Step::Type { at }) => {
            log_single(p.select_instant(parse_local(tz, at)?));
        }
        (Picker::Duration(p), Step::TypeStart { at }) => {
            p.select_instant(Endpoint::Start, parse_local(tz, at)?);
        }
        (Picker::Duration(p), Step::TypeEnd { at }) => {
            p.select_instant(Endpoint::End, parse_local(tz, at)?);
        }
        (Picker::Single(p), Step::NextMonth) => p.next_month(),
        (Picker::Single(p), Step::PreviousMonth) => p.previous_month(),
        (Picker::Single(p), Step::NextYear) => p.next_year(),
        (Picker::Single(p), Step::PreviousYear) => p.previous_year(),
        (Picker::Duration(p), Step::NextMonth) => p.next_month(),
        (Picker::Duration(p), Step::PreviousMonth) => p.previous_month(),
        (Picker::Duration(p), Step::NextYear) => p.next_year(),
        (Picker::Duration(p), Step::PreviousYear) => p.previous_year(),
        (Picker::Single(p), Step::ToggleTime) => p.toggle_time_picker(),
        (Picker::Duration(p), Step::ToggleTime) => p.toggle_time_picker(),
        (Picker::Single(p), Step::Clear) => p.clear(),
        (Picker::Duration(p), Step::Clear) => p.clear(),
        (Picker::Single(p), Step::Close) => p.close(),
        (Picker::Duration(p), Step::Close) => p.close(),
        (_, step) => {
            return Err(anyhow!("action {step:?} is not supported in this mode"));
        }
    }
    Ok(())
}

fn log_single(selection: Option<Selection>) {
    debug!(
        instant = ?selection.map(|s| s.instant()),
        "single step applied"
    );
}

/// Draws one month as text rows. `[d]`
/// marks an endpoint or the single
/// selection, `-d-` a day inside the
/// range, `(d)` the focused day and `xd`
/// a disabled day.
fn render_grid(picker: &Picker, tz: Tz, weeks: &[Week]) -> String {
    let mut out = String::new();
    for week in weeks {
        out.push_str(&format!("W{:02} ", week.number));
        for day in &week.days {
            out.push_str(&render_cell(picker, tz, day));
        }
        out.push('\n');
    }
    out
}

fn render_cell(picker: &Picker, tz: Tz, day: &PickerDay) -> String {
    let label = day.date(tz).format("%d").to_string();
    let (selected, between, focused) = match picker {
        Picker::Single(p) => (p.is_selected(day), false, p.is_focused(day)),
        Picker::Duration(p) => {
            let marks = p.marks(day);
            (marks.is_endpoint, marks.is_between, p.is_focused(day))
        }
    };
    if selected {
        format!("[{label}]")
    } else if between {
        format!("-{label}-")
    } else if day.is_disabled() {
        format!(" x{label}")
    } else if focused {
        format!("({label})")
    } else {
        format!(" {label} ")
    }
}

/// Reads `YYYY-MM-DD` or `YYYY-MM-DDTHH:MM`
/// as wall clock in `tz`.
pub fn parse_local(tz: Tz, raw: &str) -> anyhow::Result<DateTime<Utc>> {
    let token = raw.trim();
    let naive = NaiveDateTime::parse_from_str(token, LOCAL_FORMAT)
        .or_else(|_| {
            NaiveDate::parse_from_str(token, "%Y-%m-%d")
                .map(|date| date.and_time(chrono::NaiveTime::MIN))
        })
        .with_context(|| format!("expected YYYY-MM-DD or YYYY-MM-DDTHH:MM, got {token:?}"))?;
    Ok(zone::resolve_local(tz, naive))
}

fn parse_optional(tz: Tz, raw: Option<&str>) -> anyhow::Result<Option<DateTime<Utc>>> {
    raw.map(|raw| parse_local(tz, raw)).transpose()
}

pub fn format_local(tz: Tz, instant: DateTime<Utc>) -> String {
    zone::local(tz, instant).format(LOCAL_FORMAT).to_string()
}
