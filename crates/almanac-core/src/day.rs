//! Calendar day cells as the picker sees
//! them in one zone.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{
  Hash,
  Hasher
};
use std::sync::Arc;

use chrono::{
  DateTime,
  NaiveDate,
  Utc
};
use chrono_tz::Tz;
use serde::{
  Deserialize,
  Serialize
};

use crate::zone::{
  self,
  TimeOfDay
};

/// Inclusive wall-clock window in which
/// a day may be selected.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
pub struct TimeBounds {
  pub start_hour:   u32,
  pub start_minute: u32,
  pub end_hour:     u32,
  pub end_minute:   u32
}

impl TimeBounds {
  #[must_use]
  pub const fn new(
    start_hour: u32,
    start_minute: u32,
    end_hour: u32,
    end_minute: u32
  ) -> Self {
    Self {
      start_hour,
      start_minute,
      end_hour,
      end_minute
    }
  }

  #[must_use]
  pub const fn earliest(
    &self
  ) -> TimeOfDay {
    TimeOfDay::new(
      self.start_hour,
      self.start_minute
    )
  }

  #[must_use]
  pub const fn latest(&self) -> TimeOfDay {
    TimeOfDay::new(
      self.end_hour,
      self.end_minute
    )
  }

  #[must_use]
  pub fn contains(
    &self,
    time: TimeOfDay
  ) -> bool {
    self.earliest() <= time
      && time <= self.latest()
  }

  /// Caps hours at 23 and minutes at
  /// 59, and pulls an end that precedes
  /// the start up to the start.
  #[must_use]
  pub fn normalized(self) -> Self {
    let mut out = Self {
      start_hour:   self
        .start_hour
        .min(23),
      start_minute: self
        .start_minute
        .min(59),
      end_hour:     self.end_hour.min(23),
      end_minute:   self
        .end_minute
        .min(59)
    };
    if out.latest() < out.earliest() {
      out.end_hour = out.start_hour;
      out.end_minute = out.start_minute;
    }
    if out != self {
      tracing::trace!(
        bounds = ?self,
        normalized = ?out,
        "normalized time bounds"
      );
    }
    out
  }
}

pub type DisabledFn = dyn Fn(
    Tz,
    DateTime<Utc>
  ) -> bool
  + Send
  + Sync;
pub type AllowedTimeFn = dyn Fn(
    Tz,
    DateTime<Utc>
  ) -> TimeBounds
  + Send
  + Sync;

/// Caller policy for which days can be
/// picked and at what times.
#[derive(Clone)]
pub struct DayRules {
  is_disabled:         Arc<DisabledFn>,
  allowed_time_of_day:
    Option<Arc<AllowedTimeFn>>
}

impl Default for DayRules {
  fn default() -> Self {
    Self {
      is_disabled:         Arc::new(
        |_, _| false
      ),
      allowed_time_of_day: None
    }
  }
}

impl fmt::Debug for DayRules {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.debug_struct("DayRules")
      .field(
        "allowed_time_of_day",
        &self
          .allowed_time_of_day
          .is_some()
      )
      .finish_non_exhaustive()
  }
}

impl DayRules {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  #[must_use]
  pub fn with_disabled<F>(
    mut self,
    is_disabled: F
  ) -> Self
  where
    F: Fn(Tz, DateTime<Utc>) -> bool
      + Send
      + Sync
      + 'static
  {
    self.is_disabled =
      Arc::new(is_disabled);
    self
  }

  #[must_use]
  pub fn with_allowed_time_of_day<F>(
    mut self,
    allowed: F
  ) -> Self
  where
    F: Fn(
        Tz,
        DateTime<Utc>
      ) -> TimeBounds
      + Send
      + Sync
      + 'static
  {
    self.allowed_time_of_day =
      Some(Arc::new(allowed));
    self
  }

  /// Same window on every day.
  #[must_use]
  pub fn with_fixed_time_of_day(
    self,
    bounds: TimeBounds
  ) -> Self {
    self.with_allowed_time_of_day(
      move |_, _| bounds
    )
  }

  #[must_use]
  pub fn is_disabled(
    &self,
    tz: Tz,
    instant: DateTime<Utc>
  ) -> bool {
    (self.is_disabled)(tz, instant)
  }

  #[must_use]
  pub fn allowed_time_of_day(
    &self,
    tz: Tz,
    instant: DateTime<Utc>
  ) -> Option<TimeBounds> {
    self
      .allowed_time_of_day
      .as_ref()
      .map(|allowed| {
        allowed(tz, instant)
          .normalized()
      })
  }
}

/// One zoned calendar day. Two days are
/// equal when they start at the same
/// instant, whatever their flags.
#[derive(Debug, Clone, Copy)]
pub struct PickerDay {
  start:               DateTime<Utc>,
  end:                 DateTime<Utc>,
  disabled:            bool,
  allowed_time_of_day:
    Option<TimeBounds>
}

impl PartialEq for PickerDay {
  fn eq(&self, other: &Self) -> bool {
    self.start == other.start
  }
}

impl Eq for PickerDay {}

impl Hash for PickerDay {
  fn hash<H: Hasher>(
    &self,
    state: &mut H
  ) {
    self.start.hash(state);
  }
}

impl PartialOrd for PickerDay {
  fn partial_cmp(
    &self,
    other: &Self
  ) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl Ord for PickerDay {
  fn cmp(
    &self,
    other: &Self
  ) -> Ordering {
    self.start.cmp(&other.start)
  }
}

impl PickerDay {
  /// Builds the day containing
  /// `instant`. The day ends where the
  /// next local date starts, so 23 and
  /// 25 hour days and days whose
  /// midnight is skipped come out right.
  #[must_use]
  pub fn build(
    tz: Tz,
    rules: &DayRules,
    instant: DateTime<Utc>
  ) -> Self {
    let date = zone::local_date(tz, instant);
    let start =
      zone::start_of_date(tz, date);
    let end = date.succ_opt().map_or_else(
      || zone::add_days(tz, start, 1),
      |next| zone::start_of_date(tz, next)
    );
    Self {
      start,
      end,
      disabled: rules
        .is_disabled(tz, start),
      allowed_time_of_day: rules
        .allowed_time_of_day(
          tz, start
        )
    }
  }

  #[must_use]
  pub fn start(&self) -> DateTime<Utc> {
    self.start
  }

  #[must_use]
  pub fn end(&self) -> DateTime<Utc> {
    self.end
  }

  #[must_use]
  pub fn is_disabled(&self) -> bool {
    self.disabled
  }

  #[must_use]
  pub fn allowed_time_of_day(
    &self
  ) -> Option<TimeBounds> {
    self.allowed_time_of_day
  }

  #[must_use]
  pub fn date(
    &self,
    tz: Tz
  ) -> NaiveDate {
    zone::local_date(tz, self.start)
  }

  #[must_use]
  pub fn contains(
    &self,
    instant: DateTime<Utc>
  ) -> bool {
    self.start <= instant
      && instant < self.end
  }

  /// Earliest selectable wall clock.
  #[must_use]
  pub fn earliest_time(
    &self
  ) -> TimeOfDay {
    self
      .allowed_time_of_day
      .map_or(TimeOfDay::MIDNIGHT, |b| {
        b.earliest()
      })
  }

  /// Latest selectable wall clock.
  #[must_use]
  pub fn latest_time(&self) -> TimeOfDay {
    self
      .allowed_time_of_day
      .map_or(
        TimeOfDay::LAST_MINUTE,
        |b| b.latest()
      )
  }

  #[must_use]
  pub fn allows(
    &self,
    time: TimeOfDay
  ) -> bool {
    self
      .allowed_time_of_day
      .is_none_or(|b| b.contains(time))
  }

  /// Instant a fresh click on this day
  /// selects: its first legal minute.
  #[must_use]
  pub fn default_instant(
    &self,
    tz: Tz
  ) -> DateTime<Utc> {
    self.at(tz, self.earliest_time())
  }

  /// This day at the given wall clock,
  /// kept inside `[start, end)`.
  #[must_use]
  pub fn at(
    &self,
    tz: Tz,
    time: TimeOfDay
  ) -> DateTime<Utc> {
    let instant = zone::with_time_of_day(
      tz, self.start, time
    );
    if self.contains(instant) {
      instant
    } else {
      self.start
    }
  }
}

/// Builds the day cell containing
/// `instant`.
#[must_use]
pub fn build_picker_day(
  tz: Tz,
  rules: &DayRules,
  instant: DateTime<Utc>
) -> PickerDay {
  PickerDay::build(tz, rules, instant)
}
