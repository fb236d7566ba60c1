//! Zoned civil-time helpers over UTC
//! instants.
//!
//! Every calendar computation in the
//! picker goes through here: instants
//! are always `DateTime<Utc>` and the
//! zone decides what "midnight" or "the
//! same month" means.

use chrono::{
  DateTime,
  Datelike,
  Duration,
  LocalResult,
  NaiveDate,
  NaiveDateTime,
  NaiveTime,
  TimeZone,
  Timelike,
  Utc
};
use chrono_tz::Tz;

/// Upper bound on how far a
/// nonexistent local time is pushed
/// forward; covers whole skipped days.
const GAP_SEARCH_LIMIT: Duration =
  Duration::hours(48);
const GAP_SEARCH_STEP: Duration =
  Duration::minutes(15);

/// Hour and minute of a zoned instant.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
)]
pub struct TimeOfDay {
  pub hour:   u32,
  pub minute: u32
}

impl TimeOfDay {
  pub const MIDNIGHT: TimeOfDay =
    TimeOfDay { hour: 0, minute: 0 };
  pub const LAST_MINUTE: TimeOfDay =
    TimeOfDay {
      hour:   23,
      minute: 59
    };

  #[must_use]
  pub const fn new(
    hour: u32,
    minute: u32
  ) -> Self {
    Self { hour, minute }
  }
}

#[must_use]
pub fn local(
  tz: Tz,
  instant: DateTime<Utc>
) -> DateTime<Tz> {
  instant.with_timezone(&tz)
}

#[must_use]
pub fn local_date(
  tz: Tz,
  instant: DateTime<Utc>
) -> NaiveDate {
  local(tz, instant).date_naive()
}

#[must_use]
pub fn time_of_day(
  tz: Tz,
  instant: DateTime<Utc>
) -> TimeOfDay {
  let local = local(tz, instant);
  TimeOfDay::new(
    local.hour(),
    local.minute()
  )
}

/// Maps a zone-local wall-clock time to
/// an instant. Ambiguous times take the
/// earliest candidate; times inside a
/// gap move forward to the first local
/// time that exists.
#[must_use]
pub fn resolve_local(
  tz: Tz,
  naive: NaiveDateTime
) -> DateTime<Utc> {
  let mut candidate = naive;
  let limit = naive + GAP_SEARCH_LIMIT;

  while candidate <= limit {
    match tz
      .from_local_datetime(&candidate)
    {
      | LocalResult::Single(dt) => {
        if candidate != naive {
          tracing::trace!(
            timezone = %tz,
            requested = %naive,
            resolved = %candidate,
            "local time fell in a gap"
          );
        }
        return dt.with_timezone(&Utc);
      }
      | LocalResult::Ambiguous(
        first,
        second
      ) => {
        let chosen = if first <= second
        {
          first
        } else {
          second
        };
        return chosen
          .with_timezone(&Utc);
      }
      | LocalResult::None => {
        candidate += GAP_SEARCH_STEP;
      }
    }
  }

  tracing::warn!(
    timezone = %tz,
    requested = %naive,
    "no valid local time near \
     request; reading it as UTC"
  );
  Utc.from_utc_datetime(&naive)
}

/// Zone-local midnight of the day
/// containing `instant`.
#[must_use]
pub fn start_of_day(
  tz: Tz,
  instant: DateTime<Utc>
) -> DateTime<Utc> {
  start_of_date(
    tz,
    local_date(tz, instant)
  )
}

/// First instant of `date` in `tz`:
/// local midnight, or the first local
/// time after it when midnight is
/// skipped.
#[must_use]
pub fn start_of_date(
  tz: Tz,
  date: NaiveDate
) -> DateTime<Utc> {
  resolve_local(
    tz,
    date.and_time(NaiveTime::MIN)
  )
}

/// Calendar addition of whole days:
/// the wall clock is kept and the
/// instant moves by however long those
/// days actually are in `tz`.
#[must_use]
pub fn add_days(
  tz: Tz,
  instant: DateTime<Utc>,
  days: i64
) -> DateTime<Utc> {
  let naive =
    local(tz, instant).naive_local();
  match naive.checked_add_signed(
    Duration::days(days)
  ) {
    | Some(shifted) => {
      resolve_local(tz, shifted)
    }
    | None => instant
  }
}

/// Zone-local midnight of the first
/// day of the month containing
/// `instant`.
#[must_use]
pub fn start_of_month(
  tz: Tz,
  instant: DateTime<Utc>
) -> DateTime<Utc> {
  let date = local_date(tz, instant);
  resolve_local(
    tz,
    first_day_of_month(
      date.year(),
      date.month()
    )
    .and_time(NaiveTime::MIN)
  )
}

/// Calendar addition of months. The
/// day of month is clamped to the
/// target month's length and the wall
/// clock is kept.
#[must_use]
pub fn add_months(
  tz: Tz,
  instant: DateTime<Utc>,
  months: i32
) -> DateTime<Utc> {
  let naive =
    local(tz, instant).naive_local();
  let date =
    shift_months(naive.date(), months);
  resolve_local(
    tz,
    date.and_time(naive.time())
  )
}

/// Whole calendar months from the month
/// of `from` to the month of `to`.
#[must_use]
pub fn months_between(
  tz: Tz,
  from: DateTime<Utc>,
  to: DateTime<Utc>
) -> i32 {
  let from = local_date(tz, from);
  let to = local_date(tz, to);
  month_index(to) - month_index(from)
}

/// Same zoned date as `instant`, with
/// the wall clock set to `time`.
#[must_use]
pub fn with_time_of_day(
  tz: Tz,
  instant: DateTime<Utc>,
  time: TimeOfDay
) -> DateTime<Utc> {
  let date = local_date(tz, instant);
  match NaiveTime::from_hms_opt(
    time.hour,
    time.minute,
    0
  ) {
    | Some(clock) => {
      resolve_local(
        tz,
        date.and_time(clock)
      )
    }
    | None => {
      tracing::debug!(
        hour = time.hour,
        minute = time.minute,
        "invalid wall clock; keeping \
         instant"
      );
      instant
    }
  }
}

fn month_index(date: NaiveDate) -> i32 {
  date.year() * 12 + date.month0() as i32
}

fn shift_months(
  date: NaiveDate,
  months: i32
) -> NaiveDate {
  let index = month_index(date)
    .saturating_add(months);
  let year = index.div_euclid(12);
  let month =
    index.rem_euclid(12) as u32 + 1;
  let day = date
    .day()
    .min(days_in_month(year, month));
  NaiveDate::from_ymd_opt(
    year, month, day
  )
  .unwrap_or(date)
}

fn first_day_of_month(
  year: i32,
  month: u32
) -> NaiveDate {
  NaiveDate::from_ymd_opt(
    year, month, 1
  )
  .unwrap_or(NaiveDate::MIN)
}

fn days_in_month(
  year: i32,
  month: u32
) -> u32 {
  let (next_year, next_month) =
    if month >= 12 {
      (year.saturating_add(1), 1_u32)
    } else {
      (year, month + 1)
    };
  first_day_of_month(
    next_year, next_month
  )
  .pred_opt()
  .map_or(31, |last| last.day())
}

#[cfg(test)]
mod tests {
  use chrono::{
    TimeZone,
    Utc
  };
  use chrono_tz::America::New_York;
  use chrono_tz::UTC;

  use super::*;

  #[test]
  fn start_of_day_uses_zone_midnight() {
    let instant = Utc
      .with_ymd_and_hms(
        2024, 3, 15, 3, 30, 0
      )
      .single()
      .expect("valid instant");
    let midnight =
      start_of_day(New_York, instant);
    assert_eq!(
      midnight,
      Utc
        .with_ymd_and_hms(
          2024, 3, 14, 4, 0, 0
        )
        .single()
        .expect("valid midnight")
    );
  }

  #[test]
  fn add_days_spans_short_dst_day() {
    let midnight = Utc
      .with_ymd_and_hms(
        2024, 3, 10, 5, 0, 0
      )
      .single()
      .expect("valid midnight");
    let next =
      add_days(New_York, midnight, 1);
    assert_eq!(
      next - midnight,
      Duration::hours(23)
    );
  }

  #[test]
  fn gap_resolves_forward() {
    let naive = NaiveDate::from_ymd_opt(
      2024, 3, 10
    )
    .and_then(|d| {
      d.and_hms_opt(2, 30, 0)
    })
    .expect("valid naive");
    let resolved =
      resolve_local(New_York, naive);
    assert_eq!(
      time_of_day(New_York, resolved),
      TimeOfDay::new(3, 0)
    );
  }

  #[test]
  fn ambiguous_resolves_earliest() {
    let naive = NaiveDate::from_ymd_opt(
      2024, 11, 3
    )
    .and_then(|d| {
      d.and_hms_opt(1, 30, 0)
    })
    .expect("valid naive");
    let resolved =
      resolve_local(New_York, naive);
    assert_eq!(
      resolved,
      Utc
        .with_ymd_and_hms(
          2024, 11, 3, 5, 30, 0
        )
        .single()
        .expect("valid instant")
    );
  }

  #[test]
  fn add_months_clamps_day() {
    let jan31 = Utc
      .with_ymd_and_hms(
        2024, 1, 31, 12, 0, 0
      )
      .single()
      .expect("valid instant");
    let shifted =
      add_months(UTC, jan31, 1);
    assert_eq!(
      local_date(UTC, shifted),
      NaiveDate::from_ymd_opt(
        2024, 2, 29
      )
      .expect("valid date")
    );
    let back =
      add_months(UTC, jan31, -13);
    assert_eq!(
      local_date(UTC, back),
      NaiveDate::from_ymd_opt(
        2022, 12, 31
      )
      .expect("valid date")
    );
  }

  #[test]
  fn months_between_counts_calendar_months()
  {
    let from = Utc
      .with_ymd_and_hms(
        2023, 11, 30, 0, 0, 0
      )
      .single()
      .expect("valid instant");
    let to = Utc
      .with_ymd_and_hms(
        2024, 2, 1, 0, 0, 0
      )
      .single()
      .expect("valid instant");
    assert_eq!(
      months_between(UTC, from, to),
      3
    );
    assert_eq!(
      months_between(UTC, to, from),
      -3
    );
  }
}
