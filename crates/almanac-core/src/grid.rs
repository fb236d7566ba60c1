//! Month grids padded to whole weeks.

use chrono::{
  DateTime,
  Datelike,
  Utc,
  Weekday
};
use chrono_tz::Tz;

use crate::day::{
  DayRules,
  PickerDay
};
use crate::zone;

pub const DAYS_PER_WEEK: usize = 7;

/// One row of a month grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Week {
  /// ISO week number of the row.
  pub number: u32,
  pub days:   Vec<PickerDay>
}

/// Builds the weeks covering the zoned
/// month that contains `view_instant`.
///
/// The first row starts on the latest
/// `first_weekday` on or before the 1st
/// and the last row runs to the end of
/// its week, so leading and trailing
/// cells belong to the adjacent months.
/// Those cells go through the same
/// rules as the rest and stay clickable.
#[must_use]
pub fn month_grid(
  tz: Tz,
  rules: &DayRules,
  first_weekday: Weekday,
  view_instant: DateTime<Utc>
) -> Vec<Week> {
  let first_of_month =
    zone::start_of_month(
      tz,
      view_instant
    );
  let last_of_month = zone::add_days(
    tz,
    zone::add_months(
      tz,
      first_of_month,
      1
    ),
    -1
  );

  let lead = days_since(
    zone::local_date(tz, first_of_month)
      .weekday(),
    first_weekday
  );
  let trail = 6
    - days_since(
      zone::local_date(tz, last_of_month)
        .weekday(),
      first_weekday
    );
  let grid_start = zone::add_days(
    tz,
    first_of_month,
    -lead
  );
  let grid_end = zone::add_days(
    tz,
    last_of_month,
    trail
  );

  let mut weeks = Vec::new();
  let mut days =
    Vec::with_capacity(DAYS_PER_WEEK);
  let mut cursor = grid_start;
  while cursor <= grid_end {
    let day =
      PickerDay::build(tz, rules, cursor);
    cursor = day.end();
    days.push(day);
    if days.len() == DAYS_PER_WEEK {
      weeks.push(Week {
        number: week_number(tz, &days),
        days:   std::mem::take(&mut days)
      });
    }
  }

  tracing::trace!(
    timezone = %tz,
    month = %zone::local_date(
      tz,
      first_of_month
    ),
    weeks = weeks.len(),
    "assembled month grid"
  );
  weeks
}

/// Days from the most recent
/// `week_start` to `day`, in `0..7`.
fn days_since(
  day: Weekday,
  week_start: Weekday
) -> i64 {
  let day_idx =
    day.num_days_from_monday() as i64;
  let start_idx = week_start
    .num_days_from_monday()
    as i64;
  (7 + day_idx - start_idx) % 7
}

fn week_number(
  tz: Tz,
  days: &[PickerDay]
) -> u32 {
  days
    .iter()
    .find(|day| {
      day.date(tz).weekday()
        == Weekday::Thu
    })
    .or_else(|| days.first())
    .map_or(0, |day| {
      day.date(tz).iso_week().week()
    })
}
