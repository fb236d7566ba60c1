//! Which hours and minutes may be offered
//! for a day, optionally narrowed by the
//! other end of a range.

use std::ops::RangeInclusive;

use crate::day::PickerDay;
use crate::zone::TimeOfDay;

/// Values a time control may offer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectableTimes {
  pub hours:   RangeInclusive<u32>,
  pub minutes: RangeInclusive<u32>
}

/// Legal wall-clock window of a day,
/// intersected with optional caps from
/// the other endpoint of a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Window {
  earliest: TimeOfDay,
  latest:   TimeOfDay
}

impl Window {
  pub(crate) fn of(day: &PickerDay) -> Self {
    Self {
      earliest: day.earliest_time(),
      latest:   day.latest_time()
    }
  }

  /// No earlier than `floor`.
  pub(crate) fn not_before(
    mut self,
    floor: Option<TimeOfDay>
  ) -> Self {
    if let Some(floor) = floor {
      self.earliest =
        self.earliest.max(floor);
    }
    self
  }

  /// No later than `ceiling`.
  pub(crate) fn not_after(
    mut self,
    ceiling: Option<TimeOfDay>
  ) -> Self {
    if let Some(ceiling) = ceiling {
      self.latest =
        self.latest.min(ceiling);
    }
    self
  }

  pub(crate) fn hours(
    &self
  ) -> RangeInclusive<u32> {
    self.earliest.hour
      ..=self.latest.hour
  }

  pub(crate) fn minutes(
    &self,
    hour: u32
  ) -> RangeInclusive<u32> {
    let first =
      if hour == self.earliest.hour {
        self.earliest.minute
      } else {
        0
      };
    let last =
      if hour == self.latest.hour {
        self.latest.minute
      } else {
        59
      };
    first..=last
  }

  pub(crate) fn selectable(
    &self,
    hour: u32
  ) -> SelectableTimes {
    SelectableTimes {
      hours:   self.hours(),
      minutes: self.minutes(hour)
    }
  }

  /// Nearest wall clock inside the
  /// window.
  pub(crate) fn clamp(
    &self,
    time: TimeOfDay
  ) -> TimeOfDay {
    if time < self.earliest {
      self.earliest
    } else if time > self.latest {
      self.latest
    } else {
      time
    }
  }

  /// Pulls the hour in first, then the
  /// minute within that hour. Used when
  /// one field is set on purpose and the
  /// other should move as little as
  /// possible.
  pub(crate) fn clamp_fields(
    &self,
    time: TimeOfDay
  ) -> TimeOfDay {
    let hour =
      clamp_to(&self.hours(), time.hour);
    let minute = clamp_to(
      &self.minutes(hour),
      time.minute
    );
    TimeOfDay::new(hour, minute)
  }

  /// First legal minute of `hour`,
  /// after pulling the hour in.
  pub(crate) fn earliest_in(
    &self,
    hour: u32
  ) -> TimeOfDay {
    let hour =
      clamp_to(&self.hours(), hour);
    TimeOfDay::new(
      hour,
      *self.minutes(hour).start()
    )
  }

  pub(crate) fn earliest(
    &self
  ) -> TimeOfDay {
    self.earliest
  }
}

/// Bounded like `Ord::clamp`, but an
/// empty range resolves to its upper end
/// instead of panicking.
fn clamp_to(
  range: &RangeInclusive<u32>,
  value: u32
) -> u32 {
  value
    .max(*range.start())
    .min(*range.end())
}

/// Hours a day allows.
#[must_use]
pub fn selectable_hours(
  day: &PickerDay
) -> RangeInclusive<u32> {
  Window::of(day).hours()
}

/// Minutes a day allows in `hour`.
#[must_use]
pub fn selectable_minutes(
  day: &PickerDay,
  hour: u32
) -> RangeInclusive<u32> {
  Window::of(day).minutes(hour)
}

#[cfg(test)]
mod tests {
  use chrono::{
    TimeZone,
    Utc
  };
  use chrono_tz::UTC;

  use super::*;
  use crate::day::{
    DayRules,
    TimeBounds
  };

  fn day_with(
    bounds: Option<TimeBounds>
  ) -> PickerDay {
    let mut rules = DayRules::new();
    if let Some(bounds) = bounds {
      rules = rules
        .with_fixed_time_of_day(bounds);
    }
    PickerDay::build(
      UTC,
      &rules,
      Utc
        .with_ymd_and_hms(
          2024, 3, 15, 0, 0, 0
        )
        .single()
        .expect("valid instant")
    )
  }

  #[test]
  fn unbounded_day_offers_everything() {
    let day = day_with(None);
    assert_eq!(
      selectable_hours(&day),
      0..=23
    );
    for hour in [0, 7, 23] {
      assert_eq!(
        selectable_minutes(&day, hour),
        0..=59
      );
    }
  }

  #[test]
  fn window_narrows_boundary_hours() {
    let day = day_with(Some(
      TimeBounds::new(9, 15, 17, 30)
    ));
    assert_eq!(
      selectable_hours(&day),
      9..=17
    );
    assert_eq!(
      selectable_minutes(&day, 9),
      15..=59
    );
    assert_eq!(
      selectable_minutes(&day, 12),
      0..=59
    );
    assert_eq!(
      selectable_minutes(&day, 17),
      0..=30
    );
  }

  #[test]
  fn single_hour_window_narrows_both_ends()
  {
    let day = day_with(Some(
      TimeBounds::new(12, 10, 12, 40)
    ));
    assert_eq!(
      selectable_minutes(&day, 12),
      10..=40
    );
  }

  #[test]
  fn caps_narrow_window() {
    let day = day_with(None);
    let window = Window::of(&day)
      .not_before(Some(TimeOfDay::new(
        9, 20
      )))
      .not_after(Some(TimeOfDay::new(
        11, 5
      )));
    assert_eq!(window.hours(), 9..=11);
    assert_eq!(
      window.minutes(9),
      20..=59
    );
    assert_eq!(
      window.minutes(11),
      0..=5
    );
    assert_eq!(
      window.clamp(TimeOfDay::new(
        11, 45
      )),
      TimeOfDay::new(11, 5)
    );
    assert_eq!(
      window.clamp(TimeOfDay::new(
        3, 0
      )),
      TimeOfDay::new(9, 20)
    );
  }

  #[test]
  fn clamp_moves_whole_time() {
    let window = Window::of(&day_with(Some(
      TimeBounds::new(9, 0, 17, 30)
    )));
    assert_eq!(
      window.clamp(TimeOfDay::new(
        19, 5
      )),
      TimeOfDay::new(17, 30)
    );
    assert_eq!(
      window.clamp(TimeOfDay::new(
        8, 30
      )),
      TimeOfDay::new(9, 0)
    );
    assert_eq!(
      window.clamp(TimeOfDay::new(
        12, 45
      )),
      TimeOfDay::new(12, 45)
    );
  }

  #[test]
  fn clamp_fields_keeps_the_set_field() {
    let window = Window::of(&day_with(Some(
      TimeBounds::new(9, 0, 17, 30)
    )));
    assert_eq!(
      window.clamp_fields(TimeOfDay::new(
        19, 5
      )),
      TimeOfDay::new(17, 5)
    );
    assert_eq!(
      window.clamp_fields(TimeOfDay::new(
        17, 45
      )),
      TimeOfDay::new(17, 30)
    );
  }
}
