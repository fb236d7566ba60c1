//! Picking one instant.

use chrono::{
  DateTime,
  Utc
};
use chrono_tz::Tz;

use crate::bounds::{
  SelectableTimes,
  Window
};
use crate::day::{
  DayRules,
  PickerDay
};
use crate::zone::{
  self,
  TimeOfDay
};

/// A picked day and the instant picked
/// on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
  day:     PickerDay,
  instant: DateTime<Utc>
}

impl Selection {
  /// Selects `instant` on `day`, pulled
  /// into the day and its allowed
  /// window.
  #[must_use]
  pub fn clamped(
    tz: Tz,
    day: PickerDay,
    instant: DateTime<Utc>
  ) -> Self {
    let time = if day.contains(instant)
    {
      zone::time_of_day(tz, instant)
    } else {
      day.earliest_time()
    };
    let time =
      Window::of(&day).clamp(time);
    Self::at(tz, day, time)
  }

  pub(crate) fn at(
    tz: Tz,
    day: PickerDay,
    time: TimeOfDay
  ) -> Self {
    Self {
      day,
      instant: day.at(tz, time)
    }
  }

  #[must_use]
  pub fn day(&self) -> PickerDay {
    self.day
  }

  #[must_use]
  pub fn instant(&self) -> DateTime<Utc> {
    self.instant
  }

  #[must_use]
  pub fn time_of_day(
    &self,
    tz: Tz
  ) -> TimeOfDay {
    zone::time_of_day(tz, self.instant)
  }
}

/// Moves the selection to `clicked`.
/// The previous wall clock carries over
/// when the new day allows it,
/// otherwise the new day's earliest
/// legal minute is used.
#[must_use]
pub fn select_day(
  tz: Tz,
  previous: Option<&Selection>,
  clicked: &PickerDay
) -> Selection {
  let carried = previous
    .map(|prev| prev.time_of_day(tz))
    .filter(|time| clicked.allows(*time));
  Selection::at(
    tz,
    *clicked,
    carried.unwrap_or_else(|| {
      clicked.earliest_time()
    })
  )
}

/// Sets the hour, keeping the date. The
/// minute is pulled into whatever the
/// new hour allows; without a previous
/// selection it is that hour's first
/// legal minute.
#[must_use]
pub fn select_hour(
  tz: Tz,
  base_day: &PickerDay,
  selection: Option<&Selection>,
  hour: u32
) -> Selection {
  let (day, current) =
    target(tz, base_day, selection);
  let window = Window::of(&day);
  let time = if selection.is_some() {
    window.clamp_fields(TimeOfDay::new(
      hour,
      current.minute
    ))
  } else {
    window.earliest_in(hour)
  };
  Selection::at(tz, day, time)
}

/// Sets the minute, keeping the date
/// and hour.
#[must_use]
pub fn select_minute(
  tz: Tz,
  base_day: &PickerDay,
  selection: Option<&Selection>,
  minute: u32
) -> Selection {
  let (day, current) =
    target(tz, base_day, selection);
  let window = Window::of(&day);
  Selection::at(
    tz,
    day,
    window.clamp_fields(TimeOfDay::new(
      current.hour,
      minute
    ))
  )
}

/// Selects an instant typed in
/// elsewhere, pulled into its day's
/// window. Disabled days give `None`.
#[must_use]
pub fn select_instant(
  tz: Tz,
  rules: &DayRules,
  instant: DateTime<Utc>
) -> Option<Selection> {
  let day =
    PickerDay::build(tz, rules, instant);
  if day.is_disabled() {
    tracing::debug!(
      %instant,
      "refusing instant on disabled day"
    );
    return None;
  }
  Some(Selection::clamped(tz, day, instant))
}

/// Hours legal on the effective day and
/// minutes legal in its current hour.
#[must_use]
pub fn filter_selectable_times(
  tz: Tz,
  base_day: &PickerDay,
  selection: Option<&Selection>
) -> SelectableTimes {
  let (day, current) =
    target(tz, base_day, selection);
  Window::of(&day)
    .selectable(current.hour)
}

/// The day being edited and its current
/// wall clock. Without a selection the
/// base day is seeded at its earliest
/// legal minute.
fn target(
  tz: Tz,
  base_day: &PickerDay,
  selection: Option<&Selection>
) -> (PickerDay, TimeOfDay) {
  match selection {
    | Some(sel) => {
      (sel.day, sel.time_of_day(tz))
    }
    | None => (
      *base_day,
      Window::of(base_day).earliest()
    )
  }
}
