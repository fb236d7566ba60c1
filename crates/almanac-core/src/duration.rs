//! Picking a start and an end.
//!
//! Both endpoints are optional on their
//! own; once both exist the start never
//! comes after the end. Day clicks
//! restore that order by swapping, time
//! edits keep it by only ever moving an
//! endpoint inside the range the other
//! endpoint leaves open.

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
use crate::single::Selection;
use crate::zone::TimeOfDay;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
  Start,
  End
}

impl Endpoint {
  fn other(self) -> Self {
    match self {
      | Endpoint::Start => Endpoint::End,
      | Endpoint::End => Endpoint::Start
    }
  }
}

/// A possibly partial range.
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
)]
pub struct DurationSelection {
  start: Option<Selection>,
  end:   Option<Selection>
}

impl DurationSelection {
  /// Builds a range from two
  /// selections, swapping them if they
  /// arrive inverted.
  #[must_use]
  pub fn ordered(
    start: Option<Selection>,
    end: Option<Selection>
  ) -> Self {
    match (start, end) {
      | (Some(s), Some(e))
        if s.instant() > e.instant() =>
      {
        Self {
          start: Some(e),
          end:   Some(s)
        }
      }
      | _ => Self { start, end }
    }
  }

  #[must_use]
  pub fn start(&self) -> Option<Selection> {
    self.start
  }

  #[must_use]
  pub fn end(&self) -> Option<Selection> {
    self.end
  }

  #[must_use]
  pub fn get(
    &self,
    endpoint: Endpoint
  ) -> Option<Selection> {
    match endpoint {
      | Endpoint::Start => self.start,
      | Endpoint::End => self.end
    }
  }

  #[must_use]
  pub fn is_complete(&self) -> bool {
    self.start.is_some()
      && self.end.is_some()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.start.is_none()
      && self.end.is_none()
  }

  /// Both instants, once the range is
  /// complete.
  #[must_use]
  pub fn instants(
    &self
  ) -> Option<(DateTime<Utc>, DateTime<Utc>)>
  {
    Some((
      self.start?.instant(),
      self.end?.instant()
    ))
  }

  fn with(
    mut self,
    endpoint: Endpoint,
    selection: Option<Selection>
  ) -> Self {
    match endpoint {
      | Endpoint::Start => {
        self.start = selection
      }
      | Endpoint::End => {
        self.end = selection
      }
    }
    self
  }
}

/// Cell styling for a range.
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
)]
pub struct RangeMarks {
  pub is_endpoint: bool,
  pub is_between:  bool
}

/// Applies a day click.
///
/// - Nothing picked: the day becomes the
///   start.
/// - One endpoint picked: the day
///   becomes the missing endpoint, and
///   the two trade places if the click
///   lands on the wrong side.
/// - Both picked: clicking the start or
///   end day clears that endpoint (both
///   when they share the day); any other
///   day starts a new range.
#[must_use]
pub fn select_day(
  tz: Tz,
  selection: &DurationSelection,
  clicked: &PickerDay
) -> DurationSelection {
  match (selection.start, selection.end) {
    | (None, None) => {
      DurationSelection {
        start: Some(fresh(tz, clicked)),
        end:   None
      }
    }
    | (Some(start), None) => {
      if *clicked < start.day() {
        let new_start = fresh(tz, clicked);
        DurationSelection {
          start: Some(new_start),
          end:   Some(settle(
            tz,
            &start.day(),
            start.time_of_day(tz),
            Endpoint::End,
            Some(new_start)
          ))
        }
      } else {
        DurationSelection {
          start: Some(start),
          end:   Some(settle(
            tz,
            clicked,
            clicked.earliest_time(),
            Endpoint::End,
            Some(start)
          ))
        }
      }
    }
    | (None, Some(end)) => {
      if *clicked > end.day() {
        let new_end = fresh(tz, clicked);
        DurationSelection {
          start: Some(settle(
            tz,
            &end.day(),
            end.time_of_day(tz),
            Endpoint::Start,
            Some(new_end)
          )),
          end:   Some(new_end)
        }
      } else {
        DurationSelection {
          start: Some(settle(
            tz,
            clicked,
            clicked.earliest_time(),
            Endpoint::Start,
            Some(end)
          )),
          end:   Some(end)
        }
      }
    }
    | (Some(start), Some(end)) => {
      let on_start = *clicked == start.day();
      let on_end = *clicked == end.day();
      match (on_start, on_end) {
        | (true, true) => {
          DurationSelection::default()
        }
        | (true, false) => {
          DurationSelection {
            start: None,
            end:   Some(end)
          }
        }
        | (false, true) => {
          DurationSelection {
            start: Some(start),
            end:   None
          }
        }
        | (false, false) => {
          DurationSelection {
            start: Some(fresh(tz, clicked)),
            end:   None
          }
        }
      }
    }
  }
}

/// What `select_day` would produce for
/// the hovered day. Disabled days and no
/// hover leave the range as it is.
#[must_use]
pub fn preview_selection(
  tz: Tz,
  selection: &DurationSelection,
  hovered: Option<&PickerDay>
) -> DurationSelection {
  match hovered
    .filter(|day| !day.is_disabled())
  {
    | Some(day) => {
      select_day(tz, selection, day)
    }
    | None => *selection
  }
}

/// Classifies `day` against the range as
/// it would look with the hover applied.
#[must_use]
pub fn day_picked_or_between(
  tz: Tz,
  day: &PickerDay,
  hovered: Option<&PickerDay>,
  selection: &DurationSelection
) -> RangeMarks {
  let effective =
    preview_selection(tz, selection, hovered);
  let start =
    effective.start.map(|s| s.day());
  let end = effective.end.map(|e| e.day());

  let is_endpoint = start.as_ref()
    == Some(day)
    || end.as_ref() == Some(day);
  let is_between = match (start, end) {
    | (Some(start), Some(end)) => {
      start < *day && *day < end
    }
    | _ => false
  };

  RangeMarks {
    is_endpoint,
    is_between
  }
}

#[must_use]
pub fn select_start_hour(
  tz: Tz,
  base_day: &PickerDay,
  selection: &DurationSelection,
  hour: u32
) -> DurationSelection {
  set_time(
    tz,
    base_day,
    selection,
    Endpoint::Start,
    TimeEdit::Hour(hour)
  )
}

#[must_use]
pub fn select_start_minute(
  tz: Tz,
  base_day: &PickerDay,
  selection: &DurationSelection,
  minute: u32
) -> DurationSelection {
  set_time(
    tz,
    base_day,
    selection,
    Endpoint::Start,
    TimeEdit::Minute(minute)
  )
}

#[must_use]
pub fn select_end_hour(
  tz: Tz,
  base_day: &PickerDay,
  selection: &DurationSelection,
  hour: u32
) -> DurationSelection {
  set_time(
    tz,
    base_day,
    selection,
    Endpoint::End,
    TimeEdit::Hour(hour)
  )
}

#[must_use]
pub fn select_end_minute(
  tz: Tz,
  base_day: &PickerDay,
  selection: &DurationSelection,
  minute: u32
) -> DurationSelection {
  set_time(
    tz,
    base_day,
    selection,
    Endpoint::End,
    TimeEdit::Minute(minute)
  )
}

/// Hours and minutes the start may take
/// without passing the end.
#[must_use]
pub fn filter_start_selectable_times(
  tz: Tz,
  base_day: &PickerDay,
  selection: &DurationSelection
) -> SelectableTimes {
  filter_selectable_times(
    tz,
    base_day,
    selection,
    Endpoint::Start
  )
}

/// Hours and minutes the end may take
/// without preceding the start.
#[must_use]
pub fn filter_end_selectable_times(
  tz: Tz,
  base_day: &PickerDay,
  selection: &DurationSelection
) -> SelectableTimes {
  filter_selectable_times(
    tz,
    base_day,
    selection,
    Endpoint::End
  )
}

#[must_use]
pub fn filter_selectable_times(
  tz: Tz,
  base_day: &PickerDay,
  selection: &DurationSelection,
  endpoint: Endpoint
) -> SelectableTimes {
  let target =
    target(tz, base_day, selection, endpoint);
  target.window.selectable(
    target.current.hour
  )
}

/// Replaces one endpoint with an
/// instant typed in elsewhere. Disabled
/// days are refused. If the new
/// endpoint lands on the wrong side of
/// the other one, the other one is
/// dropped.
#[must_use]
pub fn select_instant(
  tz: Tz,
  rules: &DayRules,
  selection: &DurationSelection,
  endpoint: Endpoint,
  instant: DateTime<Utc>
) -> DurationSelection {
  let day =
    PickerDay::build(tz, rules, instant);
  if day.is_disabled() {
    tracing::debug!(
      ?endpoint,
      %instant,
      "refusing instant on disabled day"
    );
    return *selection;
  }

  let picked =
    Selection::clamped(tz, day, instant);
  let other = selection
    .get(endpoint.other())
    .filter(|other| {
      match endpoint {
        | Endpoint::Start => {
          picked.instant()
            <= other.instant()
        }
        | Endpoint::End => {
          other.instant()
            <= picked.instant()
        }
      }
    });

  DurationSelection::default()
    .with(endpoint, Some(picked))
    .with(endpoint.other(), other)
}

#[must_use]
pub fn select_start_instant(
  tz: Tz,
  rules: &DayRules,
  selection: &DurationSelection,
  instant: DateTime<Utc>
) -> DurationSelection {
  select_instant(
    tz,
    rules,
    selection,
    Endpoint::Start,
    instant
  )
}

#[must_use]
pub fn select_end_instant(
  tz: Tz,
  rules: &DayRules,
  selection: &DurationSelection,
  instant: DateTime<Utc>
) -> DurationSelection {
  select_instant(
    tz,
    rules,
    selection,
    Endpoint::End,
    instant
  )
}

#[derive(Debug, Clone, Copy)]
enum TimeEdit {
  Hour(u32),
  Minute(u32)
}

/// The endpoint being edited: its day,
/// the window the other endpoint leaves
/// it, and its current wall clock.
struct Target {
  day:     PickerDay,
  window:  Window,
  current: TimeOfDay,
  seeded:  bool
}

fn set_time(
  tz: Tz,
  base_day: &PickerDay,
  selection: &DurationSelection,
  endpoint: Endpoint,
  edit: TimeEdit
) -> DurationSelection {
  let target =
    target(tz, base_day, selection, endpoint);
  let time = match edit {
    | TimeEdit::Hour(hour) => {
      if target.seeded {
        target.window.earliest_in(hour)
      } else {
        target.window.clamp_fields(
          TimeOfDay::new(
            hour,
            target.current.minute
          )
        )
      }
    }
    | TimeEdit::Minute(minute) => {
      target.window.clamp_fields(
        TimeOfDay::new(
          target.current.hour,
          minute
        )
      )
    }
  };

  selection.with(
    endpoint,
    Some(Selection::at(
      tz, target.day, time
    ))
  )
}

fn target(
  tz: Tz,
  base_day: &PickerDay,
  selection: &DurationSelection,
  endpoint: Endpoint
) -> Target {
  let other =
    selection.get(endpoint.other());
  match selection.get(endpoint) {
    | Some(current) => {
      let day = current.day();
      Target {
        day,
        window: window_for(
          tz, &day, endpoint, other
        ),
        current: current.time_of_day(tz),
        seeded: false
      }
    }
    | None => {
      let day =
        seed_day(base_day, endpoint, other);
      let window = window_for(
        tz, &day, endpoint, other
      );
      Target {
        day,
        window,
        current: window.earliest(),
        seeded: true
      }
    }
  }
}

/// Day an unset endpoint starts from.
/// The base day is used unless that
/// would put it on the wrong side of
/// the other endpoint, in which case it
/// joins the other endpoint's day.
fn seed_day(
  base_day: &PickerDay,
  endpoint: Endpoint,
  other: Option<Selection>
) -> PickerDay {
  match (endpoint, other) {
    | (Endpoint::Start, Some(end))
      if *base_day > end.day() =>
    {
      end.day()
    }
    | (Endpoint::End, Some(start))
      if *base_day < start.day() =>
    {
      start.day()
    }
    | _ => *base_day
  }
}

/// The day's window, pinned by the other
/// endpoint when both share the day.
fn window_for(
  tz: Tz,
  day: &PickerDay,
  endpoint: Endpoint,
  other: Option<Selection>
) -> Window {
  let pinned = other
    .filter(|other| other.day() == *day)
    .map(|other| other.time_of_day(tz));
  let window = Window::of(day);
  match endpoint {
    | Endpoint::Start => {
      window.not_after(pinned)
    }
    | Endpoint::End => {
      window.not_before(pinned)
    }
  }
}

fn settle(
  tz: Tz,
  day: &PickerDay,
  time: TimeOfDay,
  endpoint: Endpoint,
  other: Option<Selection>
) -> Selection {
  let window =
    window_for(tz, day, endpoint, other);
  Selection::at(tz, *day, window.clamp(time))
}

fn fresh(
  tz: Tz,
  day: &PickerDay
) -> Selection {
  Selection::at(
    tz,
    *day,
    day.earliest_time()
  )
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;
  use chrono_tz::UTC;

  use super::*;
  use crate::day::TimeBounds;

  fn instant(
    d: u32,
    h: u32,
    min: u32
  ) -> DateTime<Utc> {
    Utc
      .with_ymd_and_hms(2024, 3, d, h, min, 0)
      .single()
      .expect("valid instant")
  }

  fn day(
    rules: &DayRules,
    d: u32
  ) -> PickerDay {
    PickerDay::build(
      UTC,
      rules,
      instant(d, 0, 0)
    )
  }

  fn office_rules() -> DayRules {
    DayRules::new()
      .with_fixed_time_of_day(
        TimeBounds::new(9, 0, 17, 30)
      )
  }

  fn range(
    start: Option<(u32, u32, u32)>,
    end: Option<(u32, u32, u32)>
  ) -> DurationSelection {
    let rules = DayRules::new();
    let pick = |(d, h, m): (u32, u32, u32)| {
      Selection::clamped(
        UTC,
        day(&rules, d),
        instant(d, h, m)
      )
    };
    DurationSelection::ordered(
      start.map(pick),
      end.map(pick)
    )
  }

  fn assert_ordered(
    selection: &DurationSelection
  ) {
    if let Some((start, end)) =
      selection.instants()
    {
      assert!(
        start <= end,
        "inverted range {start} > {end}"
      );
    }
  }

  #[test]
  fn first_click_sets_start() {
    let rules = DayRules::new();
    let sel = select_day(
      UTC,
      &DurationSelection::default(),
      &day(&rules, 10)
    );
    assert_eq!(
      sel.start().map(|s| s.instant()),
      Some(instant(10, 0, 0))
    );
    assert_eq!(sel.end(), None);
  }

  #[test]
  fn earlier_click_swaps_endpoints() {
    let rules = DayRules::new();
    let sel = select_day(
      UTC,
      &DurationSelection::default(),
      &day(&rules, 10)
    );
    let sel =
      select_day(UTC, &sel, &day(&rules, 5));
    assert_eq!(
      sel.instants(),
      Some((
        instant(5, 0, 0),
        instant(10, 0, 0)
      ))
    );
  }

  #[test]
  fn later_click_sets_end() {
    let rules = office_rules();
    let sel = select_day(
      UTC,
      &DurationSelection::default(),
      &day(&rules, 10)
    );
    let sel = select_day(
      UTC,
      &sel,
      &day(&rules, 14)
    );
    assert_eq!(
      sel.instants(),
      Some((
        instant(10, 9, 0),
        instant(14, 9, 0)
      ))
    );
  }

  #[test]
  fn same_day_end_never_precedes_start() {
    let rules = DayRules::new();
    let start = range(
      Some((10, 15, 40)),
      None
    );
    let sel = select_day(
      UTC,
      &start,
      &day(&rules, 10)
    );
    assert_eq!(
      sel.instants(),
      Some((
        instant(10, 15, 40),
        instant(10, 15, 40)
      ))
    );
  }

  #[test]
  fn end_only_swaps_on_later_click() {
    let rules = DayRules::new();
    let sel = range(None, Some((10, 8, 0)));
    let later = select_day(
      UTC,
      &sel,
      &day(&rules, 12)
    );
    assert_eq!(
      later.instants(),
      Some((
        instant(10, 8, 0),
        instant(12, 0, 0)
      ))
    );
    let earlier = select_day(
      UTC,
      &sel,
      &day(&rules, 3)
    );
    assert_eq!(
      earlier.instants(),
      Some((
        instant(3, 0, 0),
        instant(10, 8, 0)
      ))
    );
  }

  #[test]
  fn clicking_endpoints_clears_them() {
    let rules = DayRules::new();
    let sel = range(
      Some((5, 9, 0)),
      Some((10, 17, 0))
    );

    let cleared_start =
      select_day(UTC, &sel, &day(&rules, 5));
    assert_eq!(cleared_start.start(), None);
    assert_eq!(cleared_start.end(), sel.end());

    let cleared_end =
      select_day(UTC, &sel, &day(&rules, 10));
    assert_eq!(
      cleared_end.start(),
      sel.start()
    );
    assert_eq!(cleared_end.end(), None);

    let restarted =
      select_day(UTC, &sel, &day(&rules, 7));
    assert_eq!(
      restarted.start().map(|s| s.day()),
      Some(day(&rules, 7))
    );
    assert_eq!(restarted.end(), None);
  }

  #[test]
  fn clicking_same_day_range_clears_it() {
    let rules = DayRules::new();
    let sel = range(
      Some((10, 9, 0)),
      Some((10, 17, 0))
    );
    let cleared =
      select_day(UTC, &sel, &day(&rules, 10));
    assert!(cleared.is_empty());
  }

  #[test]
  fn end_minutes_respect_start_on_same_day()
  {
    let rules = DayRules::new();
    let base = day(&rules, 10);
    let sel = range(
      Some((10, 9, 0)),
      Some((10, 17, 0))
    );
    let times = filter_end_selectable_times(
      UTC, &base, &sel
    );
    assert_eq!(times.hours, 9..=23);

    let sel = select_end_hour(UTC, &base, &sel, 9);
    let times = filter_end_selectable_times(
      UTC, &base, &sel
    );
    assert_eq!(times.minutes, 0..=59);

    let sel = range(
      Some((10, 9, 25)),
      Some((10, 9, 40))
    );
    let times = filter_end_selectable_times(
      UTC, &base, &sel
    );
    assert_eq!(times.minutes, 25..=59);
    let times =
      filter_start_selectable_times(
        UTC, &base, &sel
      );
    assert_eq!(times.hours, 0..=9);
    assert_eq!(times.minutes, 0..=40);
  }

  #[test]
  fn time_edits_never_invert() {
    let rules = DayRules::new();
    let base = day(&rules, 10);
    let sel = range(
      Some((10, 9, 30)),
      Some((10, 12, 15))
    );

    let late_start =
      select_start_hour(UTC, &base, &sel, 20);
    assert_eq!(
      late_start.instants(),
      Some((
        instant(10, 12, 15),
        instant(10, 12, 15)
      ))
    );

    let early_end =
      select_end_hour(UTC, &base, &sel, 3);
    assert_eq!(
      early_end.instants(),
      Some((
        instant(10, 9, 30),
        instant(10, 9, 30)
      ))
    );

    let early_minute =
      select_end_minute(
        UTC,
        &base,
        &early_end,
        0
      );
    assert_ordered(&early_minute);
    assert_eq!(
      early_minute.end().map(|e| e.instant()),
      Some(instant(10, 9, 30))
    );
  }

  #[test]
  fn time_edits_across_days_are_free() {
    let rules = DayRules::new();
    let base = day(&rules, 10);
    let sel = range(
      Some((10, 9, 30)),
      Some((11, 8, 0))
    );
    let sel =
      select_start_hour(UTC, &base, &sel, 22);
    assert_eq!(
      sel.instants(),
      Some((
        instant(10, 22, 30),
        instant(11, 8, 0)
      ))
    );
  }

  #[test]
  fn unset_endpoint_is_seeded_from_base_day()
  {
    let rules = office_rules();
    let base = day(&rules, 15);
    let sel = select_start_minute(
      UTC,
      &base,
      &DurationSelection::default(),
      30
    );
    assert_eq!(
      sel.start().map(|s| s.instant()),
      Some(instant(15, 9, 30))
    );
    assert_eq!(sel.end(), None);
  }

  #[test]
  fn seeding_stays_on_the_right_side() {
    let rules = DayRules::new();
    let base = day(&rules, 15);
    let sel = range(None, Some((10, 8, 0)));
    let sel =
      select_start_hour(UTC, &base, &sel, 11);
    assert_eq!(
      sel.instants(),
      Some((
        instant(10, 8, 0),
        instant(10, 8, 0)
      ))
    );
  }

  #[test]
  fn preview_matches_click_without_committing()
  {
    let rules = DayRules::new();
    let sel = range(Some((10, 0, 0)), None);
    let hovered = day(&rules, 4);
    let preview = preview_selection(
      UTC,
      &sel,
      Some(&hovered)
    );
    assert_eq!(
      preview,
      select_day(UTC, &sel, &hovered)
    );
    assert_eq!(sel.end(), None);
  }

  #[test]
  fn preview_ignores_disabled_hover() {
    let blocked = DayRules::new()
      .with_disabled(|_, _| true);
    let sel = range(Some((10, 0, 0)), None);
    let preview = preview_selection(
      UTC,
      &sel,
      Some(&day(&blocked, 12))
    );
    assert_eq!(preview, sel);
  }

  #[test]
  fn classification_uses_preview() {
    let rules = DayRules::new();
    let sel = range(Some((10, 0, 0)), None);
    let hovered = day(&rules, 14);

    let marks = day_picked_or_between(
      UTC,
      &day(&rules, 12),
      Some(&hovered),
      &sel
    );
    assert_eq!(
      marks,
      RangeMarks {
        is_endpoint: false,
        is_between:  true
      }
    );

    let marks = day_picked_or_between(
      UTC,
      &day(&rules, 10),
      None,
      &sel
    );
    assert!(marks.is_endpoint);
    assert!(!marks.is_between);

    let marks = day_picked_or_between(
      UTC,
      &day(&rules, 12),
      None,
      &sel
    );
    assert_eq!(marks, RangeMarks::default());
  }

  #[test]
  fn typed_instant_drops_inverted_partner() {
    let rules = DayRules::new();
    let sel = range(
      Some((5, 9, 0)),
      Some((10, 17, 0))
    );
    let moved = select_start_instant(
      UTC,
      &rules,
      &sel,
      instant(12, 8, 0)
    );
    assert_eq!(
      moved.start().map(|s| s.instant()),
      Some(instant(12, 8, 0))
    );
    assert_eq!(moved.end(), None);

    let kept = select_end_instant(
      UTC,
      &rules,
      &sel,
      instant(11, 8, 0)
    );
    assert_eq!(
      kept.instants(),
      Some((
        instant(5, 9, 0),
        instant(11, 8, 0)
      ))
    );
  }

  #[test]
  fn typed_instant_on_disabled_day_is_refused()
  {
    let blocked = DayRules::new()
      .with_disabled(|_, _| true);
    let sel = range(Some((5, 9, 0)), None);
    let same = select_end_instant(
      UTC,
      &blocked,
      &sel,
      instant(8, 9, 0)
    );
    assert_eq!(same, sel);
  }

  #[test]
  fn click_sequences_stay_ordered() {
    let rules = office_rules();
    let clicks = [14, 3, 3, 20, 9, 9, 1, 28, 28, 28];
    let mut sel = DurationSelection::default();
    for d in clicks {
      sel = select_day(
        UTC,
        &sel,
        &day(&rules, d)
      );
      assert_ordered(&sel);
      sel = select_end_hour(
        UTC,
        &day(&rules, d),
        &sel,
        8
      );
      assert_ordered(&sel);
      sel = select_start_minute(
        UTC,
        &day(&rules, d),
        &sel,
        59
      );
      assert_ordered(&sel);
    }
  }
}
