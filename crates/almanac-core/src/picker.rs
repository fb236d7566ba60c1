//! Picker state owned by a host UI.
//!
//! Hosts keep a `SinglePicker` or a
//! `DurationPicker`, feed it input events
//! one at a time, and read back grids,
//! selectable times and cell styling.
//! Methods that change the committed
//! selection return it so the host can
//! pass it on.

use chrono::{
  DateTime,
  Utc,
  Weekday
};
use chrono_tz::Tz;
use tracing::{
  debug,
  info
};

use crate::bounds::SelectableTimes;
use crate::config::PickerConfig;
use crate::day::{
  DayRules,
  PickerDay
};
use crate::duration::{
  self,
  DurationSelection,
  Endpoint,
  RangeMarks
};
use crate::grid::{
  self,
  Week
};
use crate::single::{
  self,
  Selection
};
use crate::view::{
  self,
  ViewOffset
};

/// Fixed inputs of a picker instance.
#[derive(Debug, Clone)]
pub struct PickerSettings {
  pub zone:          Tz,
  pub rules:         DayRules,
  pub first_weekday: Weekday,
  /// Usually "now"; marks the focused
  /// cell.
  pub focused:       Option<DateTime<Utc>>
}

impl PickerSettings {
  #[must_use]
  pub fn new(zone: Tz) -> Self {
    Self {
      zone,
      rules: DayRules::new(),
      first_weekday: Weekday::Mon,
      focused: None
    }
  }

  #[must_use]
  pub fn from_config(
    config: &PickerConfig
  ) -> Self {
    Self {
      zone:          config.timezone(),
      rules:         config.day_rules(),
      first_weekday: config
        .first_weekday(),
      focused:       None
    }
  }

  #[must_use]
  pub fn with_rules(
    mut self,
    rules: DayRules
  ) -> Self {
    self.rules = rules;
    self
  }

  #[must_use]
  pub fn with_first_weekday(
    mut self,
    first_weekday: Weekday
  ) -> Self {
    self.first_weekday = first_weekday;
    self
  }

  #[must_use]
  pub fn with_focused(
    mut self,
    focused: DateTime<Utc>
  ) -> Self {
    self.focused = Some(focused);
    self
  }

  /// Builds the cell containing
  /// `instant` under these settings.
  #[must_use]
  pub fn day(
    &self,
    instant: DateTime<Utc>
  ) -> PickerDay {
    PickerDay::build(
      self.zone,
      &self.rules,
      instant
    )
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
  Closed,
  Open {
    time_picker_visible: bool,
    base_day:            PickerDay
  }
}

/// State both picker kinds share.
#[derive(Debug, Clone)]
struct Frame {
  settings:    PickerSettings,
  status:      Status,
  view_offset: ViewOffset
}

impl Frame {
  fn new(settings: PickerSettings) -> Self {
    Self {
      settings,
      status: Status::Closed,
      view_offset: ViewOffset::default()
    }
  }

  fn open(
    &mut self,
    base: DateTime<Utc>,
    picked: Option<DateTime<Utc>>
  ) {
    let base_day = self.settings.day(base);
    self.view_offset =
      view::calculate_view_offset(
        self.settings.zone,
        base_day.start(),
        picked
      );
    self.status = Status::Open {
      time_picker_visible: false,
      base_day
    };
  }

  fn base_day(&self) -> Option<PickerDay> {
    match self.status {
      | Status::Open {
        base_day, ..
      } => Some(base_day),
      | Status::Closed => None
    }
  }

  fn toggle_time_picker(&mut self) {
    if let Status::Open {
      time_picker_visible,
      ..
    } = &mut self.status
    {
      *time_picker_visible =
        !*time_picker_visible;
    }
  }

  fn recenter(
    &mut self,
    picked: Option<DateTime<Utc>>
  ) {
    if let (Some(base_day), Some(_)) =
      (self.base_day(), picked)
    {
      self.view_offset =
        view::calculate_view_offset(
          self.settings.zone,
          base_day.start(),
          picked
        );
    }
  }

  /// Accepts a clicked cell unless the
  /// picker is closed or the day is
  /// disabled.
  fn accepts(
    &self,
    day: &PickerDay
  ) -> bool {
    if self.base_day().is_none() {
      debug!(
        "ignoring click on closed picker"
      );
      return false;
    }
    if day.is_disabled() {
      debug!(
        day = %day.start(),
        "ignoring click on disabled day"
      );
      return false;
    }
    true
  }

  fn grid(
    &self,
    extra_months: i32
  ) -> Option<Vec<Week>> {
    let base_day = self.base_day()?;
    let settings = &self.settings;
    Some(grid::month_grid(
      settings.zone,
      &settings.rules,
      settings.first_weekday,
      self.view_offset.view_instant(
        settings.zone,
        base_day.start(),
        extra_months
      )
    ))
  }

  fn is_focused(
    &self,
    day: &PickerDay
  ) -> bool {
    self
      .settings
      .focused
      .is_some_and(|focused| {
        day.contains(focused)
      })
  }

  fn navigate(
    &mut self,
    step: fn(ViewOffset) -> ViewOffset
  ) {
    self.view_offset =
      step(self.view_offset);
  }
}

/// Picker for a single instant.
#[derive(Debug, Clone)]
pub struct SinglePicker {
  frame:     Frame,
  selection: Option<Selection>
}

impl SinglePicker {
  #[must_use]
  pub fn new(
    settings: PickerSettings
  ) -> Self {
    Self {
      frame:     Frame::new(settings),
      selection: None
    }
  }

  /// Opens around `base`, restoring
  /// `picked` and scrolling to it.
  #[tracing::instrument(skip(self))]
  pub fn open(
    &mut self,
    base: DateTime<Utc>,
    picked: Option<DateTime<Utc>>
  ) {
    let settings = &self.frame.settings;
    self.selection = picked.map(|i| {
      Selection::clamped(
        settings.zone,
        settings.day(i),
        i
      )
    });
    self.frame.open(base, picked);
    info!(
      offset = self.frame.view_offset.months(),
      "single picker opened"
    );
  }

  pub fn close(&mut self) {
    self.frame.status = Status::Closed;
    debug!("single picker closed");
  }

  #[must_use]
  pub fn status(&self) -> Status {
    self.frame.status
  }

  #[must_use]
  pub fn is_open(&self) -> bool {
    self.frame.base_day().is_some()
  }

  #[must_use]
  pub fn settings(&self) -> &PickerSettings {
    &self.frame.settings
  }

  #[must_use]
  pub fn selection(&self) -> Option<Selection> {
    self.selection
  }

  #[must_use]
  pub fn view_offset(&self) -> ViewOffset {
    self.frame.view_offset
  }

  pub fn toggle_time_picker(&mut self) {
    self.frame.toggle_time_picker();
  }

  pub fn next_month(&mut self) {
    self.frame.navigate(ViewOffset::next_month);
  }

  pub fn previous_month(&mut self) {
    self
      .frame
      .navigate(ViewOffset::previous_month);
  }

  pub fn next_year(&mut self) {
    self.frame.navigate(ViewOffset::next_year);
  }

  pub fn previous_year(&mut self) {
    self
      .frame
      .navigate(ViewOffset::previous_year);
  }

  /// Weeks of the month on screen, while
  /// open.
  #[must_use]
  pub fn grid(&self) -> Option<Vec<Week>> {
    self.frame.grid(0)
  }

  #[must_use]
  pub fn is_focused(
    &self,
    day: &PickerDay
  ) -> bool {
    self.frame.is_focused(day)
  }

  #[must_use]
  pub fn is_selected(
    &self,
    day: &PickerDay
  ) -> bool {
    self
      .selection
      .is_some_and(|sel| sel.day() == *day)
  }

  #[tracing::instrument(
    skip(self, day),
    fields(day = %day.start())
  )]
  pub fn click_day(
    &mut self,
    day: &PickerDay
  ) -> Option<Selection> {
    if !self.frame.accepts(day) {
      return None;
    }
    let picked = single::select_day(
      self.frame.settings.zone,
      self.selection.as_ref(),
      day
    );
    self.commit(picked)
  }

  pub fn select_hour(
    &mut self,
    hour: u32
  ) -> Option<Selection> {
    let base_day = self.frame.base_day()?;
    let picked = single::select_hour(
      self.frame.settings.zone,
      &base_day,
      self.selection.as_ref(),
      hour
    );
    self.commit(picked)
  }

  pub fn select_minute(
    &mut self,
    minute: u32
  ) -> Option<Selection> {
    let base_day = self.frame.base_day()?;
    let picked = single::select_minute(
      self.frame.settings.zone,
      &base_day,
      self.selection.as_ref(),
      minute
    );
    self.commit(picked)
  }

  /// Applies an instant from a date
  /// input and scrolls to it.
  #[tracing::instrument(skip(self))]
  pub fn select_instant(
    &mut self,
    instant: DateTime<Utc>
  ) -> Option<Selection> {
    if !self.is_open() {
      debug!(
        "ignoring typed instant on closed \
         picker"
      );
      return None;
    }
    let settings = &self.frame.settings;
    let picked = single::select_instant(
      settings.zone,
      &settings.rules,
      instant
    )?;
    self.frame.recenter(Some(picked.instant()));
    self.commit(picked)
  }

  pub fn clear(&mut self) {
    self.selection = None;
  }

  /// Values the time controls may offer.
  #[must_use]
  pub fn selectable_times(
    &self
  ) -> Option<SelectableTimes> {
    let base_day = self.frame.base_day()?;
    Some(single::filter_selectable_times(
      self.frame.settings.zone,
      &base_day,
      self.selection.as_ref()
    ))
  }

  fn commit(
    &mut self,
    picked: Selection
  ) -> Option<Selection> {
    info!(
      instant = %picked.instant(),
      "selection committed"
    );
    self.selection = Some(picked);
    self.selection
  }
}

/// Picker for a start and an end,
/// showing two consecutive months.
#[derive(Debug, Clone)]
pub struct DurationPicker {
  frame:     Frame,
  selection: DurationSelection,
  hovered:   Option<PickerDay>
}

impl DurationPicker {
  #[must_use]
  pub fn new(
    settings: PickerSettings
  ) -> Self {
    Self {
      frame:     Frame::new(settings),
      selection: DurationSelection::default(),
      hovered:   None
    }
  }

  /// Opens around `base`, restoring a
  /// previously picked range and
  /// scrolling to its start.
  #[tracing::instrument(skip(self))]
  pub fn open(
    &mut self,
    base: DateTime<Utc>,
    picked_start: Option<DateTime<Utc>>,
    picked_end: Option<DateTime<Utc>>
  ) {
    let settings = &self.frame.settings;
    let restore = |instant: DateTime<Utc>| {
      Selection::clamped(
        settings.zone,
        settings.day(instant),
        instant
      )
    };
    self.selection = DurationSelection::ordered(
      picked_start.map(restore),
      picked_end.map(restore)
    );
    self.hovered = None;
    let anchor = self
      .selection
      .start()
      .or(self.selection.end())
      .map(|sel| sel.instant());
    self.frame.open(base, anchor);
    info!(
      offset = self.frame.view_offset.months(),
      "duration picker opened"
    );
  }

  pub fn close(&mut self) {
    self.frame.status = Status::Closed;
    self.hovered = None;
    debug!("duration picker closed");
  }

  #[must_use]
  pub fn status(&self) -> Status {
    self.frame.status
  }

  #[must_use]
  pub fn is_open(&self) -> bool {
    self.frame.base_day().is_some()
  }

  #[must_use]
  pub fn settings(&self) -> &PickerSettings {
    &self.frame.settings
  }

  #[must_use]
  pub fn selection(&self) -> DurationSelection {
    self.selection
  }

  #[must_use]
  pub fn hovered(&self) -> Option<PickerDay> {
    self.hovered
  }

  #[must_use]
  pub fn view_offset(&self) -> ViewOffset {
    self.frame.view_offset
  }

  pub fn toggle_time_picker(&mut self) {
    self.frame.toggle_time_picker();
  }

  pub fn next_month(&mut self) {
    self.frame.navigate(ViewOffset::next_month);
  }

  pub fn previous_month(&mut self) {
    self
      .frame
      .navigate(ViewOffset::previous_month);
  }

  pub fn next_year(&mut self) {
    self.frame.navigate(ViewOffset::next_year);
  }

  pub fn previous_year(&mut self) {
    self
      .frame
      .navigate(ViewOffset::previous_year);
  }

  /// Left and right month grids.
  #[must_use]
  pub fn grids(
    &self
  ) -> Option<(Vec<Week>, Vec<Week>)> {
    Some((
      self.frame.grid(0)?,
      self.frame.grid(1)?
    ))
  }

  pub fn hover(&mut self, day: &PickerDay) {
    self.hovered = Some(*day);
  }

  pub fn leave(&mut self) {
    self.hovered = None;
  }

  /// The range as it would be if the
  /// hovered day were clicked.
  #[must_use]
  pub fn preview(&self) -> DurationSelection {
    duration::preview_selection(
      self.frame.settings.zone,
      &self.selection,
      self.hovered.as_ref()
    )
  }

  #[must_use]
  pub fn marks(
    &self,
    day: &PickerDay
  ) -> RangeMarks {
    duration::day_picked_or_between(
      self.frame.settings.zone,
      day,
      self.hovered.as_ref(),
      &self.selection
    )
  }

  #[must_use]
  pub fn is_focused(
    &self,
    day: &PickerDay
  ) -> bool {
    self.frame.is_focused(day)
  }

  #[tracing::instrument(
    skip(self, day),
    fields(day = %day.start())
  )]
  pub fn click_day(
    &mut self,
    day: &PickerDay
  ) -> Option<DurationSelection> {
    if !self.frame.accepts(day) {
      return None;
    }
    let next = duration::select_day(
      self.frame.settings.zone,
      &self.selection,
      day
    );
    Some(self.commit(next, true))
  }

  pub fn select_start_hour(
    &mut self,
    hour: u32
  ) -> Option<DurationSelection> {
    self.edit_time(
      duration::select_start_hour,
      hour
    )
  }

  pub fn select_start_minute(
    &mut self,
    minute: u32
  ) -> Option<DurationSelection> {
    self.edit_time(
      duration::select_start_minute,
      minute
    )
  }

  pub fn select_end_hour(
    &mut self,
    hour: u32
  ) -> Option<DurationSelection> {
    self.edit_time(
      duration::select_end_hour,
      hour
    )
  }

  pub fn select_end_minute(
    &mut self,
    minute: u32
  ) -> Option<DurationSelection> {
    self.edit_time(
      duration::select_end_minute,
      minute
    )
  }

  /// Applies an instant from a date
  /// input to one endpoint.
  #[tracing::instrument(skip(self))]
  pub fn select_instant(
    &mut self,
    endpoint: Endpoint,
    instant: DateTime<Utc>
  ) -> Option<DurationSelection> {
    if !self.is_open() {
      debug!(
        "ignoring typed instant on closed \
         picker"
      );
      return None;
    }
    let settings = &self.frame.settings;
    let next = duration::select_instant(
      settings.zone,
      &settings.rules,
      &self.selection,
      endpoint,
      instant
    );
    if next == self.selection {
      return None;
    }
    Some(self.commit(next, true))
  }

  pub fn clear(&mut self) {
    self.selection = DurationSelection::default();
  }

  #[must_use]
  pub fn selectable_start_times(
    &self
  ) -> Option<SelectableTimes> {
    self.selectable(Endpoint::Start)
  }

  #[must_use]
  pub fn selectable_end_times(
    &self
  ) -> Option<SelectableTimes> {
    self.selectable(Endpoint::End)
  }

  fn selectable(
    &self,
    endpoint: Endpoint
  ) -> Option<SelectableTimes> {
    let base_day = self.frame.base_day()?;
    Some(duration::filter_selectable_times(
      self.frame.settings.zone,
      &base_day,
      &self.selection,
      endpoint
    ))
  }

  fn edit_time(
    &mut self,
    edit: fn(
      Tz,
      &PickerDay,
      &DurationSelection,
      u32
    ) -> DurationSelection,
    value: u32
  ) -> Option<DurationSelection> {
    let base_day = self.frame.base_day()?;
    let next = edit(
      self.frame.settings.zone,
      &base_day,
      &self.selection,
      value
    );
    Some(self.commit(next, false))
  }

  /// Stores `next`. Day clicks and typed
  /// instants that move the start also
  /// scroll the view to it.
  fn commit(
    &mut self,
    next: DurationSelection,
    follow_start: bool
  ) -> DurationSelection {
    let start_moved = next
      .start()
      .map(|s| s.instant())
      != self
        .selection
        .start()
        .map(|s| s.instant());
    if follow_start && start_moved {
      self.frame.recenter(
        next.start().map(|s| s.instant())
      );
    }
    info!(
      start = ?next.start().map(|s| s.instant()),
      end = ?next.end().map(|e| e.instant()),
      "range committed"
    );
    self.selection = next;
    next
  }
}
