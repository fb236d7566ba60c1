//! Calendar day model and selection
//! engine for date/time pickers.
//!
//! Everything here is a pure function of
//! its inputs: a zone, caller rules for
//! which days and times are legal, and
//! the current selection. Rendering,
//! input parsing and event plumbing are
//! left to the host.

pub mod bounds;
pub mod config;
pub mod day;
pub mod duration;
pub mod grid;
pub mod picker;
pub mod single;
pub mod view;
pub mod zone;

pub use bounds::SelectableTimes;
pub use config::PickerConfig;
pub use day::{
  DayRules,
  PickerDay,
  TimeBounds,
  build_picker_day
};
pub use duration::{
  DurationSelection,
  Endpoint,
  RangeMarks
};
pub use grid::{
  Week,
  month_grid
};
pub use picker::{
  DurationPicker,
  PickerSettings,
  SinglePicker,
  Status
};
pub use single::Selection;
pub use view::{
  ViewOffset,
  calculate_view_offset
};
pub use zone::TimeOfDay;
