//! Which month the picker shows,
//! relative to its base month.

use chrono::{
  DateTime,
  Utc
};
use chrono_tz::Tz;

use crate::zone;

/// Months between the base month and the
/// month on screen.
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
)]
pub struct ViewOffset(pub i32);

impl ViewOffset {
  #[must_use]
  pub fn months(self) -> i32 {
    self.0
  }

  #[must_use]
  pub fn next_month(self) -> Self {
    Self(self.0.saturating_add(1))
  }

  #[must_use]
  pub fn previous_month(self) -> Self {
    Self(self.0.saturating_sub(1))
  }

  #[must_use]
  pub fn next_year(self) -> Self {
    Self(self.0.saturating_add(12))
  }

  #[must_use]
  pub fn previous_year(self) -> Self {
    Self(self.0.saturating_sub(12))
  }

  /// An instant inside the month shown
  /// `extra` months after this offset.
  #[must_use]
  pub fn view_instant(
    self,
    tz: Tz,
    base: DateTime<Utc>,
    extra: i32
  ) -> DateTime<Utc> {
    zone::add_months(
      tz,
      zone::start_of_month(tz, base),
      self.0.saturating_add(extra)
    )
  }
}

/// Offset that brings `selected` into
/// view, or zero when nothing is
/// selected.
#[must_use]
pub fn calculate_view_offset(
  tz: Tz,
  base: DateTime<Utc>,
  selected: Option<DateTime<Utc>>
) -> ViewOffset {
  selected.map_or(
    ViewOffset::default(),
    |selected| {
      ViewOffset(zone::months_between(
        tz, base, selected
      ))
    }
  )
}
