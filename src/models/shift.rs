//! Shift and working-day models.
//!
//! This module defines the [`ShiftDefinition`] an employee is rostered on and
//! the [`WorkingDayPolicy`] that says how much of that shift is expected on
//! each weekday.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How much of the shift is expected on a given weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayKind {
    /// The whole shift is expected.
    Full,
    /// Half of the shift's working time is expected, starting at shift start.
    Half,
    /// Not a working day.
    Off,
}

impl DayKind {
    /// Returns the fraction of a working day this kind counts as.
    pub fn units(self) -> Decimal {
        match self {
            DayKind::Full => Decimal::ONE,
            DayKind::Half => Decimal::new(5, 1),
            DayKind::Off => Decimal::ZERO,
        }
    }
}

/// A rostered shift: start, end and the unpaid break taken inside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftDefinition {
    /// Time of day the shift starts.
    pub start: NaiveTime,
    /// Time of day the shift ends. An end before the start crosses midnight.
    pub end: NaiveTime,
    /// Length of the unpaid break in minutes.
    #[serde(default)]
    pub break_minutes: i64,
}

/// The expected attendance window for one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpectedWindow {
    /// When the employee is expected to arrive.
    pub start: DateTime<Utc>,
    /// When the employee may leave; time after this is overtime.
    pub end: DateTime<Utc>,
    /// Expected working minutes, excluding the break.
    pub working_minutes: i64,
}

impl ShiftDefinition {
    /// Returns the shift length in minutes including the break.
    pub fn span_minutes(&self) -> i64 {
        let span = (self.end - self.start).num_minutes();
        if span < 0 { span + 24 * 60 } else { span }
    }

    /// Returns the expected working minutes for a day kind.
    ///
    /// # Example
    ///
    /// ```
    /// use salary_engine::models::{DayKind, ShiftDefinition};
    /// use chrono::NaiveTime;
    ///
    /// let shift = ShiftDefinition {
    ///     start: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
    ///     end: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
    ///     break_minutes: 60,
    /// };
    /// assert_eq!(shift.working_minutes(DayKind::Full), 480);
    /// assert_eq!(shift.working_minutes(DayKind::Half), 240);
    /// assert_eq!(shift.working_minutes(DayKind::Off), 0);
    /// ```
    pub fn working_minutes(&self, kind: DayKind) -> i64 {
        let full = (self.span_minutes() - self.break_minutes).max(0);
        match kind {
            DayKind::Full => full,
            DayKind::Half => full / 2,
            DayKind::Off => 0,
        }
    }

    /// Returns the expected window on a date, or `None` on an off day.
    pub fn expected_window(&self, date: NaiveDate, kind: DayKind) -> Option<ExpectedWindow> {
        let working_minutes = self.working_minutes(kind);
        let end_offset = match kind {
            DayKind::Full => self.span_minutes(),
            DayKind::Half => working_minutes,
            DayKind::Off => return None,
        };

        let start = date.and_time(self.start).and_utc();
        Some(ExpectedWindow {
            start,
            end: start + Duration::minutes(end_offset),
            working_minutes,
        })
    }
}

/// Weekday to [`DayKind`] mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingDayPolicy {
    /// Monday.
    pub monday: DayKind,
    /// Tuesday.
    pub tuesday: DayKind,
    /// Wednesday.
    pub wednesday: DayKind,
    /// Thursday.
    pub thursday: DayKind,
    /// Friday.
    pub friday: DayKind,
    /// Saturday.
    pub saturday: DayKind,
    /// Sunday.
    pub sunday: DayKind,
}

impl Default for WorkingDayPolicy {
    fn default() -> Self {
        Self {
            monday: DayKind::Full,
            tuesday: DayKind::Full,
            wednesday: DayKind::Full,
            thursday: DayKind::Full,
            friday: DayKind::Full,
            saturday: DayKind::Half,
            sunday: DayKind::Off,
        }
    }
}

impl WorkingDayPolicy {
    /// Returns the day kind configured for a weekday.
    pub fn kind_for(&self, weekday: Weekday) -> DayKind {
        match weekday {
            Weekday::Mon => self.monday,
            Weekday::Tue => self.tuesday,
            Weekday::Wed => self.wednesday,
            Weekday::Thu => self.thursday,
            Weekday::Fri => self.friday,
            Weekday::Sat => self.saturday,
            Weekday::Sun => self.sunday,
        }
    }
}
