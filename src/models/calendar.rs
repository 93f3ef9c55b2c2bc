//! Holiday calendar models.
//!
//! Companies publish one or more named calendars. A holiday carries category
//! flags so that each employee's [`HolidayPolicy`](super::HolidayPolicy) can
//! decide which holidays are paid days off for them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The category flags a holiday can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HolidayCategory {
    /// Government gazetted public holiday.
    Public,
    /// Bank holiday.
    Bank,
    /// Mercantile (private sector) holiday.
    Mercantile,
    /// Full moon poya day.
    Poya,
}

/// A single calendar holiday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    /// The date of the holiday.
    pub date: NaiveDate,
    /// Category flags for the holiday.
    #[serde(default)]
    pub categories: Vec<HolidayCategory>,
    /// Human-readable summary (e.g. "Vesak Full Moon Poya Day").
    pub summary: String,
}

/// The holiday marker attached to a day of the attendance trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayTag {
    /// Category flags of the matched holiday.
    pub categories: Vec<HolidayCategory>,
    /// Summary of the matched holiday.
    pub summary: String,
}

impl From<&Holiday> for HolidayTag {
    fn from(holiday: &Holiday) -> Self {
        HolidayTag {
            categories: holiday.categories.clone(),
            summary: holiday.summary.clone(),
        }
    }
}

/// A named set of holidays.
///
/// # Example
///
/// ```
/// use salary_engine::models::{Holiday, HolidayCalendar, HolidayCategory};
/// use chrono::NaiveDate;
///
/// let vesak = NaiveDate::from_ymd_opt(2024, 5, 23).unwrap();
/// let calendar = HolidayCalendar {
///     holidays: vec![Holiday {
///         date: vesak,
///         categories: vec![HolidayCategory::Public, HolidayCategory::Poya],
///         summary: "Vesak Full Moon Poya Day".to_string(),
///     }],
/// };
///
/// assert!(calendar.lookup(vesak).is_some());
/// assert!(calendar.lookup(vesak.succ_opt().unwrap()).is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayCalendar {
    /// Holidays in the calendar, in any order.
    #[serde(default)]
    pub holidays: Vec<Holiday>,
}

impl HolidayCalendar {
    /// Looks up the holiday falling on a date, if any.
    pub fn lookup(&self, date: NaiveDate) -> Option<&Holiday> {
        self.holidays.iter().find(|h| h.date == date)
    }
}
