//! Attendance models.
//!
//! Raw punches arrive either as delimited text or as a structured
//! per-employee list; both normalize into a [`PunchMap`]. The overtime
//! strategies turn punches into a per-day [`NormalizedAttendanceDay`] trace.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::HolidayTag;

/// Punch timestamps grouped by internal employee id.
pub type PunchMap = BTreeMap<String, Vec<DateTime<Utc>>>;

/// Attendance as supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "format", content = "data", rename_all = "snake_case")]
pub enum AttendanceInput {
    /// No attendance supplied.
    #[default]
    None,
    /// Already structured punches, keyed by employee id.
    Punches(PunchMap),
    /// Raw delimited text whose header names the identifier and time columns.
    Delimited(String),
}

/// One day of an employee's attendance trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedAttendanceDay {
    /// The calendar day.
    pub date: NaiveDate,
    /// First punch of the day.
    pub in_time: Option<DateTime<Utc>>,
    /// Last punch of the day.
    pub out_time: Option<DateTime<Utc>>,
    /// Hours worked, net of the shift break.
    pub working_hours: Decimal,
    /// Overtime hours credited for the day.
    pub ot_hours: Decimal,
    /// Overtime amount for the day.
    pub ot: Decimal,
    /// No-pay amount deducted for the day.
    pub no_pay: Decimal,
    /// The holiday falling on this day, when it applies to the employee.
    pub holiday: Option<HolidayTag>,
    /// Short description such as "Worked", "Absent" or "Off day".
    pub description: String,
    /// Free-text remark about irregularities.
    pub remark: Option<String>,
}

impl NormalizedAttendanceDay {
    /// Creates an empty day with no punches and zero amounts.
    pub fn empty(date: NaiveDate, description: impl Into<String>) -> Self {
        Self {
            date,
            in_time: None,
            out_time: None,
            working_hours: Decimal::ZERO,
            ot_hours: Decimal::ZERO,
            ot: Decimal::ZERO,
            no_pay: Decimal::ZERO,
            holiday: None,
            description: description.into(),
            remark: None,
        }
    }

    /// Returns true when the day has at least one punch.
    pub fn has_punches(&self) -> bool {
        self.in_time.is_some()
    }
}
