//! Payroll period model.
//!
//! A [`Period`] is one payroll month, written `YYYY-MM` on the wire.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// One payroll month.
///
/// # Example
///
/// ```
/// use salary_engine::models::Period;
/// use chrono::NaiveDate;
///
/// let period: Period = "2024-04".parse().unwrap();
/// assert_eq!(period.days().count(), 30);
/// assert!(period.contains(NaiveDate::from_ymd_opt(2024, 4, 30).unwrap()));
/// assert_eq!(period.to_string(), "2024-04");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Period {
    first_day: NaiveDate,
}

impl Period {
    /// Parses a `YYYY-MM` period.
    ///
    /// Anything other than a four digit year, a dash and a two digit month in
    /// `01..=12` is rejected with [`EngineError::InvalidPeriod`].
    pub fn parse(value: &str) -> EngineResult<Self> {
        let invalid = || EngineError::InvalidPeriod {
            value: value.to_string(),
        };

        let bytes = value.as_bytes();
        let well_formed = bytes.len() == 7
            && bytes[4] == b'-'
            && bytes
                .iter()
                .enumerate()
                .all(|(i, b)| i == 4 || b.is_ascii_digit());
        if !well_formed {
            return Err(invalid());
        }

        let first_day = NaiveDate::parse_from_str(&format!("{}-01", value), "%Y-%m-%d")
            .map_err(|_| invalid())?;
        Ok(Self { first_day })
    }

    /// Returns the first calendar day of the period.
    pub fn first_day(&self) -> NaiveDate {
        self.first_day
    }

    /// Returns the last calendar day of the period.
    pub fn last_day(&self) -> NaiveDate {
        self.first_day
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(self.first_day)
    }

    /// Iterates every calendar day of the period in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let month = self.first_day.month();
        self.first_day
            .iter_days()
            .take_while(move |day| day.month() == month)
    }

    /// Checks whether a date falls inside the period.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.first_day.year() && date.month() == self.first_day.month()
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.first_day.format("%Y-%m"))
    }
}

impl FromStr for Period {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Period {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Period> for String {
    fn from(period: Period) -> Self {
        period.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_valid_period() {
        let period = Period::parse("2024-05").unwrap();
        assert_eq!(period.first_day(), date(2024, 5, 1));
        assert_eq!(period.last_day(), date(2024, 5, 31));
    }

    #[test]
    fn test_parse_rejects_bad_formats() {
        for value in ["2024-5", "2024/05", "24-05", "2024-13", "2024-00", "", "abcd-ef"] {
            match Period::parse(value) {
                Err(EngineError::InvalidPeriod { value: v }) => assert_eq!(v, value),
                other => panic!("Expected InvalidPeriod for {:?}, got {:?}", value, other),
            }
        }
    }

    #[test]
    fn test_leap_february_has_29_days() {
        let period = Period::parse("2024-02").unwrap();
        assert_eq!(period.days().count(), 29);
        assert_eq!(period.last_day(), date(2024, 2, 29));
    }

    #[test]
    fn test_december_rolls_over_year() {
        let period = Period::parse("2025-12").unwrap();
        assert_eq!(period.last_day(), date(2025, 12, 31));
        assert!(!period.contains(date(2026, 1, 1)));
    }

    #[test]
    fn test_serde_uses_text_form() {
        let period = Period::parse("2024-04").unwrap();
        assert_eq!(serde_json::to_string(&period).unwrap(), "\"2024-04\"");

        let parsed: Period = serde_json::from_str("\"2024-04\"").unwrap();
        assert_eq!(parsed, period);

        assert!(serde_json::from_str::<Period>("\"April\"").is_err());
    }
}
