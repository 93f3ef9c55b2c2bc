//! Attendance normalization.
//!
//! Turns whatever attendance a caller supplies into a [`PunchMap`]: punch
//! timestamps grouped by internal employee id. Raw delimited text may name
//! employees by their external member number, in which case rows are
//! translated through a lookup built from the batch's employees.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::{debug, warn};

use crate::models::{AttendanceInput, PunchMap};

/// Naive timestamp layouts accepted in raw attendance, read as UTC.
const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"];

/// Header names that mark the first column as an external member number,
/// compared after lowercasing and stripping non-alphanumerics.
const MEMBER_HEADERS: [&str; 4] = ["memberno", "membernumber", "memberid", "member"];

/// Normalizes attendance input into punches grouped by employee id.
///
/// Structured punches are returned unchanged. Delimited text is parsed row by
/// row; rows that cannot be attributed or parsed are dropped.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
/// use salary_engine::calculation::normalize_attendance;
/// use salary_engine::models::AttendanceInput;
///
/// let raw = "memberNo,time\n101,2024-05-02T08:00:00Z\n999,2024-05-02T08:05:00Z\n";
/// let lookup = HashMap::from([("101".to_string(), "emp_001".to_string())]);
///
/// let punches = normalize_attendance(&AttendanceInput::Delimited(raw.to_string()), &lookup);
/// assert_eq!(punches["emp_001"].len(), 1);
/// assert_eq!(punches.len(), 1);
/// ```
pub fn normalize_attendance(
    input: &AttendanceInput,
    member_lookup: &HashMap<String, String>,
) -> PunchMap {
    match input {
        AttendanceInput::None => PunchMap::new(),
        AttendanceInput::Punches(punches) => punches.clone(),
        AttendanceInput::Delimited(text) => parse_delimited(text, member_lookup),
    }
}

fn parse_delimited(text: &str, member_lookup: &HashMap<String, String>) -> PunchMap {
    let mut punches = PunchMap::new();
    if text.trim().is_empty() {
        return punches;
    }

    let header_line = text.lines().next().unwrap_or_default();
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(detect_delimiter(header_line))
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let by_member = match reader.headers() {
        Ok(headers) => headers.get(0).is_some_and(is_member_header),
        Err(e) => {
            warn!(error = %e, "Unreadable attendance header");
            return punches;
        }
    };

    for (index, record) in reader.records().enumerate() {
        let row = index + 2;
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                warn!(row, error = %e, "Dropping unreadable attendance row");
                continue;
            }
        };

        let (Some(identifier), Some(time)) = (record.get(0), record.get(1)) else {
            warn!(row, "Dropping short attendance row");
            continue;
        };
        if identifier.is_empty() {
            continue;
        }

        let employee_id = if by_member {
            match member_lookup.get(identifier) {
                Some(id) => id.clone(),
                None => {
                    debug!(row, member_no = identifier, "No employee for member number");
                    continue;
                }
            }
        } else {
            identifier.to_string()
        };

        match parse_timestamp(time) {
            Some(timestamp) => punches.entry(employee_id).or_default().push(timestamp),
            None => warn!(row, value = time, "Dropping unparseable attendance timestamp"),
        }
    }

    punches
}

fn detect_delimiter(header: &str) -> u8 {
    if header.contains('\t') {
        b'\t'
    } else if header.contains(';') {
        b';'
    } else {
        b','
    }
}

fn is_member_header(column: &str) -> bool {
    let normalized: String = column
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect();
    MEMBER_HEADERS.contains(&normalized.as_str())
}

/// Parses an RFC 3339 timestamp, or a naive one interpreted as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Some(timestamp.with_timezone(&Utc));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(d: u32, h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, d, h, m, 0).unwrap()
    }

    fn no_lookup() -> HashMap<String, String> {
        HashMap::new()
    }

    #[test]
    fn test_empty_input_yields_empty_map() {
        assert!(normalize_attendance(&AttendanceInput::None, &no_lookup()).is_empty());
        let blank = AttendanceInput::Delimited("   \n".to_string());
        assert!(normalize_attendance(&blank, &no_lookup()).is_empty());
    }

    #[test]
    fn test_structured_input_is_idempotent() {
        let mut map = PunchMap::new();
        map.insert("emp_001".to_string(), vec![utc(2, 8, 0), utc(2, 17, 0)]);
        let input = AttendanceInput::Punches(map.clone());

        let once = normalize_attendance(&input, &no_lookup());
        let twice = normalize_attendance(&AttendanceInput::Punches(once.clone()), &no_lookup());
        assert_eq!(once, map);
        assert_eq!(twice, once);
    }

    #[test]
    fn test_employee_id_rows_grouped_in_row_order() {
        let raw = "employeeId,time\n\
                   emp_002,2024-05-02T17:00:00Z\n\
                   emp_001,2024-05-02T08:00:00Z\n\
                   emp_002,2024-05-02T08:10:00Z\n";
        let punches = normalize_attendance(&AttendanceInput::Delimited(raw.to_string()), &no_lookup());

        assert_eq!(punches["emp_002"], vec![utc(2, 17, 0), utc(2, 8, 10)]);
        assert_eq!(punches["emp_001"], vec![utc(2, 8, 0)]);
    }

    #[test]
    fn test_member_numbers_translated() {
        let raw = "Member No;Time\n101;2024-05-02 08:00:00\n102;2024-05-02 08:30:00\n";
        let lookup = HashMap::from([("101".to_string(), "emp_001".to_string())]);

        let punches = normalize_attendance(&AttendanceInput::Delimited(raw.to_string()), &lookup);
        assert_eq!(punches.len(), 1);
        assert_eq!(punches["emp_001"], vec![utc(2, 8, 0)]);
    }

    #[test]
    fn test_bad_rows_dropped() {
        let raw = "employeeId\ttime\n\
                   emp_001\tnot-a-time\n\
                   emp_001\n\
                   emp_001\t2024-05-02T08:00:00+05:30\n";
        let punches = normalize_attendance(&AttendanceInput::Delimited(raw.to_string()), &no_lookup());
        assert_eq!(punches["emp_001"], vec![utc(2, 2, 30)]);
    }

    #[test]
    fn test_duplicate_timestamps_retained() {
        let raw = "employeeId,time\nemp_001,2024-05-02T08:00:00Z\nemp_001,2024-05-02T08:00:00Z\n";
        let punches = normalize_attendance(&AttendanceInput::Delimited(raw.to_string()), &no_lookup());
        assert_eq!(punches["emp_001"].len(), 2);
    }

    #[test]
    fn test_member_header_detection() {
        assert!(is_member_header("memberNo"));
        assert!(is_member_header("member_no"));
        assert!(is_member_header("Member Number"));
        assert!(!is_member_header("employeeId"));
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert_eq!(parse_timestamp("2024-05-02T08:00:00Z"), Some(utc(2, 8, 0)));
        assert_eq!(parse_timestamp("2024-05-02T08:00:00.250"), Some(utc(2, 8, 0) + chrono::Duration::milliseconds(250)));
        assert_eq!(parse_timestamp("2024-05-02 08:00"), Some(utc(2, 8, 0)));
        assert_eq!(parse_timestamp("yesterday"), None);
    }
}
