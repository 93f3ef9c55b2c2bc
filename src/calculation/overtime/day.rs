//! Day-level attendance evaluation shared by every overtime strategy.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::config::{CompanyConfig, EmployeeSettings};
use crate::models::{DayKind, Holiday, HolidayTag, NormalizedAttendanceDay, ShiftDefinition};

const MINUTES_PER_HOUR: Decimal = Decimal::from_parts(60, 0, 0, false, 0);

/// Rates used to price a day.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DayRates {
    pub hourly: Decimal,
    pub ot_multiplier: Decimal,
    pub holiday_multiplier: Decimal,
}

impl DayRates {
    pub fn new(hourly: Decimal, company: &CompanyConfig) -> Self {
        Self {
            hourly,
            ot_multiplier: company.ot_multiplier,
            holiday_multiplier: company.holiday_pay_multiplier,
        }
    }
}

/// What a day contributes beyond its trace entry.
#[derive(Debug, Clone)]
pub(crate) struct DayEvaluation {
    pub day: NormalizedAttendanceDay,
    pub holiday_pay: Decimal,
    /// Working units expected on the day (0 on off days and holidays).
    pub expected_units: Decimal,
    /// Working units missed entirely.
    pub absent_units: Decimal,
}

/// How a day is classified before looking at punches.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DayPlan<'a> {
    pub date: NaiveDate,
    pub kind: DayKind,
    pub holiday: Option<&'a Holiday>,
}

impl<'a> DayPlan<'a> {
    pub fn for_date(date: NaiveDate, settings: &EmployeeSettings<'a>) -> Self {
        let holiday = settings
            .calendar
            .lookup(date)
            .filter(|holiday| settings.holidays.applies_to(holiday));
        Self {
            date,
            kind: settings.working_days.kind_for(date.weekday()),
            holiday,
        }
    }

    /// Units of work expected on this day.
    pub fn expected_units(&self) -> Decimal {
        if self.holiday.is_some() {
            Decimal::ZERO
        } else {
            self.kind.units()
        }
    }
}

fn hours(minutes: i64) -> Decimal {
    (Decimal::from(minutes) / MINUTES_PER_HOUR).round_dp(2)
}

fn amount(minutes: i64, hourly: Decimal, multiplier: Decimal) -> Decimal {
    (Decimal::from(minutes) * hourly * multiplier / MINUTES_PER_HOUR).round_dp(2)
}

/// Minutes between first and last punch, net of the break when the span covers it.
fn worked_minutes(first: DateTime<Utc>, last: DateTime<Utc>, shift: &ShiftDefinition) -> i64 {
    let span = (last - first).num_minutes().max(0);
    if span > shift.break_minutes {
        span - shift.break_minutes
    } else {
        span
    }
}

/// Evaluates one day from its (time-sorted) punches.
pub(crate) fn evaluate_day(
    plan: &DayPlan<'_>,
    punches: &[DateTime<Utc>],
    shift: &ShiftDefinition,
    rates: &DayRates,
) -> DayEvaluation {
    let mut day = NormalizedAttendanceDay::empty(plan.date, "");
    day.holiday = plan.holiday.map(HolidayTag::from);
    day.in_time = punches.first().copied();
    day.out_time = if punches.len() > 1 { punches.last().copied() } else { None };

    let worked = match (day.in_time, day.out_time) {
        (Some(first), Some(last)) => worked_minutes(first, last, shift),
        _ => 0,
    };
    if punches.len() == 1 {
        day.remark = Some("Single punch; out time missing".to_string());
    }
    day.working_hours = hours(worked);

    let mut evaluation = DayEvaluation {
        day,
        holiday_pay: Decimal::ZERO,
        expected_units: plan.expected_units(),
        absent_units: Decimal::ZERO,
    };

    if plan.holiday.is_some() {
        evaluation.day.description = if punches.is_empty() {
            "Holiday".to_string()
        } else {
            "Worked on holiday".to_string()
        };
        evaluation.holiday_pay = amount(worked, rates.hourly, rates.holiday_multiplier);
        return evaluation;
    }

    let Some(window) = shift.expected_window(plan.date, plan.kind) else {
        evaluation.day.description = if punches.is_empty() {
            "Off day".to_string()
        } else {
            "Worked on off day".to_string()
        };
        evaluation.day.ot_hours = hours(worked);
        evaluation.day.ot = amount(worked, rates.hourly, rates.ot_multiplier);
        return evaluation;
    };

    let (no_pay_minutes, ot_minutes) = match (evaluation.day.in_time, evaluation.day.out_time) {
        (None, _) => {
            evaluation.day.description = "Absent".to_string();
            evaluation.absent_units = plan.kind.units();
            (window.working_minutes, 0)
        }
        (Some(_), None) => {
            evaluation.day.description = "Incomplete punches".to_string();
            (window.working_minutes, 0)
        }
        (Some(first), Some(last)) => {
            let late = (first - window.start).num_minutes().max(0);
            let early = (window.end - last).num_minutes().max(0);
            let overtime = (last - window.end).num_minutes().max(0);

            let mut notes = Vec::new();
            if late > 0 {
                notes.push(format!("Late by {} min", late));
            }
            if early > 0 {
                notes.push(format!("Left {} min early", early));
            }
            if !notes.is_empty() {
                evaluation.day.remark = Some(notes.join("; "));
            }
            evaluation.day.description = match plan.kind {
                DayKind::Half => "Worked half day".to_string(),
                _ => "Worked".to_string(),
            };
            ((late + early).min(window.working_minutes), overtime)
        }
    };

    evaluation.day.ot_hours = hours(ot_minutes);
    evaluation.day.ot = amount(ot_minutes, rates.hourly, rates.ot_multiplier);
    evaluation.day.no_pay = amount(no_pay_minutes, rates.hourly, Decimal::ONE);
    evaluation
}

/// Groups time-sorted punches by the shift date they belong to.
///
/// For shifts crossing midnight, punches before the middle of the off-duty
/// gap belong to the previous day's shift.
pub(crate) fn punches_by_shift_date(
    punches: &[DateTime<Utc>],
    shift: &ShiftDefinition,
) -> BTreeMap<NaiveDate, Vec<DateTime<Utc>>> {
    let mut sorted = punches.to_vec();
    sorted.sort();

    let cutoff = if shift.end < shift.start {
        let gap = (shift.start - shift.end).num_minutes();
        Some(shift.end + Duration::minutes(gap / 2))
    } else {
        None
    };

    let mut days: BTreeMap<NaiveDate, Vec<DateTime<Utc>>> = BTreeMap::new();
    for punch in sorted {
        let mut date = punch.date_naive();
        if let Some(cutoff) = cutoff {
            if punch.time() < cutoff {
                date = date.pred_opt().unwrap_or(date);
            }
        }
        days.entry(date).or_default().push(punch);
    }
    days
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HolidayCategory;
    use chrono::{NaiveTime, TimeZone};

    fn shift() -> ShiftDefinition {
        ShiftDefinition {
            start: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            end: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            break_minutes: 60,
        }
    }

    fn rates() -> DayRates {
        DayRates {
            hourly: Decimal::new(200, 0),
            ot_multiplier: Decimal::new(15, 1),
            holiday_multiplier: Decimal::new(2, 0),
        }
    }

    fn at(d: u32, h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, d, h, m, 0).unwrap()
    }

    fn plan(d: u32, kind: DayKind) -> DayPlan<'static> {
        DayPlan {
            date: NaiveDate::from_ymd_opt(2024, 5, d).unwrap(),
            kind,
            holiday: None,
        }
    }

    #[test]
    fn test_on_time_full_day() {
        let eval = evaluate_day(&plan(2, DayKind::Full), &[at(2, 8, 0), at(2, 17, 0)], &shift(), &rates());
        assert_eq!(eval.day.working_hours, Decimal::new(8, 0));
        assert_eq!(eval.day.ot, Decimal::ZERO);
        assert_eq!(eval.day.no_pay, Decimal::ZERO);
        assert_eq!(eval.day.description, "Worked");
        assert!(eval.day.remark.is_none());
    }

    #[test]
    fn test_overtime_after_expected_end() {
        // 2 hours past 17:00 at 200/h x 1.5
        let eval = evaluate_day(&plan(2, DayKind::Full), &[at(2, 8, 0), at(2, 19, 0)], &shift(), &rates());
        assert_eq!(eval.day.ot_hours, Decimal::new(2, 0));
        assert_eq!(eval.day.ot, Decimal::new(600, 0));
    }

    #[test]
    fn test_late_and_early_become_no_pay() {
        let eval = evaluate_day(&plan(2, DayKind::Full), &[at(2, 8, 30), at(2, 16, 30)], &shift(), &rates());
        assert_eq!(eval.day.no_pay, Decimal::new(200, 0));
        assert_eq!(eval.day.remark.as_deref(), Some("Late by 30 min; Left 30 min early"));
    }

    #[test]
    fn test_absent_working_day() {
        let eval = evaluate_day(&plan(2, DayKind::Full), &[], &shift(), &rates());
        assert_eq!(eval.day.description, "Absent");
        assert_eq!(eval.day.no_pay, Decimal::new(1600, 0));
        assert_eq!(eval.absent_units, Decimal::ONE);
    }

    #[test]
    fn test_half_day_window() {
        let eval = evaluate_day(&plan(4, DayKind::Half), &[at(4, 8, 0), at(4, 13, 0)], &shift(), &rates());
        assert_eq!(eval.day.ot_hours, Decimal::ONE);
        assert_eq!(eval.day.no_pay, Decimal::ZERO);
        assert_eq!(eval.expected_units, Decimal::new(5, 1));
    }

    #[test]
    fn test_off_day_hours_all_overtime() {
        let eval = evaluate_day(&plan(5, DayKind::Off), &[at(5, 9, 0), at(5, 12, 0)], &shift(), &rates());
        assert_eq!(eval.day.description, "Worked on off day");
        // 3 hour span less the 1 hour break
        assert_eq!(eval.day.ot_hours, Decimal::new(2, 0));
        assert_eq!(eval.day.ot, Decimal::new(600, 0));
    }

    #[test]
    fn test_holiday_work_paid_at_holiday_rate() {
        let holiday = Holiday {
            date: NaiveDate::from_ymd_opt(2024, 5, 23).unwrap(),
            categories: vec![HolidayCategory::Poya],
            summary: "Vesak".to_string(),
        };
        let plan = DayPlan {
            date: holiday.date,
            kind: DayKind::Full,
            holiday: Some(&holiday),
        };

        let worked = evaluate_day(&plan, &[at(23, 8, 0), at(23, 13, 0)], &shift(), &rates());
        assert_eq!(worked.holiday_pay, Decimal::new(1600, 0));
        assert_eq!(worked.day.no_pay, Decimal::ZERO);
        assert_eq!(worked.day.holiday.as_ref().unwrap().summary, "Vesak");

        let absent = evaluate_day(&plan, &[], &shift(), &rates());
        assert_eq!(absent.day.no_pay, Decimal::ZERO);
        assert_eq!(absent.expected_units, Decimal::ZERO);
    }

    #[test]
    fn test_single_punch_recorded_with_remark() {
        let eval = evaluate_day(&plan(2, DayKind::Full), &[at(2, 8, 0)], &shift(), &rates());
        assert_eq!(eval.day.in_time, Some(at(2, 8, 0)));
        assert!(eval.day.out_time.is_none());
        assert_eq!(eval.day.working_hours, Decimal::ZERO);
        assert!(eval.day.remark.is_some());
        assert_eq!(eval.absent_units, Decimal::ZERO);
    }

    #[test]
    fn test_overnight_punches_grouped_by_shift_start() {
        let night = ShiftDefinition {
            start: NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
            end: NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
            break_minutes: 0,
        };
        let days = punches_by_shift_date(&[at(3, 6, 5), at(2, 21, 55)], &night);

        assert_eq!(days.len(), 1);
        assert_eq!(days[&NaiveDate::from_ymd_opt(2024, 5, 2).unwrap()].len(), 2);
    }
}
