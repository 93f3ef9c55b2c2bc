//! Fixed pay without overtime.

use rand::RngCore;
use rust_decimal::Decimal;

use crate::error::EngineResult;
use crate::models::{AmountWithReason, OtMethod};

use super::day::punches_by_shift_date;
use super::{OvertimeStrategy, StrategyContext, StrategyOutcome, evaluate_period};

/// Pays no overtime or holiday pay; deducts absent days pro rata.
///
/// No-pay is `basic × absent_units / working_units`, where a full working day
/// is one unit and a half day half a unit. Holidays are not working units.
/// An employee without any punches is not treated as absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedNoOvertime;

impl OvertimeStrategy for FixedNoOvertime {
    fn method(&self) -> OtMethod {
        OtMethod::FixedNoOt
    }

    fn evaluate(
        &self,
        context: &StrategyContext<'_>,
        _rng: &mut dyn RngCore,
    ) -> EngineResult<StrategyOutcome> {
        let recorded = context.punches.is_some_and(|punches| !punches.is_empty());
        let by_day = context
            .punches
            .map(|punches| punches_by_shift_date(punches, context.settings.shift))
            .unwrap_or_default();

        let mut evaluations = evaluate_period(context, &by_day);

        let working_units: Decimal = evaluations.iter().map(|e| e.expected_units).sum();
        let absent_units: Decimal = if recorded {
            evaluations.iter().map(|e| e.absent_units).sum()
        } else {
            Decimal::ZERO
        };
        let basic = context.employee.basic;
        let per_unit = if working_units.is_zero() {
            Decimal::ZERO
        } else {
            basic / working_units
        };

        for evaluation in &mut evaluations {
            let day = &mut evaluation.day;
            day.ot_hours = Decimal::ZERO;
            day.ot = Decimal::ZERO;
            day.no_pay = if recorded {
                (per_unit * evaluation.absent_units).round_dp(2)
            } else {
                Decimal::ZERO
            };
            if !recorded && day.description == "Absent" {
                day.description = "Not recorded".to_string();
            }
        }

        let no_pay = (per_unit * absent_units).round_dp(2);

        // The last absent day carries the rounding remainder so the trace sums to the total.
        let traced: Decimal = evaluations.iter().map(|e| e.day.no_pay).sum();
        if let Some(last) = evaluations
            .iter_mut()
            .rev()
            .find(|e| recorded && e.absent_units > Decimal::ZERO)
        {
            last.day.no_pay += no_pay - traced;
        }
        let no_pay_reason = if no_pay.is_zero() {
            "No deductions".to_string()
        } else {
            format!(
                "{} of {} working days absent",
                absent_units.normalize(),
                working_units.normalize()
            )
        };

        Ok(StrategyOutcome {
            attendance: evaluations.into_iter().map(|e| e.day).collect(),
            ot: AmountWithReason {
                amount: Decimal::ZERO,
                reason: "Overtime not paid under fixed_no_ot".to_string(),
            },
            no_pay: AmountWithReason {
                amount: no_pay,
                reason: no_pay_reason,
            },
            holiday_pay: Decimal::ZERO,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::overtime::test_support::{at, company_context};
    use crate::models::{DayKind, EmployeeSalaryInput, Inherited, Period, WorkingDayPolicy};
    use chrono::{DateTime, Datelike, Utc, Weekday};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn weekdays_only() -> WorkingDayPolicy {
        WorkingDayPolicy {
            saturday: DayKind::Off,
            sunday: DayKind::Off,
            ..WorkingDayPolicy::default()
        }
    }

    /// Full-day punches on every April 2024 weekday except the skipped dates.
    fn april_punches(skip: &[u32]) -> Vec<DateTime<Utc>> {
        Period::parse("2024-04")
            .unwrap()
            .days()
            .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
            .filter(|d| !skip.contains(&d.day()))
            .flat_map(|d| [at(4, d.day(), 8, 0), at(4, d.day(), 20, 0)])
            .collect()
    }

    fn evaluate(punches: Option<&[DateTime<Utc>]>) -> StrategyOutcome {
        let company = company_context();
        let mut employee =
            EmployeeSalaryInput::new("emp_fixed", Decimal::new(50000, 0), OtMethod::FixedNoOt);
        employee.working_days = Inherited::Employee(weekdays_only());

        let context = StrategyContext {
            employee: &employee,
            company: company.company(),
            settings: company.settings_for(&employee).unwrap(),
            period: Period::parse("2024-04").unwrap(),
            punches,
            existing: None,
        };
        let mut rng = StdRng::seed_from_u64(0);
        FixedNoOvertime.evaluate(&context, &mut rng).unwrap()
    }

    #[test]
    fn test_two_absences_of_twenty_two_days() {
        let punches = april_punches(&[10, 11]);
        let outcome = evaluate(Some(&punches));

        assert_eq!(outcome.no_pay.amount, Decimal::new(454545, 2));
        assert_eq!(outcome.no_pay.reason, "2 of 22 working days absent");
        assert_eq!(outcome.ot.amount, Decimal::ZERO);
        assert_eq!(outcome.holiday_pay, Decimal::ZERO);
        // Staying until 20:00 every day still earns nothing
        assert!(outcome.attendance.iter().all(|d| d.ot.is_zero()));
    }

    #[test]
    fn test_daily_no_pay_sums_to_period_total() {
        let punches = april_punches(&[10, 11]);
        let outcome = evaluate(Some(&punches));

        let traced: Decimal = outcome.attendance.iter().map(|d| d.no_pay).sum();
        assert_eq!(traced, outcome.no_pay.amount);
        assert_eq!(outcome.attendance[9].no_pay, Decimal::new(227273, 2));
        assert_eq!(outcome.attendance[10].no_pay, Decimal::new(227272, 2));
    }

    #[test]
    fn test_no_punches_is_not_absence() {
        let outcome = evaluate(None);
        assert_eq!(outcome.no_pay.amount, Decimal::ZERO);
        assert_eq!(outcome.attendance.len(), 30);
        assert!(outcome.attendance.iter().all(|d| d.description != "Absent"));
    }

    #[test]
    fn test_full_attendance_has_no_deduction() {
        let punches = april_punches(&[]);
        let outcome = evaluate(Some(&punches));
        assert_eq!(outcome.no_pay.amount, Decimal::ZERO);
        assert_eq!(outcome.no_pay.reason, "No deductions");
    }
}
