//! Overtime strategies.
//!
//! An [`OvertimeStrategy`] turns an employee's attendance for a period into
//! a per-day trace plus overtime, no-pay and holiday-pay figures. Three
//! interchangeable strategies exist, selected by the employee's
//! [`OtMethod`]:
//!
//! - [`CalculatedOvertime`] prices real punches.
//! - [`SimulatedOvertime`] synthesizes a plausible trace from probabilities.
//! - [`FixedNoOvertime`] pays no overtime and deducts absent days pro rata.

mod calculated;
mod day;
mod fixed;
mod simulated;

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rand::RngCore;
use rust_decimal::Decimal;

use crate::config::{CompanyConfig, EmployeeSettings};
use crate::error::EngineResult;
use crate::models::{
    AmountWithReason, EmployeeSalaryInput, NormalizedAttendanceDay, OtMethod, Period, SalaryRecord,
};

pub use calculated::CalculatedOvertime;
pub use fixed::FixedNoOvertime;
pub use simulated::SimulatedOvertime;

use day::{DayEvaluation, DayPlan, DayRates, evaluate_day};

/// Everything a strategy needs to evaluate one employee for one period.
#[derive(Debug, Clone, Copy)]
pub struct StrategyContext<'a> {
    /// The employee being paid.
    pub employee: &'a EmployeeSalaryInput,
    /// Company-wide settings (multipliers).
    pub company: &'a CompanyConfig,
    /// The employee's effective settings.
    pub settings: EmployeeSettings<'a>,
    /// The payroll period.
    pub period: Period,
    /// The employee's punches, in any order.
    pub punches: Option<&'a [DateTime<Utc>]>,
    /// The record being updated, in update mode.
    pub existing: Option<&'a SalaryRecord>,
}

/// The figures a strategy produces.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyOutcome {
    /// One entry per day of the period.
    pub attendance: Vec<NormalizedAttendanceDay>,
    /// Total overtime payment.
    pub ot: AmountWithReason,
    /// Total no-pay deduction.
    pub no_pay: AmountWithReason,
    /// Total pay for hours worked on holidays.
    pub holiday_pay: Decimal,
}

/// Converts attendance into overtime, no-pay and holiday-pay figures.
pub trait OvertimeStrategy: Send + Sync {
    /// The method this strategy implements.
    fn method(&self) -> OtMethod;

    /// Evaluates the employee's period.
    fn evaluate(
        &self,
        context: &StrategyContext<'_>,
        rng: &mut dyn RngCore,
    ) -> EngineResult<StrategyOutcome>;
}

/// Returns the strategy for an overtime method.
///
/// # Example
///
/// ```
/// use salary_engine::calculation::strategy_for;
/// use salary_engine::models::OtMethod;
///
/// assert_eq!(strategy_for(OtMethod::Simulated).method(), OtMethod::Simulated);
/// ```
pub fn strategy_for(method: OtMethod) -> &'static dyn OvertimeStrategy {
    match method {
        OtMethod::Calculated => &CalculatedOvertime,
        OtMethod::Simulated => &SimulatedOvertime,
        OtMethod::FixedNoOt => &FixedNoOvertime,
    }
}

fn rates_for(context: &StrategyContext<'_>) -> DayRates {
    DayRates::new(context.employee.hourly_rate(), context.company)
}

/// Evaluates every day of the period against punches grouped by date.
fn evaluate_period(
    context: &StrategyContext<'_>,
    punches: &BTreeMap<NaiveDate, Vec<DateTime<Utc>>>,
) -> Vec<DayEvaluation> {
    let rates = rates_for(context);
    context
        .period
        .days()
        .map(|date| {
            let plan = DayPlan::for_date(date, &context.settings);
            let day_punches = punches.get(&date).map(Vec::as_slice).unwrap_or(&[]);
            evaluate_day(&plan, day_punches, context.settings.shift, &rates)
        })
        .collect()
}

/// Totals day evaluations priced with the shared day rules.
fn summarize(context: &StrategyContext<'_>, evaluations: Vec<DayEvaluation>) -> StrategyOutcome {
    let rates = rates_for(context);

    let ot_hours: Decimal = evaluations.iter().map(|e| e.day.ot_hours).sum();
    let ot_amount: Decimal = evaluations.iter().map(|e| e.day.ot).sum();
    let no_pay_amount: Decimal = evaluations.iter().map(|e| e.day.no_pay).sum();
    let holiday_pay: Decimal = evaluations.iter().map(|e| e.holiday_pay).sum();
    let absent_units: Decimal = evaluations.iter().map(|e| e.absent_units).sum();
    let short_days = evaluations
        .iter()
        .filter(|e| e.absent_units.is_zero() && !e.day.no_pay.is_zero())
        .count();

    let ot_reason = if ot_hours.is_zero() {
        "No overtime".to_string()
    } else {
        format!(
            "{} OT hours at {} per hour x {}",
            ot_hours.normalize(),
            rates.hourly.round_dp(2),
            rates.ot_multiplier.normalize()
        )
    };
    let no_pay_reason = if no_pay_amount.is_zero() {
        "No deductions".to_string()
    } else {
        format!(
            "{} day(s) absent; {} day(s) with late arrival, early departure or missing punches",
            absent_units.normalize(),
            short_days
        )
    };

    StrategyOutcome {
        attendance: evaluations.into_iter().map(|e| e.day).collect(),
        ot: AmountWithReason {
            amount: ot_amount,
            reason: ot_reason,
        },
        no_pay: AmountWithReason {
            amount: no_pay_amount,
            reason: no_pay_reason,
        },
        holiday_pay,
    }
}
