//! Simulated attendance.
//!
//! Synthesizes a plausible punch trace from the employee's
//! [`SimulationProbabilities`] and prices it with the shared day rules. In
//! update mode the existing record's trace is reused so that an update
//! recomputes amounts from stable attendance.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rand::distributions::{Distribution, WeightedIndex};
use rand::{Rng, RngCore};
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::models::{DayKind, ExpectedWindow, OtMethod, SalaryRecord, SimulationProbabilities};

use super::day::DayPlan;
use super::{OvertimeStrategy, StrategyContext, StrategyOutcome, evaluate_period, summarize};

/// Synthesizes attendance from weighted random draws.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedOvertime;

impl OvertimeStrategy for SimulatedOvertime {
    fn method(&self) -> OtMethod {
        OtMethod::Simulated
    }

    fn evaluate(
        &self,
        context: &StrategyContext<'_>,
        rng: &mut dyn RngCore,
    ) -> EngineResult<StrategyOutcome> {
        let punches = match context.existing.filter(|record| !record.attendance.is_empty()) {
            Some(record) => {
                debug!(employee_id = %context.employee.id, "Reusing existing simulated trace");
                punches_from_trace(record)
            }
            None => simulate(context, rng)?,
        };

        Ok(summarize(context, evaluate_period(context, &punches)))
    }
}

/// Checks that every probability is a finite value in `[0, 1]`.
pub(crate) fn validate_probabilities(probabilities: &SimulationProbabilities) -> EngineResult<()> {
    let values = [
        ("work_on_off_day", probabilities.work_on_off_day),
        ("work_on_holiday", probabilities.work_on_holiday),
        ("absence", probabilities.absence),
        ("late", probabilities.late),
        ("overtime", probabilities.overtime),
    ];

    for (name, value) in values {
        if !(0.0..=1.0).contains(&value) {
            return Err(EngineError::InvalidEmployee {
                field: format!("probabilities.{}", name),
                message: format!("must be between 0 and 1, got {}", value),
            });
        }
    }
    Ok(())
}

fn punches_from_trace(record: &SalaryRecord) -> BTreeMap<NaiveDate, Vec<DateTime<Utc>>> {
    record
        .attendance
        .iter()
        .filter(|day| day.has_punches())
        .map(|day| {
            let punches = day.in_time.into_iter().chain(day.out_time).collect();
            (day.date, punches)
        })
        .collect()
}

/// Working-day outcomes, in the order their weights are listed.
const ABSENT: usize = 0;
const LATE: usize = 1;

fn simulate(
    context: &StrategyContext<'_>,
    rng: &mut dyn RngCore,
) -> EngineResult<BTreeMap<NaiveDate, Vec<DateTime<Utc>>>> {
    let probabilities = context.settings.probabilities;
    validate_probabilities(probabilities)?;

    let on_time = (1.0 - probabilities.absence - probabilities.late).max(0.0);
    let working_day = WeightedIndex::new([probabilities.absence, probabilities.late, on_time])
        .map_err(|e| EngineError::CalculationError {
            message: format!("invalid attendance weights: {}", e),
        })?;

    let shift = context.settings.shift;
    let mut days = BTreeMap::new();

    for date in context.period.days() {
        let plan = DayPlan::for_date(date, &context.settings);

        let worked = if plan.holiday.is_some() {
            rng.gen_bool(probabilities.work_on_holiday)
                .then(|| shift.expected_window(date, DayKind::Full))
                .flatten()
                .map(|window| simulate_shift(&window, false, probabilities.overtime, &mut *rng))
        } else if plan.kind == DayKind::Off {
            rng.gen_bool(probabilities.work_on_off_day)
                .then(|| shift.expected_window(date, DayKind::Half))
                .flatten()
                .map(|window| simulate_shift(&window, false, 0.0, &mut *rng))
        } else {
            let outcome = working_day.sample(&mut *rng);
            if outcome == ABSENT {
                None
            } else {
                shift.expected_window(date, plan.kind).map(|window| {
                    simulate_shift(&window, outcome == LATE, probabilities.overtime, &mut *rng)
                })
            }
        };

        if let Some(punches) = worked {
            days.insert(date, punches);
        }
    }

    Ok(days)
}

/// Generates an in/out punch pair around an expected window.
fn simulate_shift(
    window: &ExpectedWindow,
    late: bool,
    overtime: f64,
    rng: &mut dyn RngCore,
) -> Vec<DateTime<Utc>> {
    let arrival = if late {
        window.start + Duration::minutes(rng.gen_range(5..=45))
    } else {
        window.start - Duration::minutes(rng.gen_range(0..=15))
    };
    let departure = if rng.gen_bool(overtime) {
        window.end + Duration::minutes(15 * rng.gen_range(2..=12))
    } else {
        window.end
    };
    vec![arrival, departure]
}
