//! Overtime from real punches.

use rand::RngCore;

use crate::error::{EngineError, EngineResult};
use crate::models::OtMethod;

use super::day::punches_by_shift_date;
use super::{OvertimeStrategy, StrategyContext, StrategyOutcome, evaluate_period, summarize};

/// Prices the employee's actual punches with the shared day rules.
///
/// Fails with [`EngineError::MissingAttendance`] when the employee has no
/// punches.
#[derive(Debug, Clone, Copy, Default)]
pub struct CalculatedOvertime;

impl OvertimeStrategy for CalculatedOvertime {
    fn method(&self) -> OtMethod {
        OtMethod::Calculated
    }

    fn evaluate(
        &self,
        context: &StrategyContext<'_>,
        _rng: &mut dyn RngCore,
    ) -> EngineResult<StrategyOutcome> {
        let punches = context
            .punches
            .filter(|punches| !punches.is_empty())
            .ok_or_else(|| EngineError::MissingAttendance {
                employee_id: context.employee.id.clone(),
            })?;

        let by_day = punches_by_shift_date(punches, context.settings.shift);
        Ok(summarize(context, evaluate_period(context, &by_day)))
    }
}
