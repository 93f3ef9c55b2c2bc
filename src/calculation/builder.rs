//! Salary record building.
//!
//! [`compute_salary`] runs one employee through their overtime strategy and
//! the compensation resolver and assembles a [`SalaryRecord`].
//! [`compute_batch`] does the same for every employee of a request
//! concurrently, after validating the request as a whole.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use rand::RngCore;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::CompanyContext;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AttendanceInput, EmployeeSalaryInput, Period, SalaryRecord,
};

use super::normalizer::normalize_attendance;
use super::overtime::{StrategyContext, strategy_for};
use super::random::{Entropy, HUNDRED};
use super::resolver::{CompensationInput, resolve_compensation};

/// Nominee proportions must add up to this many percent.
const FULL_PROPORTION: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// A batch of employees to compute salaries for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchRequest {
    /// The payroll period, `YYYY-MM`.
    pub period: String,
    /// Employees to compute, in output order.
    pub employees: Vec<EmployeeSalaryInput>,
    /// Attendance for the period.
    #[serde(default)]
    pub attendance: AttendanceInput,
    /// Recompute employees that already have a record for the period.
    #[serde(default)]
    pub update: bool,
    /// Records already generated (any period; only matching ones are used).
    #[serde(default)]
    pub existing: Vec<SalaryRecord>,
}

/// A per-employee failure within a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeError {
    /// The employee that failed.
    pub employee_id: String,
    /// What went wrong.
    pub message: String,
}

/// The result of a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOutcome {
    /// Computed records, in request order.
    pub salaries: Vec<SalaryRecord>,
    /// Employees skipped because a record already exists and `update` is off.
    pub exists: Vec<String>,
    /// Employees whose computation failed.
    pub errors: Vec<EmployeeError>,
}

/// Computes one employee's salary record for a period.
///
/// In update mode (`existing` given) the record keeps its id and advance
/// amount and everything else is recomputed.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
/// use rust_decimal::Decimal;
/// use salary_engine::calculation::compute_salary;
/// use salary_engine::config::{CompanyConfig, CompanyContext};
/// use salary_engine::models::{EmployeeSalaryInput, OtMethod, Period};
///
/// let company: CompanyConfig = serde_json::from_str(
///     r#"{ "name": "Acme", "shift": { "start": "08:00:00", "end": "17:00:00", "break_minutes": 60 } }"#,
/// ).unwrap();
/// let context = CompanyContext::new(company, HashMap::new());
/// let employee = EmployeeSalaryInput::new("emp_001", Decimal::new(50000, 0), OtMethod::FixedNoOt);
///
/// let mut rng = StdRng::seed_from_u64(7);
/// let record = compute_salary(&employee, &context, Period::parse("2024-05").unwrap(), None, None, &mut rng)
///     .unwrap();
///
/// assert!(record.is_balanced());
/// assert_eq!(record.final_salary, Decimal::new(46000, 0));
/// ```
pub fn compute_salary(
    employee: &EmployeeSalaryInput,
    company: &CompanyContext,
    period: Period,
    punches: Option<&[DateTime<Utc>]>,
    existing: Option<&SalaryRecord>,
    rng: &mut dyn RngCore,
) -> EngineResult<SalaryRecord> {
    validate_identity(employee)?;
    validate_employee(employee)?;
    if let Some(record) = existing {
        if record.employee_id != employee.id || record.period != period {
            return Err(EngineError::InvalidRequest {
                message: format!(
                    "existing record is for '{}' in {}, not '{}' in {}",
                    record.employee_id, record.period, employee.id, period
                ),
            });
        }
    }

    let settings = company.settings_for(employee)?;
    let context = StrategyContext {
        employee,
        company: company.company(),
        settings,
        period,
        punches,
        existing,
    };
    let outcome = strategy_for(employee.ot_method).evaluate(&context, rng)?;

    let compensation = resolve_compensation(
        &CompensationInput {
            basic: employee.basic,
            target: &employee.target_salary,
            ot: outcome.ot.amount,
            holiday_pay: outcome.holiday_pay,
            no_pay: outcome.no_pay.amount,
            structure: settings.payment_structure,
            existing,
        },
        rng,
    )?;

    let remark = match compensation.target {
        Some(target) if compensation.shortfall.abs() >= HUNDRED => Some(format!(
            "Target salary {} reconciled approximately; {} could not be absorbed by the payment structure",
            target,
            compensation.shortfall.normalize()
        )),
        _ => None,
    };

    debug!(
        employee_id = %employee.id,
        method = %employee.ot_method,
        final_salary = %compensation.final_salary,
        "Computed salary record"
    );

    Ok(SalaryRecord {
        id: existing.map_or_else(Uuid::new_v4, |record| record.id),
        employee_id: employee.id.clone(),
        period,
        basic: employee.basic,
        holiday_pay: outcome.holiday_pay,
        no_pay: outcome.no_pay,
        ot: outcome.ot,
        payment_structure: compensation.payment_structure,
        advance_amount: existing.map_or(Decimal::ZERO, |record| record.advance_amount),
        final_salary: compensation.final_salary,
        attendance: outcome.attendance,
        remark,
        generated_at: Utc::now(),
    })
}

fn validate_employee(employee: &EmployeeSalaryInput) -> EngineResult<()> {
    if employee.basic < Decimal::ZERO {
        return Err(EngineError::InvalidEmployee {
            field: "basic".to_string(),
            message: format!("must not be negative, got {}", employee.basic),
        });
    }
    Ok(())
}

/// Validates a batch before any employee is computed.
fn validate_batch(request: &BatchRequest) -> EngineResult<Period> {
    let period = Period::parse(&request.period)?;

    if request.employees.is_empty() {
        return Err(EngineError::InvalidRequest {
            message: "no employees supplied".to_string(),
        });
    }

    let mut seen = HashSet::new();
    for employee in &request.employees {
        validate_identity(employee)?;
        if !seen.insert(employee.id.as_str()) {
            return Err(EngineError::InvalidRequest {
                message: format!("duplicate employee id '{}'", employee.id),
            });
        }
    }

    Ok(period)
}

/// Request-level checks on one employee: a non-empty id and nominee
/// proportions adding up to 100.
fn validate_identity(employee: &EmployeeSalaryInput) -> EngineResult<()> {
    if employee.id.trim().is_empty() {
        return Err(EngineError::InvalidRequest {
            message: "employee id must not be empty".to_string(),
        });
    }
    if !employee.nominees.is_empty() {
        let total: Decimal = employee.nominees.iter().map(|n| n.proportion).sum();
        if total != FULL_PROPORTION {
            return Err(EngineError::ProportionMismatch {
                employee_id: employee.id.clone(),
                total,
            });
        }
    }
    Ok(())
}

/// Computes salary records for every employee in a batch.
///
/// The request is validated as a whole first; a validation failure rejects
/// the batch. Attendance is normalized once. Employees that already have a
/// record for the period are skipped unless `update` is set. The remaining
/// employees run concurrently, each with its own generator from `entropy`;
/// a failing employee is reported in `errors` without affecting the others.
pub async fn compute_batch(
    request: BatchRequest,
    company: Arc<CompanyContext>,
    entropy: Entropy,
) -> EngineResult<BatchOutcome> {
    let period = validate_batch(&request)?;

    let member_lookup: HashMap<String, String> = request
        .employees
        .iter()
        .filter_map(|e| e.member_no.clone().map(|member_no| (member_no, e.id.clone())))
        .collect();
    let mut punches = normalize_attendance(&request.attendance, &member_lookup);

    let mut existing: HashMap<String, SalaryRecord> = request
        .existing
        .into_iter()
        .filter(|record| record.period == period)
        .map(|record| (record.employee_id.clone(), record))
        .collect();

    info!(
        period = %period,
        employees = request.employees.len(),
        update = request.update,
        "Computing salary batch"
    );

    let mut outcome = BatchOutcome::default();
    let mut tasks = Vec::new();

    for (index, employee) in request.employees.into_iter().enumerate() {
        let previous = existing.remove(&employee.id);
        if previous.is_some() && !request.update {
            outcome.exists.push(employee.id);
            continue;
        }

        let employee_punches = punches.remove(&employee.id);
        let company = Arc::clone(&company);
        let mut rng = entropy.rng(index as u64);
        let employee_id = employee.id.clone();

        let handle = tokio::spawn(async move {
            compute_salary(
                &employee,
                &company,
                period,
                employee_punches.as_deref(),
                previous.as_ref(),
                &mut rng,
            )
        });
        tasks.push((employee_id, handle));
    }

    let (ids, handles): (Vec<String>, Vec<_>) = tasks.into_iter().unzip();
    let results = join_all(handles).await;

    for (employee_id, result) in ids.into_iter().zip(results) {
        match result {
            Ok(Ok(record)) => outcome.salaries.push(record),
            Ok(Err(error)) => {
                warn!(employee_id = %employee_id, error = %error, "Salary computation failed");
                outcome.errors.push(EmployeeError {
                    employee_id,
                    message: error.to_string(),
                });
            }
            Err(join_error) => {
                warn!(employee_id = %employee_id, error = %join_error, "Salary task aborted");
                outcome.errors.push(EmployeeError {
                    employee_id,
                    message: format!("computation aborted: {}", join_error),
                });
            }
        }
    }

    info!(
        period = %period,
        computed = outcome.salaries.len(),
        skipped = outcome.exists.len(),
        failed = outcome.errors.len(),
        "Salary batch complete"
    );

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::overtime::test_support::{at, company_context};
    use crate::models::{AmountSpec, Nominee, OtMethod, PaymentLineItem, PaymentStructure, PunchMap, Inherited};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn dec(n: i64) -> Decimal {
        Decimal::new(n, 0)
    }

    fn employee(id: &str, method: OtMethod) -> EmployeeSalaryInput {
        EmployeeSalaryInput::new(id, dec(48000), method)
    }

    fn context() -> Arc<CompanyContext> {
        Arc::new(company_context())
    }

    fn request(employees: Vec<EmployeeSalaryInput>) -> BatchRequest {
        BatchRequest {
            period: "2024-05".to_string(),
            employees,
            ..BatchRequest::default()
        }
    }

    // ==========================================================================
    // compute_salary
    // ==========================================================================

    #[test]
    fn test_generate_assigns_new_id_and_zero_advance() {
        let company = company_context();
        let mut rng = StdRng::seed_from_u64(1);
        let record = compute_salary(
            &employee("emp_001", OtMethod::Simulated),
            &company,
            Period::parse("2024-05").unwrap(),
            None,
            None,
            &mut rng,
        )
        .unwrap();

        assert_eq!(record.advance_amount, Decimal::ZERO);
        assert_eq!(record.attendance.len(), 31);
        assert!(record.is_balanced());
        assert!(record.payment_structure.epf().is_some());
    }

    #[test]
    fn test_update_preserves_id_and_advance() {
        let company = company_context();
        let period = Period::parse("2024-05").unwrap();
        let employee = employee("emp_001", OtMethod::Simulated);
        let mut rng = StdRng::seed_from_u64(1);

        let mut first = compute_salary(&employee, &company, period, None, None, &mut rng).unwrap();
        first.advance_amount = dec(5000);

        let updated =
            compute_salary(&employee, &company, period, None, Some(&first), &mut rng).unwrap();

        assert_eq!(updated.id, first.id);
        assert_eq!(updated.advance_amount, dec(5000));
        // The simulated trace is reused on update
        assert_eq!(updated.attendance, first.attendance);
        assert!(updated.is_balanced());
    }

    #[test]
    fn test_existing_record_for_other_employee_rejected() {
        let company = company_context();
        let period = Period::parse("2024-05").unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let first = compute_salary(&employee("emp_001", OtMethod::FixedNoOt), &company, period, None, None, &mut rng).unwrap();

        let result = compute_salary(&employee("emp_002", OtMethod::FixedNoOt), &company, period, None, Some(&first), &mut rng);
        assert!(matches!(result, Err(EngineError::InvalidRequest { .. })));
    }

    #[test]
    fn test_shortfall_noted_in_remark() {
        let company = company_context();
        let mut employee = employee("emp_001", OtMethod::FixedNoOt);
        employee.target_salary = AmountSpec::fixed(dec(60000));
        employee.payment_structure = Inherited::Employee(PaymentStructure {
            additions: vec![PaymentLineItem::new("Transport", AmountSpec::range(dec(2000), dec(4000)), false)],
            deductions: vec![],
        });

        let mut rng = StdRng::seed_from_u64(1);
        let record = compute_salary(&employee, &company, Period::parse("2024-05").unwrap(), None, None, &mut rng).unwrap();

        assert_eq!(record.payment_structure.additions[0].amount, dec(4000));
        assert!(record.remark.unwrap().contains("reconciled approximately"));
    }

    #[test]
    fn test_negative_basic_rejected() {
        let company = company_context();
        let mut rng = StdRng::seed_from_u64(1);
        let mut employee = employee("emp_001", OtMethod::FixedNoOt);
        employee.basic = dec(-1);

        let result = compute_salary(&employee, &company, Period::parse("2024-05").unwrap(), None, None, &mut rng);
        assert!(matches!(result, Err(EngineError::InvalidEmployee { .. })));
    }

    #[test]
    fn test_single_employee_nominee_mismatch_rejected() {
        let company = company_context();
        let mut rng = StdRng::seed_from_u64(1);
        let mut employee = employee("emp_001", OtMethod::FixedNoOt);
        employee.nominees = vec![
            Nominee { name: "Spouse".to_string(), proportion: dec(70) },
            Nominee { name: "Child".to_string(), proportion: dec(20) },
        ];

        let result = compute_salary(&employee, &company, Period::parse("2024-05").unwrap(), None, None, &mut rng);
        match result {
            Err(EngineError::ProportionMismatch { employee_id, total }) => {
                assert_eq!(employee_id, "emp_001");
                assert_eq!(total, dec(90));
            }
            other => panic!("Expected ProportionMismatch, got {:?}", other),
        }
    }

    // ==========================================================================
    // compute_batch
    // ==========================================================================

    #[tokio::test]
    async fn test_batch_keeps_request_order_and_isolates_failures() {
        let mut punches = PunchMap::new();
        punches.insert("emp_calc".to_string(), vec![at(5, 2, 8, 0), at(5, 2, 17, 0)]);

        let mut batch = request(vec![
            employee("emp_sim", OtMethod::Simulated),
            employee("emp_missing", OtMethod::Calculated),
            employee("emp_calc", OtMethod::Calculated),
            employee("emp_fixed", OtMethod::FixedNoOt),
        ]);
        batch.attendance = AttendanceInput::Punches(punches);

        let outcome = compute_batch(batch, context(), Entropy::Seeded(5)).await.unwrap();

        let ids: Vec<&str> = outcome.salaries.iter().map(|r| r.employee_id.as_str()).collect();
        assert_eq!(ids, vec!["emp_sim", "emp_calc", "emp_fixed"]);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].employee_id, "emp_missing");
        assert!(outcome.exists.is_empty());
        assert!(outcome.salaries.iter().all(SalaryRecord::is_balanced));
    }

    #[tokio::test]
    async fn test_batch_skips_existing_unless_update() {
        let company = context();
        let first = compute_batch(request(vec![employee("emp_001", OtMethod::Simulated)]), company.clone(), Entropy::Seeded(1))
            .await
            .unwrap();
        let mut previous = first.salaries[0].clone();
        previous.advance_amount = dec(2500);

        let mut again = request(vec![employee("emp_001", OtMethod::Simulated), employee("emp_002", OtMethod::FixedNoOt)]);
        again.existing = vec![previous.clone()];
        let skipped = compute_batch(again.clone(), company.clone(), Entropy::Seeded(1)).await.unwrap();
        assert_eq!(skipped.exists, vec!["emp_001".to_string()]);
        assert_eq!(skipped.salaries.len(), 1);

        again.update = true;
        let updated = compute_batch(again, company, Entropy::Seeded(1)).await.unwrap();
        assert!(updated.exists.is_empty());
        assert_eq!(updated.salaries[0].id, previous.id);
        assert_eq!(updated.salaries[0].advance_amount, dec(2500));
    }

    #[tokio::test]
    async fn test_seeded_batches_are_reproducible() {
        let batch = request(vec![employee("emp_001", OtMethod::Simulated), employee("emp_002", OtMethod::Simulated)]);
        let a = compute_batch(batch.clone(), context(), Entropy::Seeded(99)).await.unwrap();
        let b = compute_batch(batch, context(), Entropy::Seeded(99)).await.unwrap();

        for (x, y) in a.salaries.iter().zip(&b.salaries) {
            assert_eq!(x.attendance, y.attendance);
            assert_eq!(x.final_salary, y.final_salary);
        }
    }

    #[tokio::test]
    async fn test_batch_validation_rejects_whole_request() {
        let mut bad_period = request(vec![employee("emp_001", OtMethod::FixedNoOt)]);
        bad_period.period = "2024-13".to_string();
        assert!(matches!(
            compute_batch(bad_period, context(), Entropy::Os).await,
            Err(EngineError::InvalidPeriod { .. })
        ));

        assert!(matches!(
            compute_batch(request(vec![]), context(), Entropy::Os).await,
            Err(EngineError::InvalidRequest { .. })
        ));

        let duplicate = request(vec![employee("emp_001", OtMethod::FixedNoOt), employee("emp_001", OtMethod::Simulated)]);
        assert!(matches!(
            compute_batch(duplicate, context(), Entropy::Os).await,
            Err(EngineError::InvalidRequest { .. })
        ));

        let mut nominated = employee("emp_001", OtMethod::FixedNoOt);
        nominated.nominees = vec![
            Nominee { name: "A".to_string(), proportion: dec(60) },
            Nominee { name: "B".to_string(), proportion: dec(30) },
        ];
        match compute_batch(request(vec![nominated]), context(), Entropy::Os).await {
            Err(EngineError::ProportionMismatch { total, .. }) => assert_eq!(total, dec(90)),
            other => panic!("Expected ProportionMismatch, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_member_numbers_resolve_in_batch() {
        let mut worker = employee("emp_001", OtMethod::Calculated);
        worker.member_no = Some("101".to_string());
        let mut batch = request(vec![worker]);
        batch.attendance = AttendanceInput::Delimited(
            "memberNo,time\n101,2024-05-02T08:00:00Z\n101,2024-05-02T17:00:00Z\n202,2024-05-02T08:00:00Z\n"
                .to_string(),
        );

        let outcome = compute_batch(batch, context(), Entropy::Seeded(3)).await.unwrap();
        assert!(outcome.errors.is_empty());
        assert!(outcome.salaries[0].attendance[1].has_punches());
    }
}
