//! Salary record model.
//!
//! A [`SalaryRecord`] is the persisted outcome of one employee's payroll
//! computation for one period.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{NormalizedAttendanceDay, Period, ResolvedPaymentStructure};

/// An amount together with the reason it was computed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountWithReason {
    /// The amount.
    pub amount: Decimal,
    /// Human-readable explanation.
    pub reason: String,
}

/// A monthly salary record.
///
/// # Example
///
/// ```
/// use salary_engine::models::{AmountWithReason, ResolvedPaymentStructure, SalaryRecord};
/// use chrono::Utc;
/// use rust_decimal::Decimal;
/// use uuid::Uuid;
///
/// let record = SalaryRecord {
///     id: Uuid::new_v4(),
///     employee_id: "emp_001".to_string(),
///     period: "2024-05".parse().unwrap(),
///     basic: Decimal::new(50000, 0),
///     holiday_pay: Decimal::ZERO,
///     no_pay: AmountWithReason::default(),
///     ot: AmountWithReason::default(),
///     payment_structure: ResolvedPaymentStructure::default(),
///     advance_amount: Decimal::ZERO,
///     final_salary: Decimal::new(50000, 0),
///     attendance: vec![],
///     remark: None,
///     generated_at: Utc::now(),
/// };
/// assert!(record.is_balanced());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryRecord {
    /// Record id, stable across updates.
    pub id: Uuid,
    /// The employee the record belongs to.
    pub employee_id: String,
    /// The payroll period.
    pub period: Period,
    /// Basic salary.
    pub basic: Decimal,
    /// Pay earned for work on holidays.
    pub holiday_pay: Decimal,
    /// No-pay deduction.
    pub no_pay: AmountWithReason,
    /// Overtime payment.
    pub ot: AmountWithReason,
    /// The resolved payment structure, EPF included.
    pub payment_structure: ResolvedPaymentStructure,
    /// Salary advance already paid out; carried across updates.
    pub advance_amount: Decimal,
    /// Net salary.
    pub final_salary: Decimal,
    /// Per-day attendance trace.
    pub attendance: Vec<NormalizedAttendanceDay>,
    /// Free-text remark.
    pub remark: Option<String>,
    /// When the record was last computed.
    pub generated_at: DateTime<Utc>,
}

impl SalaryRecord {
    /// Recomputes the net salary from the record's components.
    pub fn expected_final_salary(&self) -> Decimal {
        self.basic + self.holiday_pay + self.payment_structure.total_additions() + self.ot.amount
            - self.payment_structure.total_deductions()
            - self.no_pay.amount
    }

    /// Checks that `final_salary` matches its components exactly.
    pub fn is_balanced(&self) -> bool {
        self.final_salary == self.expected_final_salary()
    }
}
