//! Employee salary configuration.
//!
//! This module defines [`EmployeeSalaryInput`], assembled per request from
//! employee and company configuration, and the settings it references.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{AmountSpec, Holiday, HolidayCategory, PaymentStructure, ShiftDefinition, WorkingDayPolicy};

/// How attendance is turned into overtime and no-pay figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OtMethod {
    /// Overtime and no-pay are derived from real punches.
    Calculated,
    /// A plausible attendance trace is synthesized from probabilities.
    Simulated,
    /// No overtime; no-pay is proportional to absent days.
    FixedNoOt,
}

impl std::fmt::Display for OtMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OtMethod::Calculated => write!(f, "calculated"),
            OtMethod::Simulated => write!(f, "simulated"),
            OtMethod::FixedNoOt => write!(f, "fixed_no_ot"),
        }
    }
}

/// Monthly hours the basic salary is divided by to get an hourly rate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum PayDivisor {
    /// Divide by 240.
    #[default]
    Hours240,
    /// Divide by 200.
    Hours200,
}

impl PayDivisor {
    /// Returns the divisor as a decimal.
    pub fn value(self) -> Decimal {
        Decimal::from(u32::from(self))
    }
}

impl TryFrom<u32> for PayDivisor {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            240 => Ok(PayDivisor::Hours240),
            200 => Ok(PayDivisor::Hours200),
            other => Err(format!("divide_by must be 240 or 200, got {}", other)),
        }
    }
}

impl From<PayDivisor> for u32 {
    fn from(divisor: PayDivisor) -> Self {
        match divisor {
            PayDivisor::Hours240 => 240,
            PayDivisor::Hours200 => 200,
        }
    }
}

/// A setting either inherited from the company or overridden for the employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Inherited<T> {
    /// Use the company-wide value.
    Company,
    /// Use the employee-specific value.
    Employee(T),
}

impl<T> Default for Inherited<T> {
    fn default() -> Self {
        Inherited::Company
    }
}

impl<T> Inherited<T> {
    /// Picks the employee override, falling back to the company value.
    ///
    /// # Example
    ///
    /// ```
    /// use salary_engine::models::Inherited;
    ///
    /// let company = 240;
    /// assert_eq!(*Inherited::Company.resolve(&company), 240);
    /// assert_eq!(*Inherited::Employee(200).resolve(&company), 200);
    /// ```
    pub fn resolve<'a>(&'a self, company: &'a T) -> &'a T {
        match self {
            Inherited::Company => company,
            Inherited::Employee(value) => value,
        }
    }
}

/// Which holiday categories are paid days off for an employee.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayPolicy {
    /// Categories treated as holidays. Empty means every holiday applies.
    #[serde(default)]
    pub paid_categories: Vec<HolidayCategory>,
}

impl HolidayPolicy {
    /// Returns true when the holiday is a paid day off under this policy.
    pub fn applies_to(&self, holiday: &Holiday) -> bool {
        self.paid_categories.is_empty()
            || holiday
                .categories
                .iter()
                .any(|category| self.paid_categories.contains(category))
    }
}

/// Probabilities driving the simulated overtime strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationProbabilities {
    /// Chance of working on an off day.
    pub work_on_off_day: f64,
    /// Chance of working on a holiday.
    pub work_on_holiday: f64,
    /// Chance of being absent on a working day.
    pub absence: f64,
    /// Chance of arriving late on a working day.
    pub late: f64,
    /// Chance of staying past the shift end on a working day.
    pub overtime: f64,
}

impl Default for SimulationProbabilities {
    fn default() -> Self {
        Self {
            work_on_off_day: 0.1,
            work_on_holiday: 0.05,
            absence: 0.05,
            late: 0.1,
            overtime: 0.3,
        }
    }
}

/// A nominee sharing an employee's benefits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nominee {
    /// Nominee name.
    pub name: String,
    /// Share in percent.
    pub proportion: Decimal,
}

/// Everything needed to compute one employee's salary for a period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeSalaryInput {
    /// Internal employee id.
    pub id: String,
    /// External member number used by attendance devices.
    #[serde(default)]
    pub member_no: Option<String>,
    /// Contractual basic salary.
    pub basic: Decimal,
    /// Divisor used to derive the hourly rate.
    #[serde(default)]
    pub divide_by: PayDivisor,
    /// Overtime strategy.
    pub ot_method: OtMethod,
    /// Optional target total salary.
    #[serde(default)]
    pub target_salary: AmountSpec,
    /// Payment structure template.
    #[serde(default)]
    pub payment_structure: Inherited<PaymentStructure>,
    /// Rostered shift.
    #[serde(default)]
    pub shift: Inherited<ShiftDefinition>,
    /// Working-day policy.
    #[serde(default)]
    pub working_days: Inherited<WorkingDayPolicy>,
    /// Holiday policy.
    #[serde(default)]
    pub holidays: Inherited<HolidayPolicy>,
    /// Simulation probabilities.
    #[serde(default)]
    pub probabilities: Inherited<SimulationProbabilities>,
    /// Holiday calendar name; the company default when absent.
    #[serde(default)]
    pub calendar: Option<String>,
    /// Nominees; when present their proportions must add up to 100.
    #[serde(default)]
    pub nominees: Vec<Nominee>,
}

impl EmployeeSalaryInput {
    /// Creates an input with company-inherited settings.
    pub fn new(id: impl Into<String>, basic: Decimal, ot_method: OtMethod) -> Self {
        Self {
            id: id.into(),
            member_no: None,
            basic,
            divide_by: PayDivisor::default(),
            ot_method,
            target_salary: AmountSpec::Unspecified,
            payment_structure: Inherited::Company,
            shift: Inherited::Company,
            working_days: Inherited::Company,
            holidays: Inherited::Company,
            probabilities: Inherited::Company,
            calendar: None,
            nominees: vec![],
        }
    }

    /// Returns the hourly rate implied by basic and divisor.
    pub fn hourly_rate(&self) -> Decimal {
        self.basic / self.divide_by.value()
    }
}
