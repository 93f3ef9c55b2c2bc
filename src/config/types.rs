//! Configuration types for salary computation.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files, and the
//! [`CompanyContext`] shared read-only by every employee computation.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::{
    EmployeeSalaryInput, HolidayCalendar, HolidayPolicy, PaymentStructure, ShiftDefinition,
    SimulationProbabilities, WorkingDayPolicy,
};

static EMPTY_CALENDAR: HolidayCalendar = HolidayCalendar {
    holidays: Vec::new(),
};

fn default_calendar() -> String {
    "default".to_string()
}

fn default_ot_multiplier() -> Decimal {
    Decimal::new(15, 1)
}

fn default_holiday_pay_multiplier() -> Decimal {
    Decimal::new(2, 0)
}

/// Company-wide settings from `company.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyConfig {
    /// The company name.
    pub name: String,
    /// The default rostered shift.
    pub shift: ShiftDefinition,
    /// The default working-day policy.
    #[serde(default)]
    pub working_days: WorkingDayPolicy,
    /// The default holiday policy.
    #[serde(default)]
    pub holidays: HolidayPolicy,
    /// Calendar used by employees that do not select one.
    #[serde(default = "default_calendar")]
    pub default_calendar: String,
    /// Default simulation probabilities.
    #[serde(default)]
    pub probabilities: SimulationProbabilities,
    /// Default payment structure template.
    #[serde(default)]
    pub payment_structure: PaymentStructure,
    /// Multiplier applied to the hourly rate for overtime hours.
    #[serde(default = "default_ot_multiplier")]
    pub ot_multiplier: Decimal,
    /// Multiplier applied to the hourly rate for hours worked on a holiday.
    #[serde(default = "default_holiday_pay_multiplier")]
    pub holiday_pay_multiplier: Decimal,
}

/// Holiday calendars file structure (`holidays.yaml`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HolidaysConfig {
    /// Map of calendar name to its holidays.
    #[serde(default)]
    pub calendars: HashMap<String, HolidayCalendar>,
}

/// The settings an employee actually runs with, after overrides.
#[derive(Debug, Clone, Copy)]
pub struct EmployeeSettings<'a> {
    /// Rostered shift.
    pub shift: &'a ShiftDefinition,
    /// Working-day policy.
    pub working_days: &'a WorkingDayPolicy,
    /// Holiday policy.
    pub holidays: &'a HolidayPolicy,
    /// Simulation probabilities.
    pub probabilities: &'a SimulationProbabilities,
    /// Payment structure template.
    pub payment_structure: &'a PaymentStructure,
    /// Holiday calendar.
    pub calendar: &'a HolidayCalendar,
}

/// Shared, read-only company context for a salary run.
#[derive(Debug, Clone)]
pub struct CompanyContext {
    company: CompanyConfig,
    calendars: HashMap<String, HolidayCalendar>,
}

impl CompanyContext {
    /// Creates a context from company settings and named calendars.
    pub fn new(company: CompanyConfig, calendars: HashMap<String, HolidayCalendar>) -> Self {
        Self { company, calendars }
    }

    /// Returns the company settings.
    pub fn company(&self) -> &CompanyConfig {
        &self.company
    }

    /// Returns all calendars.
    pub fn calendars(&self) -> &HashMap<String, HolidayCalendar> {
        &self.calendars
    }

    /// Resolves the settings for an employee, applying their overrides.
    ///
    /// An explicitly selected calendar must exist; the company default may be
    /// missing, in which case no day is a holiday.
    pub fn settings_for<'a>(
        &'a self,
        employee: &'a EmployeeSalaryInput,
    ) -> EngineResult<EmployeeSettings<'a>> {
        let calendar = match employee.calendar.as_deref() {
            Some(name) => {
                self.calendars
                    .get(name)
                    .ok_or_else(|| EngineError::InvalidEmployee {
                        field: "calendar".to_string(),
                        message: format!("unknown holiday calendar '{}'", name),
                    })?
            }
            None => self
                .calendars
                .get(&self.company.default_calendar)
                .unwrap_or(&EMPTY_CALENDAR),
        };

        Ok(EmployeeSettings {
            shift: employee.shift.resolve(&self.company.shift),
            working_days: employee.working_days.resolve(&self.company.working_days),
            holidays: employee.holidays.resolve(&self.company.holidays),
            probabilities: employee.probabilities.resolve(&self.company.probabilities),
            payment_structure: employee
                .payment_structure
                .resolve(&self.company.payment_structure),
            calendar,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DayKind, Inherited, OtMethod};
    use chrono::{NaiveDate, NaiveTime};

    fn company() -> CompanyConfig {
        serde_json::from_str(
            r#"{
                "name": "Acme Garments",
                "shift": { "start": "08:00:00", "end": "17:00:00", "break_minutes": 60 }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_company_defaults() {
        let company = company();
        assert_eq!(company.default_calendar, "default");
        assert_eq!(company.ot_multiplier, Decimal::new(15, 1));
        assert_eq!(company.holiday_pay_multiplier, Decimal::new(2, 0));
        assert_eq!(company.working_days, WorkingDayPolicy::default());
    }

    #[test]
    fn test_settings_inherit_company_values() {
        let context = CompanyContext::new(company(), HashMap::new());
        let employee = EmployeeSalaryInput::new("emp_001", Decimal::new(50000, 0), OtMethod::Calculated);

        let settings = context.settings_for(&employee).unwrap();
        assert_eq!(settings.shift, &context.company().shift);
        assert!(settings.calendar.holidays.is_empty());
    }

    #[test]
    fn test_settings_apply_employee_overrides() {
        let mut calendars = HashMap::new();
        calendars.insert(
            "colombo".to_string(),
            HolidayCalendar {
                holidays: vec![crate::models::Holiday {
                    date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
                    categories: vec![],
                    summary: "May Day".to_string(),
                }],
            },
        );
        let context = CompanyContext::new(company(), calendars);

        let mut employee =
            EmployeeSalaryInput::new("emp_002", Decimal::new(40000, 0), OtMethod::Calculated);
        employee.calendar = Some("colombo".to_string());
        employee.working_days = Inherited::Employee(WorkingDayPolicy {
            saturday: DayKind::Off,
            ..WorkingDayPolicy::default()
        });
        employee.shift = Inherited::Employee(ShiftDefinition {
            start: NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
            end: NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
            break_minutes: 0,
        });

        let settings = context.settings_for(&employee).unwrap();
        assert_eq!(settings.working_days.saturday, DayKind::Off);
        assert_eq!(settings.shift.start, NaiveTime::from_hms_opt(6, 0, 0).unwrap());
        assert_eq!(settings.calendar.holidays.len(), 1);
    }

    #[test]
    fn test_unknown_calendar_is_an_error() {
        let context = CompanyContext::new(company(), HashMap::new());
        let mut employee =
            EmployeeSalaryInput::new("emp_003", Decimal::new(40000, 0), OtMethod::Simulated);
        employee.calendar = Some("nowhere".to_string());

        match context.settings_for(&employee) {
            Err(EngineError::InvalidEmployee { field, .. }) => assert_eq!(field, "calendar"),
            other => panic!("Expected InvalidEmployee error, got {:?}", other.map(|_| ())),
        }
    }
}
