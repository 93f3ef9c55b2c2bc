//! Request types for the salary engine API.
//!
//! This module defines the JSON request structures for the `/salaries/batch`
//! and `/salaries/compute` endpoints.

use serde::{Deserialize, Serialize};

use crate::calculation::{BatchRequest, Entropy};
use crate::models::{AttendanceInput, EmployeeSalaryInput, SalaryRecord};

/// Request body for the `/salaries/batch` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSalaryRequest {
    /// The payroll period, `YYYY-MM`.
    pub period: String,
    /// Employees to compute.
    pub employees: Vec<EmployeeSalaryInput>,
    /// Attendance for the period.
    #[serde(default)]
    pub attendance: AttendanceInput,
    /// Recompute employees that already have a record.
    #[serde(default)]
    pub update: bool,
    /// Previously generated records.
    #[serde(default)]
    pub existing: Vec<SalaryRecord>,
    /// Optional seed making random draws reproducible.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl BatchSalaryRequest {
    /// Splits the request into the engine batch and its random source.
    pub fn into_parts(self) -> (BatchRequest, Entropy) {
        let batch = BatchRequest {
            period: self.period,
            employees: self.employees,
            attendance: self.attendance,
            update: self.update,
            existing: self.existing,
        };
        (batch, Entropy::from(self.seed))
    }
}

/// Request body for the `/salaries/compute` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputeSalaryRequest {
    /// The payroll period, `YYYY-MM`.
    pub period: String,
    /// The employee to compute.
    pub employee: EmployeeSalaryInput,
    /// Attendance for the period.
    #[serde(default)]
    pub attendance: AttendanceInput,
    /// The record to update, if any.
    #[serde(default)]
    pub existing: Option<SalaryRecord>,
    /// Optional seed making random draws reproducible.
    #[serde(default)]
    pub seed: Option<u64>,
}
