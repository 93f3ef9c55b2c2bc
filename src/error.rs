//! Error types for the salary engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while computing salaries.

use thiserror::Error;

/// The main error type for the salary engine.
///
/// Batch-level variants (`InvalidPeriod`, `InvalidRequest`, `ProportionMismatch`)
/// reject a whole request; the rest are raised per employee and reported
/// alongside the successful records of a batch.
///
/// # Example
///
/// ```
/// use salary_engine::error::EngineError;
///
/// let error = EngineError::InvalidPeriod {
///     value: "2024-13".to_string(),
/// };
/// assert_eq!(error.to_string(), "Invalid period '2024-13': expected YYYY-MM");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A payroll period was not in `YYYY-MM` form.
    #[error("Invalid period '{value}': expected YYYY-MM")]
    InvalidPeriod {
        /// The rejected period text.
        value: String,
    },

    /// A batch request was structurally invalid.
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// A description of what made the request invalid.
        message: String,
    },

    /// Nominee proportions for an employee did not add up to 100%.
    #[error("Nominee proportions for employee '{employee_id}' sum to {total}%, expected 100%")]
    ProportionMismatch {
        /// The employee whose nominees were rejected.
        employee_id: String,
        /// The actual sum of the proportions.
        total: rust_decimal::Decimal,
    },

    /// A payment structure contained an item that cannot be resolved.
    #[error("Invalid payment structure item '{item}': {message}")]
    InvalidPaymentStructure {
        /// The name of the offending line item.
        item: String,
        /// A description of the problem.
        message: String,
    },

    /// An employee record was invalid or contained inconsistent data.
    #[error("Invalid employee field '{field}': {message}")]
    InvalidEmployee {
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// The calculated overtime method was selected but no punches were supplied.
    #[error("No attendance supplied for employee '{employee_id}' using the calculated OT method")]
    MissingAttendance {
        /// The employee without attendance.
        employee_id: String,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
