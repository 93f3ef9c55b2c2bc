//! Calculation logic for the salary engine.
//!
//! This module contains the attendance normalizer, the overtime strategies,
//! the compensation resolver that reconciles payment structures against a
//! target salary, and the builder that assembles salary records for single
//! employees and concurrent batches.

mod builder;
mod normalizer;
mod overtime;
mod random;
mod resolver;

pub use builder::{BatchOutcome, BatchRequest, EmployeeError, compute_batch, compute_salary};
pub use normalizer::{normalize_attendance, parse_timestamp};
pub use overtime::{
    CalculatedOvertime, FixedNoOvertime, OvertimeStrategy, SimulatedOvertime, StrategyContext,
    StrategyOutcome, strategy_for,
};
pub use random::{Entropy, HUNDRED, round_to_hundred};
pub use resolver::{
    Compensation, CompensationInput, EPF_RATE, resolve_compensation, validate_payment_structure,
};
