//! HTTP API module for the salary engine.
//!
//! This module provides the REST API endpoints for computing salary records
//! for a batch of employees or a single employee.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{BatchSalaryRequest, ComputeSalaryRequest};
pub use response::{ApiError, ApiErrorResponse};
pub use state::AppState;
