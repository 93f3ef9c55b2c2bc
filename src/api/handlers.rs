//! HTTP request handlers for the salary engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::collections::HashMap;
use std::time::Instant;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{Entropy, compute_batch, compute_salary, normalize_attendance};
use crate::error::EngineError;
use crate::models::{Period, SalaryRecord};

use super::request::{BatchSalaryRequest, ComputeSalaryRequest};
use super::response::{ApiError, ApiErrorResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/salaries/batch", post(batch_handler))
        .route("/salaries/compute", post(compute_handler))
        .with_state(state)
}

fn json_response<T: serde::Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn engine_error_response(error: EngineError) -> Response {
    let api_error: ApiErrorResponse = error.into();
    json_response(api_error.status, api_error.error)
}

/// Maps a JSON extraction failure to a 400 response.
fn rejection_response(correlation_id: Uuid, rejection: JsonRejection) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    json_response(StatusCode::BAD_REQUEST, error)
}

/// Handler for POST /salaries/batch.
///
/// Computes salary records for every employee in the request. Per-employee
/// failures are reported inside the body; only request-level validation
/// failures produce an error status.
async fn batch_handler(
    State(state): State<AppState>,
    payload: Result<Json<BatchSalaryRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing salary batch request");

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let start_time = Instant::now();
    let (batch, entropy) = request.into_parts();
    match compute_batch(batch, state.context(), entropy).await {
        Ok(outcome) => {
            info!(
                correlation_id = %correlation_id,
                salaries = outcome.salaries.len(),
                exists = outcome.exists.len(),
                errors = outcome.errors.len(),
                duration_us = start_time.elapsed().as_micros(),
                "Salary batch completed"
            );
            json_response(StatusCode::OK, outcome)
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "Salary batch rejected"
            );
            engine_error_response(err)
        }
    }
}

/// Handler for POST /salaries/compute.
///
/// Computes a single employee's record, generating a new one or updating the
/// supplied existing record.
async fn compute_handler(
    State(state): State<AppState>,
    payload: Result<Json<ComputeSalaryRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing salary compute request");

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let start_time = Instant::now();
    match perform_compute(&state, request) {
        Ok(record) => {
            info!(
                correlation_id = %correlation_id,
                employee_id = %record.employee_id,
                final_salary = %record.final_salary,
                duration_us = start_time.elapsed().as_micros(),
                "Salary computed successfully"
            );
            json_response(StatusCode::OK, record)
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "Salary computation failed"
            );
            engine_error_response(err)
        }
    }
}

fn perform_compute(
    state: &AppState,
    request: ComputeSalaryRequest,
) -> Result<SalaryRecord, EngineError> {
    let period = Period::parse(&request.period)?;
    let employee = request.employee;

    let member_lookup: HashMap<String, String> = employee
        .member_no
        .iter()
        .map(|member_no| (member_no.clone(), employee.id.clone()))
        .collect();
    let punches = normalize_attendance(&request.attendance, &member_lookup);

    let mut rng = Entropy::from(request.seed).rng(0);
    compute_salary(
        &employee,
        &state.context(),
        period,
        punches.get(&employee.id).map(Vec::as_slice),
        request.existing.as_ref(),
        &mut rng,
    )
}
