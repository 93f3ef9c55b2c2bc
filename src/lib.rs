//! Salary reconciliation engine
//!
//! This crate computes monthly salary records from attendance punches,
//! employment configuration and company holiday calendars. Attendance is
//! priced by one of three overtime strategies, and payment structures of
//! fixed, ranged and open line items are reconciled against an optional
//! target salary with EPF withheld at 8%.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
