//! Configuration loading and management for the salary engine.
//!
//! This module loads the company configuration (shift, working days,
//! holiday policy, payment structure template, simulation probabilities)
//! and the named holiday calendars from YAML files.
//!
//! # Example
//!
//! ```no_run
//! use salary_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/sample").unwrap();
//! println!("Loaded company: {}", config.context().company().name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{CompanyConfig, CompanyContext, EmployeeSettings, HolidaysConfig};
