//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading company
//! configurations from YAML files.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{EngineError, EngineResult};

use super::types::{CompanyConfig, CompanyContext, HolidaysConfig};

/// Loads and provides access to company configuration.
///
/// The `ConfigLoader` reads YAML configuration files from a directory and
/// builds the [`CompanyContext`] shared by every salary computation.
///
/// # Directory Structure
///
/// ```text
/// config/sample/
/// ├── company.yaml   # Shift, working days, policies, payment structure
/// └── holidays.yaml  # Named holiday calendars
/// ```
///
/// # Example
///
/// ```no_run
/// use salary_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/sample").unwrap();
/// println!("Loaded company: {}", loader.context().company().name);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    context: CompanyContext,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// Returns an error if either file is missing or is not valid YAML for
    /// its structure.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let company = Self::load_yaml::<CompanyConfig>(&path.join("company.yaml"))?;
        let holidays = Self::load_yaml::<HolidaysConfig>(&path.join("holidays.yaml"))?;

        debug!(
            company = %company.name,
            calendars = holidays.calendars.len(),
            "Loaded company configuration"
        );

        Ok(Self {
            context: CompanyContext::new(company, holidays.calendars),
        })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the loaded company context.
    pub fn context(&self) -> &CompanyContext {
        &self.context
    }

    /// Consumes the loader, returning the company context.
    pub fn into_context(self) -> CompanyContext {
        self.context
    }
}
