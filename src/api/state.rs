//! Application state for the salary engine API.

use std::sync::Arc;

use crate::config::{CompanyContext, ConfigLoader};

/// Shared application state.
///
/// Holds the company context every request computes against. Batches hand
/// the same `Arc` to their per-employee tasks.
#[derive(Clone)]
pub struct AppState {
    context: Arc<CompanyContext>,
}

impl AppState {
    /// Creates a new application state from a loaded configuration.
    pub fn new(config: ConfigLoader) -> Self {
        Self {
            context: Arc::new(config.into_context()),
        }
    }

    /// Returns the shared company context.
    pub fn context(&self) -> Arc<CompanyContext> {
        Arc::clone(&self.context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_shares_context() {
        let state = AppState::new(ConfigLoader::load("./config/sample").unwrap());
        let cloned = state.clone();
        assert!(Arc::ptr_eq(&state.context(), &cloned.context()));
    }
}
