//! Application state for the attendance report API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::aggregation::AttendanceStore;
use crate::config::ConfigLoader;

/// Shared application state.
///
/// Contains resources that are shared across all request handlers: the
/// loaded configuration and the attendance store.
#[derive(Clone)]
pub struct AppState {
    /// The loaded report configuration.
    config: Arc<ConfigLoader>,
    /// Where attendance is read from.
    store: Arc<dyn AttendanceStore>,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(config: ConfigLoader, store: Arc<dyn AttendanceStore>) -> Self {
        Self {
            config: Arc::new(config),
            store,
        }
    }

    /// Returns a reference to the configuration loader.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// Returns the attendance store.
    pub fn store(&self) -> &dyn AttendanceStore {
        self.store.as_ref()
    }
}
