//! Application state for the Payroll Calculation Engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::config::JurisdictionRegistry;

/// Shared application state.
///
/// Holds the immutable jurisdiction registry loaded at startup and the
/// worker count used for batch runs.
#[derive(Clone)]
pub struct AppState {
    registry: Arc<JurisdictionRegistry>,
    batch_workers: usize,
}

impl AppState {
    /// Creates application state over a loaded registry.
    pub fn new(registry: JurisdictionRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            batch_workers: rayon::current_num_threads(),
        }
    }

    /// Overrides the number of batch worker threads.
    pub fn with_batch_workers(mut self, workers: usize) -> Self {
        self.batch_workers = workers.max(1);
        self
    }

    /// Returns a reference to the jurisdiction registry.
    pub fn registry(&self) -> &JurisdictionRegistry {
        &self.registry
    }

    /// Returns a shared handle to the registry, for blocking workers.
    pub fn shared_registry(&self) -> Arc<JurisdictionRegistry> {
        Arc::clone(&self.registry)
    }

    /// Number of worker threads a batch run may use.
    pub fn batch_workers(&self) -> usize {
        self.batch_workers
    }
}
