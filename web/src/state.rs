//! Application state for Axum handlers.

use std::sync::Arc;
use vpn_portal::engine::WorkflowEngine;

/// Application state shared across all HTTP handlers.
///
/// Holds the workflow engine behind an `Arc`; cloning is cheap and every
/// handler sees the same engine. Generic over the engine's collaborators so
/// tests can run on the in-memory store and recording mocks while the binary
/// wires in SMTP and the real renderer.
#[derive(Debug)]
pub struct AppState<S, N, D> {
    /// The workflow engine.
    pub engine: Arc<WorkflowEngine<S, N, D>>,
}

// Manual impl: `derive(Clone)` would require S: Clone etc., which the Arc
// makes unnecessary.
impl<S, N, D> Clone for AppState<S, N, D> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
        }
    }
}

impl<S, N, D> AppState<S, N, D> {
    /// Create a new application state around an engine.
    #[must_use]
    pub fn new(engine: WorkflowEngine<S, N, D>) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}
