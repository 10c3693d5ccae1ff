//! HTTP surface for the VPN request coordination portal.
//!
//! This crate is the thin imperative shell around the `vpn-portal` workflow
//! engine: JSON extraction, error-to-status mapping, and routing. All
//! workflow decisions live in the engine; handlers never inspect or mutate
//! request state themselves.
//!
//! # Request Flow
//!
//! 1. **HTTP request** arrives at an Axum handler
//! 2. **Extract** the token or id from the path and the JSON body
//! 3. **Call** the corresponding engine operation
//! 4. **Map** the result to a response (`AppError` handles the failures)
//!
//! # Example
//!
//! ```ignore
//! use vpn_portal::engine::WorkflowEngine;
//! use vpn_portal::providers::ConsoleNotifier;
//! use vpn_portal::providers::SummaryRenderer;
//! use vpn_portal::stores::MemoryRequestStore;
//! use vpn_portal::PortalConfig;
//! use vpn_portal_web::{portal_router, AppState};
//!
//! let engine = WorkflowEngine::new(
//!     MemoryRequestStore::new(),
//!     ConsoleNotifier::new(PortalConfig::default()),
//!     SummaryRenderer::new(),
//! );
//! let app = portal_router(AppState::new(engine));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

// Re-export key types for convenience
pub use error::AppError;
pub use router::portal_router;
pub use state::AppState;

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
