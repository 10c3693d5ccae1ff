//! # VPN Request Coordination Portal
//!
//! This crate implements the workflow engine behind a site-to-site VPN
//! coordination portal: an initiator submits a request, the remote and local
//! network teams each fill in their technical parameters through tokenized
//! links, both sides review the merged configuration side by side, and the
//! request finalizes only on mutual, re-confirmable consent.
//!
//! ## Architecture
//!
//! The [`engine::WorkflowEngine`] owns the request lifecycle and is generic
//! over three collaborator traits:
//!
//! ```text
//! WorkflowEngine<S: RequestStore, N: Notifier, D: DocumentRenderer>
//! ```
//!
//! - [`providers::RequestStore`] — durable record of requests, detail sets,
//!   token index, and rendered artifacts
//! - [`providers::Notifier`] — best-effort templated messages at transition
//!   points (SMTP in production, console in development)
//! - [`providers::DocumentRenderer`] — TXT/PDF summary of a finalized request
//!
//! Tokens are capability tickets, not identities: holding a link is holding
//! the permission to act for one role on one request.

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

// Public modules
pub mod config;
pub mod engine;
pub mod error;
pub mod providers;
pub mod state;
pub mod stores;
pub mod token;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

// Re-export main types for convenience
pub use config::{PortalConfig, SmtpConfig};
pub use engine::{DetailForm, InitialRequestForm, WorkflowEngine};
pub use error::{PortalError, Result};
pub use state::{
    DetailSet, RequestId, RequestStatus, ReviewView, Role, VpnRequest, VpnType,
};
