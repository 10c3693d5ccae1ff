//! Collaborator traits and production implementations.
//!
//! The workflow engine consumes three collaborators: a [`RequestStore`] for
//! durable records, a [`Notifier`] for best-effort templated messages, and a
//! [`DocumentRenderer`] for finalized-request artifacts. Everything here is
//! a thin I/O wrapper around the engine; the engine owns all the rules.

mod console;
mod notifier;
mod renderer;
mod smtp;
mod store;
mod summary;

pub use console::ConsoleNotifier;
pub use notifier::{
    build_emails, NotificationEvent, NotificationKind, Notifier, OutboundEmail,
};
pub use renderer::{ArtifactKind, DocumentRenderer};
pub use smtp::SmtpNotifier;
pub use store::RequestStore;
pub use summary::SummaryRenderer;
