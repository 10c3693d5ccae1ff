//! Error types for portal workflow operations.

use crate::state::RequestStatus;
use thiserror::Error;

/// Result type alias for portal operations.
pub type Result<T> = std::result::Result<T, PortalError>;

/// Error taxonomy for the request workflow.
///
/// Variants are organized by who can act on them: user-correctable input
/// problems, capability problems, workflow sequencing problems, and system
/// failures. Notification failures are deliberately never allowed to fail a
/// state transition; the variant exists so providers can report them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PortalError {
    /// Malformed or missing input; surfaced as a form re-render with messages.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Unresolvable or foreign token.
    ///
    /// Surfaced as a generic not-found page; the message must not reveal
    /// whether the token ever existed.
    #[error("This link is invalid or has expired")]
    InvalidToken,

    /// Action attempted outside its legal workflow state.
    #[error("Cannot {action} while the request is {status}")]
    State {
        /// The attempted action, for the "already moved on" message.
        action: &'static str,
        /// The status the request was actually in.
        status: RequestStatus,
    },

    /// Request or artifact looked up by id does not exist.
    #[error("Request not found")]
    NotFound,

    /// Persistence failure, fatal to the operation.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Email delivery failure; logged, never propagated out of a transition.
    #[error("Notification delivery failed: {0}")]
    Notification(String),

    /// Document rendering failure; finalization is never rolled back for it.
    #[error("Document rendering failed: {0}")]
    Render(String),
}

impl PortalError {
    /// Returns `true` if this error is due to invalid user input.
    pub const fn is_user_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::InvalidToken | Self::State { .. })
    }

    /// Returns `true` if this error must stay internal (never shown verbatim).
    pub const fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::Storage(_) | Self::Notification(_) | Self::Render(_)
        )
    }

    /// Shorthand for a [`PortalError::State`] error.
    #[must_use]
    pub const fn state(action: &'static str, status: RequestStatus) -> Self {
        Self::State { action, status }
    }
}
