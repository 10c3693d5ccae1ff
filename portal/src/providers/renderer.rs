//! Document renderer trait.

use crate::error::Result;
use crate::state::{DetailSet, VpnRequest};
use serde::{Deserialize, Serialize};

/// Rendered artifact formats for a completed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// Plain-text summary.
    Txt,
    /// PDF summary.
    Pdf,
}

impl ArtifactKind {
    /// MIME type for HTTP delivery.
    #[must_use]
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Txt => "text/plain; charset=utf-8",
            Self::Pdf => "application/pdf",
        }
    }

    /// File extension without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Txt => "txt",
            Self::Pdf => "pdf",
        }
    }
}

impl std::str::FromStr for ArtifactKind {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "txt" => Ok(Self::Txt),
            "pdf" => Ok(Self::Pdf),
            _ => Err(()),
        }
    }
}

/// Document renderer collaborator.
///
/// Turns a finalized request plus both detail sets into human-readable
/// bytes. Layout and formatting are the renderer's business; the engine only
/// decides when rendering happens (exactly once, at finalization).
pub trait DocumentRenderer: Send + Sync {
    /// Render the summary document for `request` in the given format.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PortalError::Render`] if the document cannot be
    /// produced.
    fn render(
        &self,
        request: &VpnRequest,
        remote: &DetailSet,
        local: &DetailSet,
        kind: ArtifactKind,
    ) -> Result<Vec<u8>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_kind_parse() {
        assert_eq!("pdf".parse(), Ok(ArtifactKind::Pdf));
        assert_eq!("txt".parse(), Ok(ArtifactKind::Txt));
        assert!("doc".parse::<ArtifactKind>().is_err());
    }

    #[test]
    fn test_content_types() {
        assert_eq!(ArtifactKind::Pdf.content_type(), "application/pdf");
        assert!(ArtifactKind::Txt.content_type().starts_with("text/plain"));
    }
}
