//! Mock document renderer for testing.

use crate::error::{PortalError, Result};
use crate::providers::{ArtifactKind, DocumentRenderer};
use crate::state::{DetailSet, RequestId, VpnRequest};
use std::sync::{Arc, Mutex};

/// Mock renderer.
///
/// Records every render call so tests can assert that document generation is
/// triggered exactly once per finalization.
#[derive(Debug, Clone, Default)]
pub struct MockRenderer {
    renders: Arc<Mutex<Vec<(RequestId, ArtifactKind)>>>,
    fail: bool,
}

impl MockRenderer {
    /// Create a new mock renderer that succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock renderer whose renders all fail.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            renders: Arc::new(Mutex::new(Vec::new())),
            fail: true,
        }
    }

    /// All recorded render calls, in order.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn renders(&self) -> Vec<(RequestId, ArtifactKind)> {
        self.renders.lock().unwrap().clone()
    }

    /// Number of render calls for one request.
    #[must_use]
    pub fn render_count(&self, id: RequestId) -> usize {
        self.renders().iter().filter(|(rid, _)| *rid == id).count()
    }
}

impl DocumentRenderer for MockRenderer {
    #[allow(clippy::unwrap_used)]
    fn render(
        &self,
        request: &VpnRequest,
        _remote: &DetailSet,
        _local: &DetailSet,
        kind: ArtifactKind,
    ) -> Result<Vec<u8>> {
        self.renders.lock().unwrap().push((request.id, kind));
        if self.fail {
            return Err(PortalError::Render("mock render failure".into()));
        }
        Ok(format!("{} summary for {}", kind.extension(), request.vpn_name).into_bytes())
    }
}
