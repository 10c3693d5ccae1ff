//! Mock notifier for testing.

use crate::error::{PortalError, Result};
use crate::providers::{NotificationEvent, Notifier};
use crate::state::{RequestId, VpnRequest};
use std::sync::{Arc, Mutex};

/// Mock notifier.
///
/// Records every event instead of delivering anything. Can be switched to
/// fail, for asserting that notification failures never fail a transition.
#[derive(Debug, Clone, Default)]
pub struct MockNotifier {
    events: Arc<Mutex<Vec<(RequestId, NotificationEvent)>>>,
    fail: bool,
}

impl MockNotifier {
    /// Create a new mock notifier that succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock notifier whose deliveries all fail.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            fail: true,
        }
    }

    /// All recorded events, in order.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn events(&self) -> Vec<(RequestId, NotificationEvent)> {
        self.events.lock().unwrap().clone()
    }

    /// Events recorded for one request.
    #[must_use]
    pub fn events_for(&self, id: RequestId) -> Vec<NotificationEvent> {
        self.events()
            .into_iter()
            .filter(|(rid, _)| *rid == id)
            .map(|(_, event)| event)
            .collect()
    }

    /// Drop all recorded events.
    #[allow(clippy::unwrap_used)]
    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl Notifier for MockNotifier {
    #[allow(clippy::unwrap_used)]
    async fn notify(&self, event: NotificationEvent, request: &VpnRequest) -> Result<()> {
        self.events.lock().unwrap().push((request.id, event));
        if self.fail {
            return Err(PortalError::Notification("mock delivery failure".into()));
        }
        Ok(())
    }
}
