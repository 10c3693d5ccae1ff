//! In-memory request store.

use crate::error::{PortalError, Result};
use crate::providers::{ArtifactKind, RequestStore};
use crate::state::{DetailSet, RequestId, Role, VpnRequest};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// In-memory request store.
///
/// Mutex-protected maps plus a token index. Each trait method takes the lock
/// once, so every store operation is atomic; this is what serializes the
/// status/flag mutation when both sides act within the same instant.
///
/// Persistence engine choice is out of scope for the portal, so this is the
/// production store as well as the test store. Swapping in a database later
/// only means implementing [`RequestStore`] elsewhere.
#[derive(Debug, Clone, Default)]
pub struct MemoryRequestStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    requests: HashMap<RequestId, VpnRequest>,
    details: HashMap<(RequestId, Role), DetailSet>,
    tokens: HashMap<String, (RequestId, Role)>,
    artifacts: HashMap<(RequestId, ArtifactKind), Vec<u8>>,
    /// Creation order, oldest first.
    order: Vec<RequestId>,
}

impl MemoryRequestStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| PortalError::Storage("request store mutex poisoned".into()))
    }
}

impl RequestStore for MemoryRequestStore {
    async fn create(&self, request: VpnRequest) -> Result<()> {
        let mut inner = self.lock()?;

        if inner.requests.contains_key(&request.id) {
            return Err(PortalError::Storage(format!(
                "request {} already exists",
                request.id
            )));
        }
        if inner.tokens.contains_key(&request.remote_token)
            || inner.tokens.contains_key(&request.local_token)
        {
            return Err(PortalError::Storage("token collision on create".into()));
        }

        inner
            .tokens
            .insert(request.remote_token.clone(), (request.id, Role::Remote));
        inner
            .tokens
            .insert(request.local_token.clone(), (request.id, Role::Local));
        inner.order.push(request.id);
        inner.requests.insert(request.id, request);
        Ok(())
    }

    async fn get(&self, id: RequestId) -> Result<Option<VpnRequest>> {
        Ok(self.lock()?.requests.get(&id).cloned())
    }

    async fn update_with<F>(&self, id: RequestId, apply: F) -> Result<VpnRequest>
    where
        F: FnOnce(&mut VpnRequest) -> Result<()> + Send,
    {
        let mut inner = self.lock()?;
        let Some(slot) = inner.requests.get_mut(&id) else {
            return Err(PortalError::NotFound);
        };
        // Mutate a copy so a rejected mutation leaves the record untouched.
        let mut updated = slot.clone();
        apply(&mut updated)?;
        *slot = updated.clone();
        Ok(updated)
    }

    async fn list(&self) -> Result<Vec<VpnRequest>> {
        let inner = self.lock()?;
        Ok(inner
            .order
            .iter()
            .rev()
            .filter_map(|id| inner.requests.get(id).cloned())
            .collect())
    }

    async fn get_detail(&self, id: RequestId, role: Role) -> Result<Option<DetailSet>> {
        Ok(self.lock()?.details.get(&(id, role)).cloned())
    }

    async fn upsert_detail(&self, id: RequestId, role: Role, detail: DetailSet) -> Result<()> {
        self.lock()?.details.insert((id, role), detail);
        Ok(())
    }

    async fn resolve_token(&self, token: &str) -> Result<Option<(RequestId, Role)>> {
        Ok(self.lock()?.tokens.get(token).copied())
    }

    async fn put_artifact(&self, id: RequestId, kind: ArtifactKind, bytes: Vec<u8>) -> Result<()> {
        self.lock()?.artifacts.insert((id, kind), bytes);
        Ok(())
    }

    async fn get_artifact(&self, id: RequestId, kind: ArtifactKind) -> Result<Option<Vec<u8>>> {
        Ok(self.lock()?.artifacts.get(&(id, kind)).cloned())
    }
}
