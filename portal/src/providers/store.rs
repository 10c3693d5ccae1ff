//! Request store trait.

use crate::error::Result;
use crate::providers::ArtifactKind;
use crate::state::{DetailSet, RequestId, Role, VpnRequest};

/// Durable record of requests, detail sets, the token index, and rendered
/// artifacts.
///
/// # Implementation notes
///
/// - Every method is an atomic single-entity operation. The engine never
///   needs multi-entity transactions: each transition touches at most one
///   request record and at most one detail row, and all status/flag changes
///   for a transition arrive in a single [`RequestStore::update`] call.
/// - [`RequestStore::resolve_token`] must be an O(1) indexed lookup and
///   should not leak timing correlated with token validity beyond what the
///   index inherently does.
/// - Requests are never deleted; terminal states live in the status field.
pub trait RequestStore: Send + Sync {
    /// Persist a new request and index both of its tokens.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PortalError::Storage`] if the id or either token is
    /// already present, or if the storage operation fails.
    fn create(
        &self,
        request: VpnRequest,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Fetch a request by id.
    ///
    /// # Errors
    ///
    /// Returns an error only on storage failure; an unknown id is `Ok(None)`.
    fn get(
        &self,
        id: RequestId,
    ) -> impl std::future::Future<Output = Result<Option<VpnRequest>>> + Send;

    /// Atomically mutate an existing request record (status, agreement
    /// flags, ...) and return the resulting record.
    ///
    /// `apply` runs against the live record under the store's write
    /// serialization, never against a caller-held snapshot; this is what
    /// prevents lost updates when both sides act within the same instant.
    /// If `apply` returns an error the record is left untouched and the
    /// error is passed through.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PortalError::NotFound`] for an unknown id,
    /// [`crate::PortalError::Storage`] on storage failure, or whatever
    /// `apply` rejected the mutation with.
    fn update_with<F>(
        &self,
        id: RequestId,
        apply: F,
    ) -> impl std::future::Future<Output = Result<VpnRequest>> + Send
    where
        F: FnOnce(&mut VpnRequest) -> Result<()> + Send;

    /// All requests, newest first (admin view).
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    fn list(&self) -> impl std::future::Future<Output = Result<Vec<VpnRequest>>> + Send;

    /// Fetch one role's detail set, if it was ever written.
    ///
    /// # Errors
    ///
    /// Returns an error only on storage failure.
    fn get_detail(
        &self,
        id: RequestId,
        role: Role,
    ) -> impl std::future::Future<Output = Result<Option<DetailSet>>> + Send;

    /// Write or overwrite one role's detail set.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    fn upsert_detail(
        &self,
        id: RequestId,
        role: Role,
        detail: DetailSet,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Resolve a capability token to its (request, role) binding.
    ///
    /// A token resolves to exactly one pair or to nothing.
    ///
    /// # Errors
    ///
    /// Returns an error only on storage failure; an unknown token is
    /// `Ok(None)`.
    fn resolve_token(
        &self,
        token: &str,
    ) -> impl std::future::Future<Output = Result<Option<(RequestId, Role)>>> + Send;

    /// Store a rendered artifact for a finalized request.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    fn put_artifact(
        &self,
        id: RequestId,
        kind: ArtifactKind,
        bytes: Vec<u8>,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Fetch a stored artifact.
    ///
    /// # Errors
    ///
    /// Returns an error only on storage failure; a missing artifact is
    /// `Ok(None)`.
    fn get_artifact(
        &self,
        id: RequestId,
        kind: ArtifactKind,
    ) -> impl std::future::Future<Output = Result<Option<Vec<u8>>>> + Send;
}
