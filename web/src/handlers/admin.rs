//! Administrative handlers.
//!
//! These endpoints expose the full request records, tokens included, so an
//! operator can hand out replacement links. Deployment is expected to put
//! this surface behind its own access control; the portal itself only
//! authenticates the token-gated routes.

use crate::error::AppError;
use crate::handlers::RequestView;
use crate::state::AppState;
use crate::WebResult;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    Json,
};
use serde::Serialize;
use vpn_portal::providers::{
    ArtifactKind, DocumentRenderer, NotificationKind, Notifier, RequestStore,
};
use vpn_portal::RequestId;

/// Admin projection of a request: the public view plus both tokens.
#[derive(Debug, Serialize)]
pub struct AdminRequestView {
    /// The request.
    #[serde(flatten)]
    pub request: RequestView,
    /// Capability token for the remote side.
    pub remote_token: String,
    /// Capability token for the local side.
    pub local_token: String,
}

/// List all requests, newest first.
///
/// # Endpoint
///
/// ```text
/// GET /admin/requests
/// ```
///
/// # Errors
///
/// 500 on storage failure.
pub async fn list_requests<S, N, D>(
    State(state): State<AppState<S, N, D>>,
) -> WebResult<Json<Vec<AdminRequestView>>>
where
    S: RequestStore + 'static,
    N: Notifier + 'static,
    D: DocumentRenderer + 'static,
{
    let requests = state.engine.list_requests().await?;
    let views = requests
        .into_iter()
        .map(|request| AdminRequestView {
            remote_token: request.remote_token.clone(),
            local_token: request.local_token.clone(),
            request: request.into(),
        })
        .collect();
    Ok(Json(views))
}

/// Re-send a notification for a request.
///
/// # Endpoint
///
/// ```text
/// POST /admin/requests/:id/resend/:kind     kind ∈ initial | agreement | final
/// ```
///
/// # Errors
///
/// 404 for an unknown id, 409 when the kind's stage precondition does not
/// hold, 422 for an unknown kind, 500 when delivery itself fails.
pub async fn resend<S, N, D>(
    State(state): State<AppState<S, N, D>>,
    Path((id, kind)): Path<(uuid::Uuid, String)>,
) -> WebResult<StatusCode>
where
    S: RequestStore + 'static,
    N: Notifier + 'static,
    D: DocumentRenderer + 'static,
{
    let kind: NotificationKind = kind
        .parse()
        .map_err(|()| AppError::validation(format!("unknown notification kind '{kind}'")))?;
    state.engine.resend(RequestId(id), kind).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Cancel a request.
///
/// # Endpoint
///
/// ```text
/// POST /admin/requests/:id/cancel
/// ```
///
/// # Errors
///
/// 404 for an unknown id, 409 for requests already terminal.
pub async fn cancel<S, N, D>(
    State(state): State<AppState<S, N, D>>,
    Path(id): Path<uuid::Uuid>,
) -> WebResult<Json<RequestView>>
where
    S: RequestStore + 'static,
    N: Notifier + 'static,
    D: DocumentRenderer + 'static,
{
    let request = state.engine.cancel(RequestId(id)).await?;
    Ok(Json(request.into()))
}

/// Download a stored summary artifact.
///
/// # Endpoint
///
/// ```text
/// GET /admin/requests/:id/artifact/:kind    kind ∈ txt | pdf
/// ```
///
/// # Errors
///
/// 404 for an unknown id or kind, a request that is not completed, or an
/// artifact whose rendering failed at finalization.
pub async fn artifact<S, N, D>(
    State(state): State<AppState<S, N, D>>,
    Path((id, kind)): Path<(uuid::Uuid, String)>,
) -> WebResult<([(header::HeaderName, &'static str); 1], Vec<u8>)>
where
    S: RequestStore + 'static,
    N: Notifier + 'static,
    D: DocumentRenderer + 'static,
{
    let kind: ArtifactKind = kind
        .parse()
        .map_err(|()| AppError::not_found("Not found"))?;
    let bytes = state.engine.artifact(RequestId(id), kind).await?;
    Ok(([(header::CONTENT_TYPE, kind.content_type())], bytes))
}
