//! Review, agreement, and edit-request handlers.

use crate::WebResult;
use crate::handlers::RequestView;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use vpn_portal::providers::{DocumentRenderer, Notifier, RequestStore};
use vpn_portal::{DetailSet, Role};

/// Side-by-side review response.
///
/// Both detail sets exactly as submitted; mismatched parameters are the
/// reader's to catch.
#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    /// The request under review.
    pub request: RequestView,
    /// The role of the viewing token holder.
    pub viewer: Role,
    /// Remote-side configuration.
    pub remote: Option<DetailSet>,
    /// Local-side configuration.
    pub local: Option<DetailSet>,
}

/// Fetch the side-by-side review for a token.
///
/// # Endpoint
///
/// ```text
/// GET /review/:token
/// ```
///
/// # Errors
///
/// 404 for an unresolvable token, 409 unless the request is awaiting
/// agreement or completed.
pub async fn fetch_review<S, N, D>(
    State(state): State<AppState<S, N, D>>,
    Path(token): Path<String>,
) -> WebResult<Json<ReviewResponse>>
where
    S: RequestStore + 'static,
    N: Notifier + 'static,
    D: DocumentRenderer + 'static,
{
    let view = state.engine.review(&token).await?;
    Ok(Json(ReviewResponse {
        request: view.request.into(),
        viewer: view.viewer,
        remote: view.remote,
        local: view.local,
    }))
}

/// Record the token holder's agreement.
///
/// # Endpoint
///
/// ```text
/// POST /review/:token/agree
/// ```
///
/// When this is the second agreement the request finalizes: status moves to
/// completed and the summary artifacts are generated.
///
/// # Errors
///
/// 404 for an unresolvable token, 409 outside the agreement stage — which
/// includes an agreement that raced a concurrent edit request.
pub async fn agree<S, N, D>(
    State(state): State<AppState<S, N, D>>,
    Path(token): Path<String>,
) -> WebResult<Json<RequestView>>
where
    S: RequestStore + 'static,
    N: Notifier + 'static,
    D: DocumentRenderer + 'static,
{
    let request = state.engine.agree(&token).await?;
    Ok(Json(request.into()))
}

/// Re-open the token holder's detail form from the review stage.
///
/// # Endpoint
///
/// ```text
/// POST /review/:token/edit
/// ```
///
/// Clears consent on both sides and returns the workflow to awaiting
/// details.
///
/// # Errors
///
/// 404 for an unresolvable token, 409 outside the agreement stage.
pub async fn request_edit<S, N, D>(
    State(state): State<AppState<S, N, D>>,
    Path(token): Path<String>,
) -> WebResult<Json<RequestView>>
where
    S: RequestStore + 'static,
    N: Notifier + 'static,
    D: DocumentRenderer + 'static,
{
    let request = state.engine.request_edit(&token).await?;
    Ok(Json(request.into()))
}
