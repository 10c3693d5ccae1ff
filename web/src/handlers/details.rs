//! Token-gated detail form handlers.

use crate::WebResult;
use crate::handlers::RequestView;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use vpn_portal::engine::DetailForm;
use vpn_portal::providers::{DocumentRenderer, Notifier, RequestStore};
use vpn_portal::{DetailSet, Role};

/// Detail form response: request context, the caller's role, and the
/// current (possibly empty) detail set for prefill.
#[derive(Debug, Serialize)]
pub struct DetailFormView {
    /// The request this form belongs to.
    pub request: RequestView,
    /// The role the presented token is bound to.
    pub role: Role,
    /// Current detail set; defaults when never submitted.
    pub detail: DetailSet,
}

/// Fetch the detail form for a token.
///
/// # Endpoint
///
/// ```text
/// GET /forms/:token
/// ```
///
/// # Errors
///
/// 404 for an unresolvable token, 409 once the request is terminal.
pub async fn fetch_form<S, N, D>(
    State(state): State<AppState<S, N, D>>,
    Path(token): Path<String>,
) -> WebResult<Json<DetailFormView>>
where
    S: RequestStore + 'static,
    N: Notifier + 'static,
    D: DocumentRenderer + 'static,
{
    let (request, role, detail) = state.engine.detail_form(&token).await?;
    Ok(Json(DetailFormView {
        request: request.into(),
        role,
        detail,
    }))
}

/// Submit or resubmit the detail form for a token.
///
/// # Endpoint
///
/// ```text
/// PUT /forms/:token
/// ```
///
/// Resubmission is always allowed before completion and always resets this
/// side's agreement.
///
/// # Errors
///
/// 404 for an unresolvable token, 409 once the request is terminal, 422 for
/// malformed fields.
pub async fn submit_form<S, N, D>(
    State(state): State<AppState<S, N, D>>,
    Path(token): Path<String>,
    Json(form): Json<DetailForm>,
) -> WebResult<Json<RequestView>>
where
    S: RequestStore + 'static,
    N: Notifier + 'static,
    D: DocumentRenderer + 'static,
{
    let request = state.engine.submit_detail(&token, form).await?;
    Ok(Json(request.into()))
}
