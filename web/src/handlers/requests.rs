//! Request creation.

use crate::WebResult;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use vpn_portal::engine::InitialRequestForm;
use vpn_portal::providers::{DocumentRenderer, Notifier, RequestStore};
use vpn_portal::{RequestId, RequestStatus, VpnRequest, VpnType};

/// Public projection of a request: everything except the capability tokens.
///
/// Token-gated handlers must never echo the other side's token, so the
/// tokens are stripped here once instead of in every handler.
#[derive(Debug, Clone, Serialize)]
pub struct RequestView {
    /// Request id.
    pub id: RequestId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// VPN name / vendor.
    pub vpn_name: String,
    /// VPN type.
    pub vpn_type: VpnType,
    /// Business justification.
    pub justification: String,
    /// Requester name.
    pub requester_name: Option<String>,
    /// Requester email.
    pub requester_email: Option<String>,
    /// Remote contact name.
    pub remote_contact_name: String,
    /// Remote contact email.
    pub remote_contact_email: String,
    /// Local network team email list.
    pub local_team_email: String,
    /// Lifecycle status.
    pub status: RequestStatus,
    /// When the remote side agreed.
    pub remote_agreed_at: Option<DateTime<Utc>>,
    /// When the local side agreed.
    pub local_agreed_at: Option<DateTime<Utc>>,
}

impl From<VpnRequest> for RequestView {
    fn from(request: VpnRequest) -> Self {
        Self {
            id: request.id,
            created_at: request.created_at,
            vpn_name: request.vpn_name,
            vpn_type: request.vpn_type,
            justification: request.justification,
            requester_name: request.requester_name,
            requester_email: request.requester_email,
            remote_contact_name: request.remote_contact_name,
            remote_contact_email: request.remote_contact_email,
            local_team_email: request.local_team_email,
            status: request.status,
            remote_agreed_at: request.remote_agreed_at,
            local_agreed_at: request.local_agreed_at,
        }
    }
}

/// Create a new VPN request.
///
/// # Endpoint
///
/// ```text
/// POST /requests
/// ```
///
/// Returns 201 with the created request. Both detail-invite emails go out
/// as a side effect; their tokens travel only by email, never in this
/// response.
///
/// # Errors
///
/// 422 for missing or malformed fields.
pub async fn create_request<S, N, D>(
    State(state): State<AppState<S, N, D>>,
    Json(form): Json<InitialRequestForm>,
) -> WebResult<(StatusCode, Json<RequestView>)>
where
    S: RequestStore + 'static,
    N: Notifier + 'static,
    D: DocumentRenderer + 'static,
{
    let request = state.engine.submit_initial(form).await?;
    Ok((StatusCode::CREATED, Json(request.into())))
}
