//! Portal router composition.
//!
//! Composes all portal handlers into a single Axum router.

use crate::handlers::{admin, agreement, details, health, requests};
use crate::state::AppState;
use axum::{
    routing::{get, post, put},
    Router,
};
use vpn_portal::providers::{DocumentRenderer, Notifier, RequestStore};

/// Create the portal router with all endpoints.
///
/// # Routes
///
/// ## Public
/// - `POST /requests` - Create a VPN request
/// - `GET /health` - Liveness check
///
/// ## Token-gated
/// - `GET /forms/:token` - Fetch the detail form
/// - `PUT /forms/:token` - Submit the detail form
/// - `GET /review/:token` - Fetch the side-by-side review
/// - `POST /review/:token/agree` - Record agreement
/// - `POST /review/:token/edit` - Request an edit
///
/// ## Admin
/// - `GET /admin/requests` - List all requests
/// - `POST /admin/requests/:id/resend/:kind` - Resend a notification
/// - `POST /admin/requests/:id/cancel` - Cancel a request
/// - `GET /admin/requests/:id/artifact/:kind` - Download a summary artifact
///
/// # Example
///
/// ```rust,ignore
/// let engine = WorkflowEngine::new(store, notifier, renderer);
/// let app = portal_router(AppState::new(engine))
///     .layer(TraceLayer::new_for_http());
/// ```
pub fn portal_router<S, N, D>(state: AppState<S, N, D>) -> Router
where
    S: RequestStore + 'static,
    N: Notifier + 'static,
    D: DocumentRenderer + 'static,
{
    Router::new()
        // Request creation
        .route("/requests", post(requests::create_request::<S, N, D>))
        // Detail forms
        .route(
            "/forms/:token",
            get(details::fetch_form::<S, N, D>).put(details::submit_form::<S, N, D>),
        )
        // Review and agreement
        .route("/review/:token", get(agreement::fetch_review::<S, N, D>))
        .route("/review/:token/agree", post(agreement::agree::<S, N, D>))
        .route("/review/:token/edit", post(agreement::request_edit::<S, N, D>))
        // Admin
        .route("/admin/requests", get(admin::list_requests::<S, N, D>))
        .route(
            "/admin/requests/:id/resend/:kind",
            post(admin::resend::<S, N, D>),
        )
        .route("/admin/requests/:id/cancel", post(admin::cancel::<S, N, D>))
        .route(
            "/admin/requests/:id/artifact/:kind",
            get(admin::artifact::<S, N, D>),
        )
        // Health
        .route("/health", get(health::health_check))
        .with_state(state)
}
