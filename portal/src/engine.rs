//! The workflow engine: request lifecycle, transition validation, and
//! finalization gating.
//!
//! # State machine
//!
//! ```text
//! New → AwaitingDetails ⇄ AwaitingAgreement → Completed
//! ```
//!
//! `submit_detail` loops inside `AwaitingDetails` while only one side has
//! submitted and moves to `AwaitingAgreement` exactly when both detail sets
//! are submitted. `agree` moves to `Completed` exactly when both agreement
//! flags are set. `request_edit` is the re-entrant edge back to
//! `AwaitingDetails`; it clears consent on both sides.
//!
//! Two rules are deliberate and must not be optimized away:
//!
//! - **Stale consent**: any detail submission resets that role's agreement
//!   flag, even when the content is unchanged. Consent always refers to the
//!   configuration as last reviewed.
//! - **No auto-merge**: the review presents both parameter sets side by
//!   side; mismatches are surfaced for human judgment, never reconciled.
//!
//! Every transition either fully commits or fully fails. Status and
//! agreement flags change only through [`RequestStore::update_with`], which
//! applies the mutation to the live record under the store's write
//! serialization — two sides acting within the same instant each land
//! their own write. Notification and artifact rendering happen strictly
//! after the commit and are best-effort.

use crate::error::{PortalError, Result};
use crate::providers::{
    ArtifactKind, DocumentRenderer, NotificationEvent, NotificationKind, Notifier, RequestStore,
};
use crate::state::{
    DetailSet, Phase1Params, Phase2Params, RequestId, RequestStatus, ReviewView, Role, VpnRequest,
    VpnType,
};
use crate::{token, utils};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Fields of the initial "new VPN request" form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitialRequestForm {
    /// VPN name / vendor.
    pub vpn_name: String,
    /// VPN type.
    pub vpn_type: VpnType,
    /// Business justification.
    pub justification: String,
    /// Requester name (optional).
    #[serde(default)]
    pub requester_name: Option<String>,
    /// Requester email (optional).
    #[serde(default)]
    pub requester_email: Option<String>,
    /// Remote contact name.
    pub remote_contact_name: String,
    /// Remote contact email.
    pub remote_contact_email: String,
    /// Local network team email; may be comma-separated.
    pub local_team_email: String,
}

/// Fields of one side's detail form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetailForm {
    /// Company / engineer name.
    #[serde(default)]
    pub contact_name: String,
    /// Contact email.
    #[serde(default)]
    pub contact_email: String,
    /// Gateway public IP / FQDN.
    pub gateway: String,
    /// IKE version.
    #[serde(default)]
    pub ike_version: String,
    /// Phase 1 parameters.
    #[serde(default)]
    pub phase1: Phase1Params,
    /// Phase 2 parameters.
    #[serde(default)]
    pub phase2: Phase2Params,
    /// Protected subnets (CIDR strings).
    #[serde(default)]
    pub subnets: Vec<String>,
    /// Free-text notes.
    #[serde(default)]
    pub notes: String,
}

impl DetailForm {
    fn into_detail_set(self) -> DetailSet {
        DetailSet {
            contact_name: self.contact_name,
            contact_email: self.contact_email,
            gateway: self.gateway,
            ike_version: self.ike_version,
            phase1: self.phase1,
            phase2: self.phase2,
            subnets: self.subnets,
            notes: self.notes,
            submitted: true,
            submitted_at: Some(Utc::now()),
        }
    }
}

/// The workflow engine.
///
/// Owns the request lifecycle. All mutation goes through engine-validated
/// transitions; the store, notifier, and renderer are collaborators the
/// engine drives, never the other way around.
#[derive(Debug, Clone)]
pub struct WorkflowEngine<S, N, D> {
    store: S,
    notifier: N,
    renderer: D,
}

impl<S, N, D> WorkflowEngine<S, N, D>
where
    S: RequestStore,
    N: Notifier,
    D: DocumentRenderer,
{
    /// Create a new workflow engine.
    #[must_use]
    pub const fn new(store: S, notifier: N, renderer: D) -> Self {
        Self {
            store,
            notifier,
            renderer,
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Transitions
    // ═══════════════════════════════════════════════════════════════════

    /// Create a request, mint both tokens, and invite both sides.
    ///
    /// The record is constructed in [`RequestStatus::New`] and advances to
    /// [`RequestStatus::AwaitingDetails`] before it is persisted, so a
    /// stored request is always actionable.
    ///
    /// # Errors
    ///
    /// [`PortalError::Validation`] for missing or malformed fields,
    /// [`PortalError::Storage`] on persistence failure.
    pub async fn submit_initial(&self, form: InitialRequestForm) -> Result<VpnRequest> {
        validate_initial(&form)?;

        let mut request = VpnRequest {
            id: RequestId::new(),
            created_at: Utc::now(),
            vpn_name: form.vpn_name,
            vpn_type: form.vpn_type,
            justification: form.justification,
            requester_name: none_if_blank(form.requester_name),
            requester_email: none_if_blank(form.requester_email),
            remote_contact_name: form.remote_contact_name,
            remote_contact_email: form.remote_contact_email,
            local_team_email: form.local_team_email,
            remote_token: token::mint(),
            local_token: token::mint(),
            status: RequestStatus::New,
            remote_agreed_at: None,
            local_agreed_at: None,
        };
        request.status = RequestStatus::AwaitingDetails;

        self.store.create(request.clone()).await?;
        info!(request_id = %request.id, vpn_name = %request.vpn_name, "request created");

        self.notify_best_effort(NotificationEvent::DetailInvites, &request)
            .await;
        Ok(request)
    }

    /// Fetch one side's current detail set for form prefill.
    ///
    /// # Errors
    ///
    /// [`PortalError::InvalidToken`] for an unresolvable token,
    /// [`PortalError::State`] once the request is completed or cancelled.
    pub async fn detail_form(&self, presented: &str) -> Result<(VpnRequest, Role, DetailSet)> {
        let (request, role) = self.resolve(presented).await?;
        if request.status.is_terminal() {
            return Err(PortalError::state("edit details", request.status));
        }
        let detail = self
            .store
            .get_detail(request.id, role)
            .await?
            .unwrap_or_default();
        Ok((request, role, detail))
    }

    /// Write or overwrite one side's detail set.
    ///
    /// Always resets that role's agreement flag, even for a no-op content
    /// edit. Transitions to [`RequestStatus::AwaitingAgreement`] exactly
    /// when both sides are submitted.
    ///
    /// # Errors
    ///
    /// [`PortalError::InvalidToken`], [`PortalError::State`] on terminal
    /// requests, [`PortalError::Validation`] for malformed fields,
    /// [`PortalError::Storage`] on persistence failure.
    pub async fn submit_detail(&self, presented: &str, form: DetailForm) -> Result<VpnRequest> {
        let (request, role) = self.resolve(presented).await?;
        if request.status.is_terminal() {
            return Err(PortalError::state("submit details", request.status));
        }
        validate_detail(&form)?;

        self.store
            .upsert_detail(request.id, role, form.into_detail_set())
            .await?;

        let other_submitted = self
            .store
            .get_detail(request.id, role.other())
            .await?
            .is_some_and(|d| d.submitted);

        // The flag/status mutation runs against the live record inside the
        // store; a simultaneous submission by the other side cannot be
        // overwritten with this call's stale snapshot.
        let request = self
            .store
            .update_with(request.id, move |req| {
                if req.status.is_terminal() {
                    return Err(PortalError::state("submit details", req.status));
                }
                req.set_agreed_at(role, None);
                if other_submitted {
                    req.status = RequestStatus::AwaitingAgreement;
                } else if req.status != RequestStatus::AwaitingAgreement {
                    // A concurrent peer submission may already have advanced
                    // the stage; never step it back down.
                    req.status = RequestStatus::AwaitingDetails;
                }
                Ok(())
            })
            .await?;

        let event = if request.status == RequestStatus::AwaitingAgreement {
            NotificationEvent::ReviewReady
        } else {
            NotificationEvent::AwaitingPeer { submitted: role }
        };

        info!(
            request_id = %request.id,
            role = %role,
            status = %request.status,
            "details submitted"
        );
        self.notify_best_effort(event, &request).await;
        Ok(request)
    }

    /// Present both configurations side by side for human review.
    ///
    /// No automatic conflict resolution happens here or anywhere else.
    ///
    /// # Errors
    ///
    /// [`PortalError::InvalidToken`], or [`PortalError::State`] unless the
    /// request is awaiting agreement or completed.
    pub async fn review(&self, presented: &str) -> Result<ReviewView> {
        let (request, role) = self.resolve(presented).await?;
        if !matches!(
            request.status,
            RequestStatus::AwaitingAgreement | RequestStatus::Completed
        ) {
            return Err(PortalError::state("review", request.status));
        }

        let remote = self
            .store
            .get_detail(request.id, Role::Remote)
            .await?
            .filter(|d| d.submitted);
        let local = self
            .store
            .get_detail(request.id, Role::Local)
            .await?
            .filter(|d| d.submitted);

        Ok(ReviewView {
            request,
            viewer: role,
            remote,
            local,
        })
    }

    /// Record one side's consent; finalize when both sides have consented.
    ///
    /// Agreement is only accepted in [`RequestStatus::AwaitingAgreement`].
    /// In particular, an agreement racing a concurrent edit request loses:
    /// the state has moved on and the stale consent is rejected.
    ///
    /// # Errors
    ///
    /// [`PortalError::InvalidToken`], [`PortalError::State`] outside
    /// `AwaitingAgreement`, [`PortalError::Storage`] on persistence failure.
    pub async fn agree(&self, presented: &str) -> Result<VpnRequest> {
        let (request, role) = self.resolve(presented).await?;

        // Both the state check and the flag mutation run against the live
        // record: two simultaneous agreements each land their own timestamp
        // and the later one observes both and finalizes.
        let request = self
            .store
            .update_with(request.id, move |req| {
                if req.status != RequestStatus::AwaitingAgreement {
                    return Err(PortalError::state("agree", req.status));
                }
                req.set_agreed_at(role, Some(Utc::now()));
                if req.both_agreed() {
                    req.status = RequestStatus::Completed;
                }
                Ok(())
            })
            .await?;
        let finalized = request.status == RequestStatus::Completed;

        info!(
            request_id = %request.id,
            role = %role,
            status = %request.status,
            "agreement recorded"
        );

        if finalized {
            // Post-commit work: generation happens exactly once, here.
            self.generate_artifacts(&request).await;
            self.notify_best_effort(NotificationEvent::Finalized, &request)
                .await;
        } else {
            self.notify_best_effort(NotificationEvent::AgreementRecorded { agreed: role }, &request)
                .await;
        }
        Ok(request)
    }

    /// Re-open the requesting side's form from the agreement stage.
    ///
    /// Clears consent on **both** sides and returns to
    /// [`RequestStatus::AwaitingDetails`]. The other side's submitted data
    /// is retained untouched pending re-review; the requesting side's data
    /// is retained for prefill but marked unsubmitted.
    ///
    /// # Errors
    ///
    /// [`PortalError::InvalidToken`], [`PortalError::State`] outside
    /// `AwaitingAgreement`, [`PortalError::Storage`] on persistence failure.
    pub async fn request_edit(&self, presented: &str) -> Result<VpnRequest> {
        let (request, role) = self.resolve(presented).await?;

        let request = self
            .store
            .update_with(request.id, |req| {
                if req.status != RequestStatus::AwaitingAgreement {
                    return Err(PortalError::state("request an edit", req.status));
                }
                req.remote_agreed_at = None;
                req.local_agreed_at = None;
                req.status = RequestStatus::AwaitingDetails;
                Ok(())
            })
            .await?;

        let mut detail = self
            .store
            .get_detail(request.id, role)
            .await?
            .unwrap_or_default();
        detail.submitted = false;
        self.store.upsert_detail(request.id, role, detail).await?;

        info!(request_id = %request.id, role = %role, "edit requested, consent cleared");
        Ok(request)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Admin operations
    // ═══════════════════════════════════════════════════════════════════

    /// All requests, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error on storage failure.
    pub async fn list_requests(&self) -> Result<Vec<VpnRequest>> {
        self.store.list().await
    }

    /// Re-trigger a notification for a request.
    ///
    /// # Errors
    ///
    /// [`PortalError::NotFound`] for an unknown id, [`PortalError::State`]
    /// when the kind's precondition does not hold (cancelled request,
    /// agreement emails before both sides submitted, final emails before
    /// completion), [`PortalError::Notification`] if delivery fails — here
    /// the failure is the operation's result, there is no transition to
    /// protect.
    pub async fn resend(&self, id: RequestId, kind: NotificationKind) -> Result<()> {
        let request = self.store.get(id).await?.ok_or(PortalError::NotFound)?;
        if request.status == RequestStatus::Cancelled {
            return Err(PortalError::state("resend notifications", request.status));
        }

        let event = match kind {
            NotificationKind::Initial => NotificationEvent::DetailInvites,
            NotificationKind::Agreement => {
                let both_submitted = self.both_submitted(id).await?;
                if !both_submitted {
                    return Err(PortalError::state(
                        "resend the agreement emails",
                        request.status,
                    ));
                }
                NotificationEvent::ReviewReady
            }
            NotificationKind::Final => {
                if request.status != RequestStatus::Completed {
                    return Err(PortalError::state(
                        "resend the final summary",
                        request.status,
                    ));
                }
                NotificationEvent::Finalized
            }
        };

        self.notifier.notify(event, &request).await
    }

    /// Cancel a request, stopping all further processing.
    ///
    /// # Errors
    ///
    /// [`PortalError::NotFound`] for an unknown id, [`PortalError::State`]
    /// for requests already in a terminal state.
    pub async fn cancel(&self, id: RequestId) -> Result<VpnRequest> {
        let request = self
            .store
            .update_with(id, |req| {
                if req.status.is_terminal() {
                    return Err(PortalError::state("cancel", req.status));
                }
                req.status = RequestStatus::Cancelled;
                Ok(())
            })
            .await?;
        info!(request_id = %request.id, "request cancelled");
        Ok(request)
    }

    /// Fetch a stored artifact for a completed request.
    ///
    /// # Errors
    ///
    /// [`PortalError::NotFound`] for an unknown id, a request that is not
    /// completed, or a missing artifact.
    pub async fn artifact(&self, id: RequestId, kind: ArtifactKind) -> Result<Vec<u8>> {
        let request = self.store.get(id).await?.ok_or(PortalError::NotFound)?;
        if request.status != RequestStatus::Completed {
            return Err(PortalError::NotFound);
        }
        self.store
            .get_artifact(id, kind)
            .await?
            .ok_or(PortalError::NotFound)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Internals
    // ═══════════════════════════════════════════════════════════════════

    /// Resolve a presented token to its request and role.
    ///
    /// The index lookup is O(1); the stored value is re-checked in constant
    /// time so a drifted index never resolves. All failure paths collapse
    /// into [`PortalError::InvalidToken`] — the caller learns nothing about
    /// whether the token ever existed.
    async fn resolve(&self, presented: &str) -> Result<(VpnRequest, Role)> {
        let Some((id, role)) = self.store.resolve_token(presented).await? else {
            return Err(PortalError::InvalidToken);
        };
        let Some(request) = self.store.get(id).await? else {
            return Err(PortalError::InvalidToken);
        };
        if !token::matches(presented, request.token_for(role)) {
            return Err(PortalError::InvalidToken);
        }
        Ok((request, role))
    }

    async fn both_submitted(&self, id: RequestId) -> Result<bool> {
        for role in [Role::Remote, Role::Local] {
            let submitted = self
                .store
                .get_detail(id, role)
                .await?
                .is_some_and(|d| d.submitted);
            if !submitted {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Render and store both artifacts for a just-finalized request.
    ///
    /// Runs after the completed status is committed; a failure here leaves
    /// the artifact slot empty (downloads 404) and never rolls the
    /// transition back.
    async fn generate_artifacts(&self, request: &VpnRequest) {
        let details = async {
            let remote = self
                .store
                .get_detail(request.id, Role::Remote)
                .await?
                .ok_or_else(|| PortalError::Storage("remote detail set missing".into()))?;
            let local = self
                .store
                .get_detail(request.id, Role::Local)
                .await?
                .ok_or_else(|| PortalError::Storage("local detail set missing".into()))?;
            Ok::<_, PortalError>((remote, local))
        }
        .await;

        let (remote, local) = match details {
            Ok(pair) => pair,
            Err(e) => {
                warn!(request_id = %request.id, error = %e, "artifact generation skipped");
                return;
            }
        };

        for kind in [ArtifactKind::Txt, ArtifactKind::Pdf] {
            let rendered = self.renderer.render(request, &remote, &local, kind);
            let result = match rendered {
                Ok(bytes) => self.store.put_artifact(request.id, kind, bytes).await,
                Err(e) => Err(e),
            };
            if let Err(e) = result {
                warn!(
                    request_id = %request.id,
                    kind = kind.extension(),
                    error = %e,
                    "artifact generation failed; request stays completed"
                );
            }
        }
    }

    async fn notify_best_effort(&self, event: NotificationEvent, request: &VpnRequest) {
        if let Err(e) = self.notifier.notify(event, request).await {
            warn!(
                request_id = %request.id,
                event = %event,
                error = %e,
                "notification delivery failed; transition already committed"
            );
        }
    }
}

fn none_if_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn validate_initial(form: &InitialRequestForm) -> Result<()> {
    let mut problems = Vec::new();

    if form.vpn_name.trim().is_empty() {
        problems.push("VPN name is required");
    }
    if form.justification.trim().is_empty() {
        problems.push("justification is required");
    }
    if form.remote_contact_name.trim().is_empty() {
        problems.push("remote contact name is required");
    }
    if !utils::is_valid_email(&form.remote_contact_email) {
        problems.push("remote contact email is invalid");
    }

    let local = utils::split_recipients(&form.local_team_email);
    if local.is_empty() {
        problems.push("local team email is required");
    } else if !local.iter().all(|addr| utils::is_valid_email(addr)) {
        problems.push("local team email list contains an invalid address");
    }

    if let Some(email) = &form.requester_email {
        if !email.trim().is_empty() && !utils::is_valid_email(email) {
            problems.push("requester email is invalid");
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(PortalError::Validation(problems.join("; ")))
    }
}

fn validate_detail(form: &DetailForm) -> Result<()> {
    let mut problems = Vec::new();

    if form.gateway.trim().is_empty() {
        problems.push("gateway is required");
    }
    if !form.contact_email.trim().is_empty() && !utils::is_valid_email(&form.contact_email) {
        problems.push("contact email is invalid");
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(PortalError::Validation(problems.join("; ")))
    }
}
