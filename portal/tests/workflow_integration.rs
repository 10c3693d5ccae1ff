//! End-to-end workflow tests against the in-memory store and recording
//! mocks: the full two-party lifecycle, token isolation, the stale-consent
//! rule, and failure isolation of the outward-facing collaborators.

use std::sync::Arc;
use tokio::sync::Barrier;
use vpn_portal::engine::{DetailForm, InitialRequestForm, WorkflowEngine};
use vpn_portal::mocks::{MockNotifier, MockRenderer};
use vpn_portal::providers::{ArtifactKind, NotificationEvent, NotificationKind, RequestStore};
use vpn_portal::state::{DetailSet, Phase1Params, Phase2Params, RequestStatus, Role, VpnType};
use vpn_portal::stores::MemoryRequestStore;
use vpn_portal::{PortalError, RequestId, VpnRequest};

type StoreResult<T> = vpn_portal::Result<T>;

type Engine = WorkflowEngine<MemoryRequestStore, MockNotifier, MockRenderer>;

struct Harness {
    engine: Engine,
    store: MemoryRequestStore,
    notifier: MockNotifier,
    renderer: MockRenderer,
}

fn harness() -> Harness {
    let store = MemoryRequestStore::new();
    let notifier = MockNotifier::new();
    let renderer = MockRenderer::new();
    Harness {
        engine: WorkflowEngine::new(store.clone(), notifier.clone(), renderer.clone()),
        store,
        notifier,
        renderer,
    }
}

fn initial_form() -> InitialRequestForm {
    InitialRequestForm {
        vpn_name: "ACME-VPN".into(),
        vpn_type: VpnType::Routed,
        justification: "Partner connectivity to ACME".into(),
        requester_name: Some("Sam Requester".into()),
        requester_email: Some("sam@corp.example".into()),
        remote_contact_name: "Jo Vendor".into(),
        remote_contact_email: "jo@acme.example".into(),
        local_team_email: "net@corp.example, sec@corp.example".into(),
    }
}

fn detail_form(gateway: &str) -> DetailForm {
    DetailForm {
        contact_name: "Engineer".into(),
        contact_email: "eng@x.example".into(),
        gateway: gateway.into(),
        ike_version: "IKEv2".into(),
        phase1: Phase1Params {
            encryption: "AES256".into(),
            authentication: "SHA256".into(),
            dh_group: "14".into(),
            lifetime_secs: 28800,
        },
        phase2: Phase2Params {
            encryption: "AES256".into(),
            hash: "SHA256".into(),
            lifetime_secs: 3600,
            pfs: true,
        },
        subnets: vec!["10.1.0.0/24".into()],
        notes: String::new(),
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Creation and tokens
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn test_submit_initial_mints_two_distinct_tokens() {
    let h = harness();
    let request = h.engine.submit_initial(initial_form()).await.unwrap();

    assert_eq!(request.status, RequestStatus::AwaitingDetails);
    assert_ne!(request.remote_token, request.local_token);
    assert_eq!(request.remote_token.len(), 43);
    assert_eq!(request.local_token.len(), 43);

    // Each token resolves to its own role on this request.
    let (_, _, _) = h.engine.detail_form(&request.remote_token).await.unwrap();
    let (got, role, _) = h.engine.detail_form(&request.local_token).await.unwrap();
    assert_eq!(got.id, request.id);
    assert_eq!(role, Role::Local);

    assert_eq!(
        h.notifier.events_for(request.id),
        vec![NotificationEvent::DetailInvites]
    );
}

#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn test_fabricated_token_is_rejected_without_detail() {
    let h = harness();
    h.engine.submit_initial(initial_form()).await.unwrap();

    for op in [
        h.engine.detail_form("A".repeat(43).as_str()).await.err(),
        h.engine
            .submit_detail("A".repeat(43).as_str(), detail_form("203.0.113.1"))
            .await
            .err(),
        h.engine.review("").await.err(),
        h.engine.agree("short").await.err(),
    ] {
        assert!(matches!(op, Some(PortalError::InvalidToken)));
    }
}

#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn test_validation_rejects_incomplete_initial_form() {
    let h = harness();
    let form = InitialRequestForm {
        local_team_email: "   ".into(),
        ..initial_form()
    };
    let err = h.engine.submit_initial(form).await.unwrap_err();
    assert!(matches!(err, PortalError::Validation(_)));
    assert!(h.store.list().await.unwrap().is_empty());
    assert!(h.notifier.events().is_empty());
}

// ═══════════════════════════════════════════════════════════════════════
// Detail submission
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn test_single_submission_stays_awaiting_details() {
    let h = harness();
    let request = h.engine.submit_initial(initial_form()).await.unwrap();

    let updated = h
        .engine
        .submit_detail(&request.remote_token, detail_form("198.51.100.7"))
        .await
        .unwrap();

    assert_eq!(updated.status, RequestStatus::AwaitingDetails);
    assert_eq!(
        h.notifier.events_for(request.id).last(),
        Some(&NotificationEvent::AwaitingPeer {
            submitted: Role::Remote
        })
    );
}

#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn test_both_submissions_reach_awaiting_agreement() {
    let h = harness();
    let request = h.engine.submit_initial(initial_form()).await.unwrap();

    h.engine
        .submit_detail(&request.remote_token, detail_form("198.51.100.7"))
        .await
        .unwrap();
    let updated = h
        .engine
        .submit_detail(&request.local_token, detail_form("203.0.113.1"))
        .await
        .unwrap();

    assert_eq!(updated.status, RequestStatus::AwaitingAgreement);
    assert_eq!(
        h.notifier.events_for(request.id).last(),
        Some(&NotificationEvent::ReviewReady)
    );

    // Review shows both sides untouched, no reconciliation.
    let view = h.engine.review(&request.local_token).await.unwrap();
    assert_eq!(view.viewer, Role::Local);
    assert_eq!(
        view.remote.as_ref().map(|d| d.gateway.as_str()),
        Some("198.51.100.7")
    );
    assert_eq!(
        view.local.as_ref().map(|d| d.gateway.as_str()),
        Some("203.0.113.1")
    );
}

#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn test_resubmit_clears_that_sides_agreement_even_when_unchanged() {
    let h = harness();
    let request = h.engine.submit_initial(initial_form()).await.unwrap();
    let form = detail_form("198.51.100.7");

    h.engine
        .submit_detail(&request.remote_token, form.clone())
        .await
        .unwrap();
    h.engine
        .submit_detail(&request.local_token, detail_form("203.0.113.1"))
        .await
        .unwrap();
    let agreed = h.engine.agree(&request.remote_token).await.unwrap();
    assert!(agreed.remote_agreed_at.is_some());

    // Byte-identical resubmission still resets remote consent.
    let updated = h
        .engine
        .submit_detail(&request.remote_token, form)
        .await
        .unwrap();
    assert_eq!(updated.remote_agreed_at, None);
    assert_eq!(updated.status, RequestStatus::AwaitingAgreement);
    assert_eq!(
        h.notifier.events_for(request.id).last(),
        Some(&NotificationEvent::ReviewReady)
    );
}

#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn test_review_before_both_submitted_is_a_state_error() {
    let h = harness();
    let request = h.engine.submit_initial(initial_form()).await.unwrap();

    let err = h.engine.review(&request.remote_token).await.unwrap_err();
    assert!(matches!(err, PortalError::State { .. }));
}

// ═══════════════════════════════════════════════════════════════════════
// Agreement and finalization
// ═══════════════════════════════════════════════════════════════════════

#[allow(clippy::unwrap_used)]
async fn submitted_request(h: &Harness) -> vpn_portal::VpnRequest {
    let request = h.engine.submit_initial(initial_form()).await.unwrap();
    h.engine
        .submit_detail(&request.remote_token, detail_form("198.51.100.7"))
        .await
        .unwrap();
    h.engine
        .submit_detail(&request.local_token, detail_form("203.0.113.1"))
        .await
        .unwrap()
}

#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn test_one_agreement_is_not_enough() {
    let h = harness();
    let request = submitted_request(&h).await;

    let updated = h.engine.agree(&request.local_token).await.unwrap();
    assert_eq!(updated.status, RequestStatus::AwaitingAgreement);
    assert!(updated.local_agreed_at.is_some());
    assert_eq!(updated.remote_agreed_at, None);
    assert_eq!(
        h.notifier.events_for(request.id).last(),
        Some(&NotificationEvent::AgreementRecorded {
            agreed: Role::Local
        })
    );
    assert_eq!(h.renderer.render_count(request.id), 0);
}

#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn test_both_agreements_finalize_and_render_exactly_once() {
    let h = harness();
    let request = submitted_request(&h).await;

    h.engine.agree(&request.local_token).await.unwrap();
    let finalized = h.engine.agree(&request.remote_token).await.unwrap();

    assert_eq!(finalized.status, RequestStatus::Completed);
    assert!(finalized.both_agreed());
    assert_eq!(
        h.notifier.events_for(request.id).last(),
        Some(&NotificationEvent::Finalized)
    );

    // One txt + one pdf render, nothing more on later reads.
    assert_eq!(h.renderer.render_count(request.id), 2);
    let txt = h
        .engine
        .artifact(request.id, ArtifactKind::Txt)
        .await
        .unwrap();
    assert!(String::from_utf8(txt).unwrap().contains("ACME-VPN"));
    h.engine
        .artifact(request.id, ArtifactKind::Pdf)
        .await
        .unwrap();
    assert_eq!(h.renderer.render_count(request.id), 2);
}

#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn test_completed_request_rejects_further_mutation() {
    let h = harness();
    let request = submitted_request(&h).await;
    h.engine.agree(&request.local_token).await.unwrap();
    h.engine.agree(&request.remote_token).await.unwrap();

    let resubmit = h
        .engine
        .submit_detail(&request.remote_token, detail_form("198.51.100.8"))
        .await
        .unwrap_err();
    assert!(matches!(
        resubmit,
        PortalError::State {
            status: RequestStatus::Completed,
            ..
        }
    ));

    let re_agree = h.engine.agree(&request.local_token).await.unwrap_err();
    assert!(matches!(re_agree, PortalError::State { .. }));

    // Review stays readable after completion.
    let view = h.engine.review(&request.remote_token).await.unwrap();
    assert_eq!(view.request.status, RequestStatus::Completed);
}

#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn test_agreement_racing_an_edit_is_rejected_as_stale() {
    let h = harness();
    let request = submitted_request(&h).await;

    // Local re-opens its form; remote's agreement click arrives after.
    h.engine.request_edit(&request.local_token).await.unwrap();
    let err = h.engine.agree(&request.remote_token).await.unwrap_err();
    assert!(matches!(
        err,
        PortalError::State {
            status: RequestStatus::AwaitingDetails,
            ..
        }
    ));
}

// ═══════════════════════════════════════════════════════════════════════
// Edit requests
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn test_request_edit_clears_both_consents_and_keeps_peer_data() {
    let h = harness();
    let request = submitted_request(&h).await;
    h.engine.agree(&request.remote_token).await.unwrap();

    let updated = h.engine.request_edit(&request.local_token).await.unwrap();
    assert_eq!(updated.status, RequestStatus::AwaitingDetails);
    assert_eq!(updated.remote_agreed_at, None);
    assert_eq!(updated.local_agreed_at, None);

    // Requesting side is re-opened with data retained for prefill.
    let (_, role, prefill) = h.engine.detail_form(&request.local_token).await.unwrap();
    assert_eq!(role, Role::Local);
    assert!(!prefill.submitted);
    assert_eq!(prefill.gateway, "203.0.113.1");

    // Peer data untouched: a single local resubmission restores review.
    let back = h
        .engine
        .submit_detail(&request.local_token, detail_form("203.0.113.9"))
        .await
        .unwrap();
    assert_eq!(back.status, RequestStatus::AwaitingAgreement);
}

#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn test_request_edit_outside_agreement_stage_is_rejected() {
    let h = harness();
    let request = h.engine.submit_initial(initial_form()).await.unwrap();

    let err = h.engine.request_edit(&request.remote_token).await.unwrap_err();
    assert!(matches!(
        err,
        PortalError::State {
            status: RequestStatus::AwaitingDetails,
            ..
        }
    ));
}

// ═══════════════════════════════════════════════════════════════════════
// Admin operations
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn test_list_requests_newest_first() {
    let h = harness();
    let first = h.engine.submit_initial(initial_form()).await.unwrap();
    let second = h
        .engine
        .submit_initial(InitialRequestForm {
            vpn_name: "BETA-VPN".into(),
            ..initial_form()
        })
        .await
        .unwrap();

    let all = h.engine.list_requests().await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].id, second.id);
    assert_eq!(all[1].id, first.id);
}

#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn test_resend_respects_stage_preconditions() {
    let h = harness();
    let request = h.engine.submit_initial(initial_form()).await.unwrap();
    h.notifier.clear();

    h.engine
        .resend(request.id, NotificationKind::Initial)
        .await
        .unwrap();
    assert_eq!(
        h.notifier.events_for(request.id),
        vec![NotificationEvent::DetailInvites]
    );

    // Agreement and final resends are premature here.
    assert!(matches!(
        h.engine
            .resend(request.id, NotificationKind::Agreement)
            .await,
        Err(PortalError::State { .. })
    ));
    assert!(matches!(
        h.engine.resend(request.id, NotificationKind::Final).await,
        Err(PortalError::State { .. })
    ));
}

#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn test_resend_final_after_completion() {
    let h = harness();
    let request = submitted_request(&h).await;
    h.engine.agree(&request.remote_token).await.unwrap();
    h.engine.agree(&request.local_token).await.unwrap();
    h.notifier.clear();

    h.engine
        .resend(request.id, NotificationKind::Final)
        .await
        .unwrap();
    assert_eq!(
        h.notifier.events_for(request.id),
        vec![NotificationEvent::Finalized]
    );
    // No re-render on resend.
    assert_eq!(h.renderer.render_count(request.id), 2);
}

#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn test_cancel_blocks_all_token_operations() {
    let h = harness();
    let request = h.engine.submit_initial(initial_form()).await.unwrap();

    let cancelled = h.engine.cancel(request.id).await.unwrap();
    assert_eq!(cancelled.status, RequestStatus::Cancelled);

    assert!(matches!(
        h.engine
            .submit_detail(&request.remote_token, detail_form("198.51.100.7"))
            .await,
        Err(PortalError::State { .. })
    ));
    assert!(matches!(
        h.engine.resend(request.id, NotificationKind::Initial).await,
        Err(PortalError::State { .. })
    ));
    assert!(matches!(
        h.engine.cancel(request.id).await,
        Err(PortalError::State { .. })
    ));
}

#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn test_artifact_is_not_found_before_completion() {
    let h = harness();
    let request = submitted_request(&h).await;

    assert!(matches!(
        h.engine.artifact(request.id, ArtifactKind::Txt).await,
        Err(PortalError::NotFound)
    ));
}

// ═══════════════════════════════════════════════════════════════════════
// Concurrency
// ═══════════════════════════════════════════════════════════════════════

/// Store wrapper that parks every request read on a barrier, so two
/// concurrent engine calls are forced to read the same pre-mutation
/// snapshot before either of them writes.
#[derive(Clone)]
struct RendezvousStore {
    inner: MemoryRequestStore,
    gate: Arc<Barrier>,
}

impl RequestStore for RendezvousStore {
    async fn create(&self, request: VpnRequest) -> StoreResult<()> {
        self.inner.create(request).await
    }

    async fn get(&self, id: RequestId) -> StoreResult<Option<VpnRequest>> {
        self.gate.wait().await;
        self.inner.get(id).await
    }

    async fn update_with<F>(&self, id: RequestId, apply: F) -> StoreResult<VpnRequest>
    where
        F: FnOnce(&mut VpnRequest) -> StoreResult<()> + Send,
    {
        self.inner.update_with(id, apply).await
    }

    async fn list(&self) -> StoreResult<Vec<VpnRequest>> {
        self.inner.list().await
    }

    async fn get_detail(&self, id: RequestId, role: Role) -> StoreResult<Option<DetailSet>> {
        self.inner.get_detail(id, role).await
    }

    async fn upsert_detail(&self, id: RequestId, role: Role, detail: DetailSet) -> StoreResult<()> {
        self.inner.upsert_detail(id, role, detail).await
    }

    async fn resolve_token(&self, token: &str) -> StoreResult<Option<(RequestId, Role)>> {
        self.inner.resolve_token(token).await
    }

    async fn put_artifact(&self, id: RequestId, kind: ArtifactKind, bytes: Vec<u8>) -> StoreResult<()> {
        self.inner.put_artifact(id, kind, bytes).await
    }

    async fn get_artifact(&self, id: RequestId, kind: ArtifactKind) -> StoreResult<Option<Vec<u8>>> {
        self.inner.get_artifact(id, kind).await
    }
}

#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn test_simultaneous_agreements_both_persist() {
    let store = MemoryRequestStore::new();
    let setup = WorkflowEngine::new(store.clone(), MockNotifier::new(), MockRenderer::new());

    let request = setup.submit_initial(initial_form()).await.unwrap();
    setup
        .submit_detail(&request.remote_token, detail_form("198.51.100.7"))
        .await
        .unwrap();
    setup
        .submit_detail(&request.local_token, detail_form("203.0.113.1"))
        .await
        .unwrap();

    // Both agreements read the same awaiting-agreement snapshot before
    // either write lands.
    let racing = RendezvousStore {
        inner: store.clone(),
        gate: Arc::new(Barrier::new(2)),
    };
    let engine = WorkflowEngine::new(racing, MockNotifier::new(), MockRenderer::new());

    let remote = {
        let engine = engine.clone();
        let token = request.remote_token.clone();
        tokio::spawn(async move { engine.agree(&token).await })
    };
    let local = {
        let engine = engine.clone();
        let token = request.local_token.clone();
        tokio::spawn(async move { engine.agree(&token).await })
    };
    let remote = remote.await.unwrap().unwrap();
    let local = local.await.unwrap().unwrap();

    // Neither write is lost: both timestamps persist and whichever call
    // landed second finalized the request.
    let stored = store.get(request.id).await.unwrap().unwrap();
    assert!(stored.both_agreed());
    assert_eq!(stored.status, RequestStatus::Completed);
    assert!(
        remote.status == RequestStatus::Completed || local.status == RequestStatus::Completed
    );
}

// ═══════════════════════════════════════════════════════════════════════
// Failure isolation
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn test_notification_failure_never_fails_a_transition() {
    let store = MemoryRequestStore::new();
    let notifier = MockNotifier::failing();
    let engine = WorkflowEngine::new(store.clone(), notifier, MockRenderer::new());

    let request = engine.submit_initial(initial_form()).await.unwrap();
    engine
        .submit_detail(&request.remote_token, detail_form("198.51.100.7"))
        .await
        .unwrap();
    engine
        .submit_detail(&request.local_token, detail_form("203.0.113.1"))
        .await
        .unwrap();
    engine.agree(&request.remote_token).await.unwrap();
    let finalized = engine.agree(&request.local_token).await.unwrap();

    assert_eq!(finalized.status, RequestStatus::Completed);

    // Admin resend surfaces the delivery failure instead: there is no
    // transition for it to protect.
    assert!(matches!(
        engine.resend(request.id, NotificationKind::Initial).await,
        Err(PortalError::Notification(_))
    ));
}

#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn test_render_failure_leaves_request_completed_without_artifacts() {
    let store = MemoryRequestStore::new();
    let renderer = MockRenderer::failing();
    let engine = WorkflowEngine::new(store.clone(), MockNotifier::new(), renderer);

    let request = engine.submit_initial(initial_form()).await.unwrap();
    engine
        .submit_detail(&request.remote_token, detail_form("198.51.100.7"))
        .await
        .unwrap();
    engine
        .submit_detail(&request.local_token, detail_form("203.0.113.1"))
        .await
        .unwrap();
    engine.agree(&request.remote_token).await.unwrap();
    let finalized = engine.agree(&request.local_token).await.unwrap();

    assert_eq!(finalized.status, RequestStatus::Completed);
    assert!(matches!(
        engine.artifact(request.id, ArtifactKind::Txt).await,
        Err(PortalError::NotFound)
    ));
}
