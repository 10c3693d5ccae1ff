//! Core domain types for the VPN request workflow.
//!
//! All types are `Clone` and serializable; the store hands out owned
//! snapshots and the engine writes whole records back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ═══════════════════════════════════════════════════════════════════════
// ID Types
// ═══════════════════════════════════════════════════════════════════════

/// Unique identifier for a VPN request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub uuid::Uuid);

impl RequestId {
    /// Generate a new random `RequestId`.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Enumerations
// ═══════════════════════════════════════════════════════════════════════

/// One of the two independent parties collaborating on a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The remote-side contact (vendor / partner network team).
    Remote,
    /// The local network team.
    Local,
}

impl Role {
    /// The counterpart role.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::Remote => Self::Local,
            Self::Local => Self::Remote,
        }
    }

    /// Lowercase name, as used in links and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Remote => "remote",
            Self::Local => "local",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of site-to-site VPN being requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VpnType {
    /// Policy-based VPN (interesting traffic defined by crypto ACLs).
    Policy,
    /// Route-based VPN (tunnel interface plus routing).
    Routed,
}

impl fmt::Display for VpnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Policy => f.write_str("Policy"),
            Self::Routed => f.write_str("Routed"),
        }
    }
}

/// Lifecycle status of a request.
///
/// ```text
/// New → AwaitingDetails ⇄ AwaitingAgreement → Completed
///                 (any non-terminal) → Cancelled
/// ```
///
/// `New` exists only between record construction and token minting inside
/// the initial submission; persisted requests always start at
/// `AwaitingDetails`. `Completed` and `Cancelled` are terminal — requests
/// are never hard-deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Just created; tokens not yet minted.
    New,
    /// Waiting for one or both detail sets.
    AwaitingDetails,
    /// Both detail sets submitted; waiting for mutual agreement.
    AwaitingAgreement,
    /// Both parties agreed; artifacts generated.
    Completed,
    /// Withdrawn by an administrator; no further processing.
    Cancelled,
}

impl RequestStatus {
    /// Returns `true` for states no transition may leave.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::New => "new",
            Self::AwaitingDetails => "awaiting details",
            Self::AwaitingAgreement => "awaiting agreement",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Core records
// ═══════════════════════════════════════════════════════════════════════

/// One VPN setup request, owned exclusively by the workflow engine.
///
/// Created on initial submission, mutated only through engine-validated
/// transitions. The two tokens are capability tickets bound 1:1 to
/// (request, role); they are never reused across requests and never expire
/// while the request is live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VpnRequest {
    /// Unique request identifier.
    pub id: RequestId,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,

    /// VPN name / vendor.
    pub vpn_name: String,

    /// VPN type.
    pub vpn_type: VpnType,

    /// Business justification.
    pub justification: String,

    /// Requester name (optional).
    pub requester_name: Option<String>,

    /// Requester email (optional).
    pub requester_email: Option<String>,

    /// Remote contact name.
    pub remote_contact_name: String,

    /// Remote contact email.
    pub remote_contact_email: String,

    /// Local network team email; may be a comma-separated list.
    pub local_team_email: String,

    /// Capability token for the remote side.
    pub remote_token: String,

    /// Capability token for the local side.
    pub local_token: String,

    /// Lifecycle status.
    pub status: RequestStatus,

    /// When the remote side agreed; `None` = not agreed.
    pub remote_agreed_at: Option<DateTime<Utc>>,

    /// When the local side agreed; `None` = not agreed.
    pub local_agreed_at: Option<DateTime<Utc>>,
}

impl VpnRequest {
    /// The capability token bound to `role`.
    #[must_use]
    pub fn token_for(&self, role: Role) -> &str {
        match role {
            Role::Remote => &self.remote_token,
            Role::Local => &self.local_token,
        }
    }

    /// Agreement timestamp for `role`.
    #[must_use]
    pub const fn agreed_at(&self, role: Role) -> Option<DateTime<Utc>> {
        match role {
            Role::Remote => self.remote_agreed_at,
            Role::Local => self.local_agreed_at,
        }
    }

    /// Record or clear the agreement timestamp for `role`.
    pub const fn set_agreed_at(&mut self, role: Role, at: Option<DateTime<Utc>>) {
        match role {
            Role::Remote => self.remote_agreed_at = at,
            Role::Local => self.local_agreed_at = at,
        }
    }

    /// Both sides have consented to the current configuration.
    #[must_use]
    pub const fn both_agreed(&self) -> bool {
        self.remote_agreed_at.is_some() && self.local_agreed_at.is_some()
    }

    /// Email recipients for `role`.
    ///
    /// The local team address may be a comma-separated list; the remote side
    /// is always a single contact.
    #[must_use]
    pub fn recipients(&self, role: Role) -> Vec<String> {
        match role {
            Role::Remote => vec![self.remote_contact_email.clone()],
            Role::Local => crate::utils::split_recipients(&self.local_team_email),
        }
    }
}

/// Phase 1 (IKE SA) parameters for one side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase1Params {
    /// Encryption algorithm (e.g. "AES256").
    pub encryption: String,
    /// Authentication / hashing algorithm (e.g. "SHA256").
    pub authentication: String,
    /// Diffie-Hellman group (e.g. "14").
    pub dh_group: String,
    /// SA lifetime in seconds.
    pub lifetime_secs: u32,
}

/// Phase 2 (IPsec SA) parameters for one side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase2Params {
    /// ESP encryption algorithm.
    pub encryption: String,
    /// ESP hashing algorithm.
    pub hash: String,
    /// SA lifetime in seconds.
    pub lifetime_secs: u32,
    /// Perfect forward secrecy enabled.
    pub pfs: bool,
}

/// Technical configuration submitted by one role.
///
/// Belongs to exactly one request and one role. Immutable once the owning
/// request is completed, except through the explicit edit transition, which
/// resets the agreement flags for both sides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetailSet {
    /// Company / engineer name on this side.
    pub contact_name: String,

    /// Contact email on this side.
    pub contact_email: String,

    /// Gateway public IP or FQDN.
    pub gateway: String,

    /// IKE version (e.g. "IKEv2").
    pub ike_version: String,

    /// Phase 1 parameters.
    pub phase1: Phase1Params,

    /// Phase 2 parameters.
    pub phase2: Phase2Params,

    /// Protected subnets (CIDR strings).
    pub subnets: Vec<String>,

    /// Free-text notes.
    pub notes: String,

    /// This side has submitted its form at least once since the last edit.
    pub submitted: bool,

    /// Last submission timestamp.
    pub submitted_at: Option<DateTime<Utc>>,
}

/// Side-by-side review of both configurations.
///
/// Both detail sets are presented as submitted; the engine performs no
/// automatic conflict resolution. Cryptographic parameter mismatches are for
/// a human to catch, never to silently reconcile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewView {
    /// The request under review.
    pub request: VpnRequest,

    /// The role of the token holder viewing the review.
    pub viewer: Role,

    /// Remote-side configuration, if submitted.
    pub remote: Option<DetailSet>,

    /// Local-side configuration, if submitted.
    pub local: Option<DetailSet>,
}
