//! Notifier trait, notification events, and shared email templating.

use crate::config::PortalConfig;
use crate::error::Result;
use crate::state::{Role, VpnRequest};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A transition point the workflow engine announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationEvent {
    /// Request created: invite both sides to fill in their forms.
    DetailInvites,

    /// One side submitted first; nudge the other side.
    AwaitingPeer {
        /// The side that just submitted.
        submitted: Role,
    },

    /// Both sides submitted: review links go out to both.
    ReviewReady,

    /// One side agreed; inform the other that their review is pending.
    AgreementRecorded {
        /// The side that agreed.
        agreed: Role,
    },

    /// Both sides agreed; the request is finalized.
    Finalized,
}

impl fmt::Display for NotificationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DetailInvites => f.write_str("detail invites"),
            Self::AwaitingPeer { submitted } => write!(f, "awaiting peer of {submitted}"),
            Self::ReviewReady => f.write_str("review ready"),
            Self::AgreementRecorded { agreed } => write!(f, "agreement recorded by {agreed}"),
            Self::Finalized => f.write_str("finalized"),
        }
    }
}

/// Notification kinds an administrator can re-trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// The detail-invite emails with the tokenized form links.
    Initial,
    /// The review & agree emails.
    Agreement,
    /// The final summary emails.
    Final,
}

impl std::str::FromStr for NotificationKind {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "initial" => Ok(Self::Initial),
            "agreement" => Ok(Self::Agreement),
            "final" => Ok(Self::Final),
            _ => Err(()),
        }
    }
}

/// Notifier collaborator.
///
/// Delivery is best-effort relative to the state transition: the engine
/// calls `notify` strictly after the transition is persisted and logs (but
/// never propagates) a failure.
pub trait Notifier: Send + Sync {
    /// Deliver the messages for `event` on `request`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PortalError::Notification`] if delivery fails; the
    /// caller treats this as fire-and-forget.
    fn notify(
        &self,
        event: NotificationEvent,
        request: &VpnRequest,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// One email ready for a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub html_body: String,
}

/// Build the emails for an event.
///
/// Shared by the SMTP and console notifiers so the two transports cannot
/// drift apart. The local team field fans out to one email per address.
#[must_use]
pub fn build_emails(
    event: NotificationEvent,
    request: &VpnRequest,
    config: &PortalConfig,
) -> Vec<OutboundEmail> {
    let name = &request.vpn_name;

    match event {
        NotificationEvent::DetailInvites => {
            let mut emails = vec![OutboundEmail {
                to: request.remote_contact_email.clone(),
                subject: format!("[VPN Portal] Please provide remote details for '{name}'"),
                html_body: format!(
                    "<p>Hello {},</p>\
                     <p>Please provide your side's VPN details here: {}</p>\
                     <p>Reason: {}</p>",
                    request.remote_contact_name,
                    link(&config.form_link(&request.remote_token)),
                    request.justification,
                ),
            }];
            for addr in request.recipients(Role::Local) {
                emails.push(OutboundEmail {
                    to: addr,
                    subject: format!("[VPN Portal] Please provide local details for '{name}'"),
                    html_body: format!(
                        "<p>Please provide your local VPN details here: {}</p>\
                         <p>Reason: {}</p>",
                        link(&config.form_link(&request.local_token)),
                        request.justification,
                    ),
                });
            }
            emails
        }

        NotificationEvent::AwaitingPeer { submitted } => {
            let waiting_on = submitted.other();
            request
                .recipients(waiting_on)
                .into_iter()
                .map(|addr| OutboundEmail {
                    to: addr,
                    subject: format!("[VPN Portal] '{name}' is waiting on your details"),
                    html_body: format!(
                        "<p>The {submitted} side has submitted its details for \
                         <strong>{name}</strong>.</p>\
                         <p>Please provide yours here: {}</p>",
                        link(&config.form_link(request.token_for(waiting_on))),
                    ),
                })
                .collect()
        }

        NotificationEvent::ReviewReady => both_sides(request, |role, addr| OutboundEmail {
            to: addr,
            subject: format!("[VPN Portal] Review & Agree — {name}"),
            html_body: format!(
                "<p>Both sides have submitted details for <strong>{name}</strong>.</p>\
                 <p>Please review and either Agree or Edit using this link: {}</p>",
                link(&config.review_link(request.token_for(role))),
            ),
        }),

        NotificationEvent::AgreementRecorded { agreed } => {
            let pending = agreed.other();
            request
                .recipients(pending)
                .into_iter()
                .map(|addr| OutboundEmail {
                    to: addr,
                    subject: format!("[VPN Portal] The {agreed} side agreed — {name}"),
                    html_body: format!(
                        "<p>The {agreed} side has agreed to the configuration of \
                         <strong>{name}</strong>.</p>\
                         <p>Your review is still pending: {}</p>",
                        link(&config.review_link(request.token_for(pending))),
                    ),
                })
                .collect()
        }

        NotificationEvent::Finalized => both_sides(request, |role, addr| OutboundEmail {
            to: addr,
            subject: format!("[VPN Portal] Finalized VPN - {name}"),
            html_body: format!(
                "<p>Both parties have agreed; <strong>{name}</strong> is finalized.</p>\
                 <p>The agreed configuration is available for review here: {}</p>",
                link(&config.review_link(request.token_for(role))),
            ),
        }),
    }
}

fn link(url: &str) -> String {
    format!("<a href='{url}'>{url}</a>")
}

fn both_sides(
    request: &VpnRequest,
    f: impl Fn(Role, String) -> OutboundEmail,
) -> Vec<OutboundEmail> {
    let mut emails = Vec::new();
    for role in [Role::Remote, Role::Local] {
        for addr in request.recipients(role) {
            emails.push(f(role, addr));
        }
    }
    emails
}
