//! SMTP notifier implementation using Lettre.

use crate::config::{PortalConfig, SmtpConfig};
use crate::error::{PortalError, Result};
use crate::providers::{build_emails, NotificationEvent, Notifier, OutboundEmail};
use crate::state::VpnRequest;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

/// SMTP notifier using Lettre.
///
/// Sends real emails via SMTP, suitable for production use. One message per
/// recipient; the comma-separated local team field fans out.
#[derive(Clone)]
pub struct SmtpNotifier {
    config: PortalConfig,
    smtp: SmtpConfig,
    credentials: Credentials,
}

impl SmtpNotifier {
    /// Create a new SMTP notifier.
    #[must_use]
    pub fn new(config: PortalConfig, smtp: SmtpConfig) -> Self {
        let credentials = Credentials::new(smtp.username.clone(), smtp.password.clone());
        Self {
            config,
            smtp,
            credentials,
        }
    }

    /// Build SMTP transport.
    ///
    /// A new transport per delivery avoids connection pooling issues.
    fn build_transport(&self) -> Result<SmtpTransport> {
        Ok(SmtpTransport::relay(&self.smtp.host)
            .map_err(|e| PortalError::Notification(format!("SMTP relay error: {e}")))?
            .port(self.smtp.port)
            .credentials(self.credentials.clone())
            .build())
    }

    /// Build the "From" header.
    fn from_header(&self) -> String {
        format!("{} <{}>", self.smtp.from_name, self.smtp.from_email)
    }

    async fn send(&self, email: OutboundEmail) -> Result<()> {
        let message = Message::builder()
            .from(
                self.from_header()
                    .parse()
                    .map_err(|e| PortalError::Notification(format!("Invalid from address: {e}")))?,
            )
            .to(email
                .to
                .parse()
                .map_err(|e| PortalError::Notification(format!("Invalid to address: {e}")))?)
            .subject(email.subject)
            .header(ContentType::TEXT_HTML)
            .body(email.html_body)
            .map_err(|e| PortalError::Notification(format!("Failed to build email: {e}")))?;

        let mailer = self.build_transport()?;

        tokio::task::spawn_blocking(move || {
            mailer
                .send(&message)
                .map_err(|e| PortalError::Notification(format!("Failed to send email: {e}")))
        })
        .await
        .map_err(|e| PortalError::Notification(format!("Email task failed: {e}")))?
        .map(|_| ())
    }
}

impl Notifier for SmtpNotifier {
    async fn notify(&self, event: NotificationEvent, request: &VpnRequest) -> Result<()> {
        for email in build_emails(event, request, &self.config) {
            self.send(email).await?;
        }
        Ok(())
    }
}
