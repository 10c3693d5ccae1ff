//! Console notifier for development and testing.

use crate::config::PortalConfig;
use crate::error::Result;
use crate::providers::{build_emails, NotificationEvent, Notifier};
use crate::state::VpnRequest;
use tracing::info;

/// Console notifier.
///
/// Prints each email to the console instead of sending it. This is the
/// default when no SMTP server is configured, so tokenized links are still
/// reachable during local development.
#[derive(Debug, Clone)]
pub struct ConsoleNotifier {
    config: PortalConfig,
}

impl ConsoleNotifier {
    /// Create a new console notifier.
    #[must_use]
    pub const fn new(config: PortalConfig) -> Self {
        Self { config }
    }
}

impl Notifier for ConsoleNotifier {
    async fn notify(&self, event: NotificationEvent, request: &VpnRequest) -> Result<()> {
        let emails = build_emails(event, request, &self.config);

        info!(
            request_id = %request.id,
            event = %event,
            count = emails.len(),
            "📧 notification (console fallback, no SMTP configured)"
        );

        for email in emails {
            println!("\n--- EMAIL (console fallback) ---");
            println!("To: {}", email.to);
            println!("Subject: {}", email.subject);
            println!("Body:\n{}", email.html_body);
            println!("--- end email ---\n");
        }

        Ok(())
    }
}
