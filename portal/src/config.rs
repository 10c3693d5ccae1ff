//! Portal configuration.
//!
//! Configuration is an explicit object passed to collaborators at
//! construction time; the workflow engine never reads ambient process state.

/// Link-building configuration shared by all notifiers.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// Public base URL of the portal (e.g. "<https://vpn.example.com>").
    ///
    /// Tokenized links are formatted as `{base_url}/forms/{token}` and
    /// `{base_url}/review/{token}`.
    pub base_url: String,
}

impl PortalConfig {
    /// Create a new portal configuration.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    /// Detail form link for a token.
    #[must_use]
    pub fn form_link(&self, token: &str) -> String {
        format!("{}/forms/{token}", self.base_url)
    }

    /// Review / agreement link for a token.
    #[must_use]
    pub fn review_link(&self, token: &str) -> String {
        format!("{}/review/{token}", self.base_url)
    }
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self::new("http://localhost:3000")
    }
}

/// SMTP delivery configuration.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    /// SMTP server address (e.g. "smtp.example.com").
    pub host: String,

    /// SMTP server port (usually 587 for STARTTLS).
    pub port: u16,

    /// SMTP authentication username.
    pub username: String,

    /// SMTP authentication password.
    pub password: String,

    /// Sender email address.
    pub from_email: String,

    /// Sender display name.
    pub from_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_stripped() {
        let config = PortalConfig::new("https://vpn.example.com/");
        assert_eq!(config.form_link("abc"), "https://vpn.example.com/forms/abc");
        assert_eq!(
            config.review_link("abc"),
            "https://vpn.example.com/review/abc"
        );
    }

    #[test]
    fn test_default_base_url() {
        let config = PortalConfig::default();
        assert_eq!(config.base_url, "http://localhost:3000");
    }
}
