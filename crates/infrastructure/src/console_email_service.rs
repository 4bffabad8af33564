//! Console email service for development. Logs emails to tracing output.

use async_trait::async_trait;
use campaign_application::{EmailService, OutgoingEmail};
use campaign_core::AppResult;
use tracing::info;

/// Development email service that logs emails to the console.
#[derive(Clone)]
pub struct ConsoleEmailService;

impl ConsoleEmailService {
    /// Creates a new console email service.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleEmailService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmailService for ConsoleEmailService {
    async fn send_email(&self, email: &OutgoingEmail) -> AppResult<()> {
        info!(
            site_id = %email.site_id,
            to = %email.to,
            subject = %email.subject,
            has_html = email.html_body.is_some(),
            "--- EMAIL (console) ---\nTo: {}\nSubject: {}\n\n{}\n--- END EMAIL ---",
            email.to,
            email.subject,
            email.text_body
        );

        Ok(())
    }
}
