use async_trait::async_trait;
use serde_json::Value;

use campaign_core::{AppResult, SiteId};

/// A composed email ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    /// Site whose sender identity is used.
    pub site_id: SiteId,
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub text_body: String,
    /// HTML body, when one was rendered.
    pub html_body: Option<String>,
}

/// Port for sending emails. Infrastructure provides SMTP or console implementations.
#[async_trait]
pub trait EmailService: Send + Sync {
    /// Sends one email.
    async fn send_email(&self, email: &OutgoingEmail) -> AppResult<()>;
}

/// Renders named templates into email bodies.
pub trait TemplateRenderer: Send + Sync {
    /// Renders `template` with a JSON object context.
    fn render(&self, template: &str, context: &Value) -> AppResult<String>;
}
