//! SMTP email service using the `lettre` crate.

use std::collections::HashMap;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use campaign_application::{EmailService, OutgoingEmail};
use campaign_core::{AppError, AppResult, SiteId};

/// SMTP email service configuration.
#[derive(Clone)]
pub struct SmtpEmailConfig {
    /// SMTP server hostname.
    pub host: String,
    /// SMTP server port.
    pub port: u16,
    /// SMTP username.
    pub username: String,
    /// SMTP password.
    pub password: String,
    /// Sender used when a site has no sender of its own.
    pub from_address: String,
    /// Optional reply-to address added to every email.
    pub reply_to: Option<String>,
    /// Per-site sender addresses.
    pub site_senders: HashMap<SiteId, String>,
}

impl SmtpEmailConfig {
    /// Returns the sender address for a site.
    #[must_use]
    pub fn sender_for(&self, site_id: SiteId) -> &str {
        self.site_senders
            .get(&site_id)
            .map_or(self.from_address.as_str(), String::as_str)
    }
}

/// Production email service using SMTP.
#[derive(Clone)]
pub struct SmtpEmailService {
    config: SmtpEmailConfig,
}

impl SmtpEmailService {
    /// Creates a new SMTP email service.
    #[must_use]
    pub fn new(config: SmtpEmailConfig) -> Self {
        Self { config }
    }

    fn build_message(&self, email: &OutgoingEmail) -> AppResult<Message> {
        let from: Mailbox = self
            .config
            .sender_for(email.site_id)
            .parse()
            .map_err(|error| AppError::Internal(format!("invalid from address: {error}")))?;

        let to_mailbox: Mailbox = email
            .to
            .parse()
            .map_err(|error| AppError::Internal(format!("invalid recipient address: {error}")))?;

        let mut builder = Message::builder()
            .from(from)
            .to(to_mailbox)
            .subject(email.subject.as_str());

        if let Some(reply_to) = &self.config.reply_to {
            let reply_to: Mailbox = reply_to.parse().map_err(|error| {
                AppError::Internal(format!("invalid reply-to address: {error}"))
            })?;
            builder = builder.reply_to(reply_to);
        }

        let message = match &email.html_body {
            Some(html_body) => builder.multipart(MultiPart::alternative_plain_html(
                email.text_body.clone(),
                html_body.clone(),
            )),
            None => builder
                .header(ContentType::TEXT_PLAIN)
                .body(email.text_body.clone()),
        };

        message.map_err(|error| AppError::Internal(format!("failed to build email: {error}")))
    }
}

#[async_trait]
impl EmailService for SmtpEmailService {
    async fn send_email(&self, email: &OutgoingEmail) -> AppResult<()> {
        let message = self.build_message(email)?;

        let credentials =
            Credentials::new(self.config.username.clone(), self.config.password.clone());

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&self.config.host)
            .map_err(|error| {
                AppError::Internal(format!("failed to create SMTP transport: {error}"))
            })?
            .port(self.config.port)
            .credentials(credentials)
            .build();

        mailer
            .send(message)
            .await
            .map_err(|error| AppError::Internal(format!("failed to send email: {error}")))?;

        Ok(())
    }
}
