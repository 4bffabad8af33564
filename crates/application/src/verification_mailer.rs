//! Composes and sends subscribe/unsubscribe verification emails.

use std::sync::Arc;

use serde_json::{Value, json};
use tracing::warn;
use url::Url;

use campaign_core::{AppError, AppResult};
use campaign_domain::{Contact, MailingList, PendingContact};

use crate::subscription_ports::{EmailService, OutgoingEmail, TemplateRenderer};

const VERIFY_SUBSCRIBE_PATH: &str = "forms/verify-subscribe";
const VERIFY_UNSUBSCRIBE_PATH: &str = "forms/verify-unsubscribe";

const VERIFY_SUBSCRIBE_SUBJECT: &str = "Verify your email address";
const VERIFY_SUBSCRIBE_MESSAGE: &str = "Thank you for subscribing to the mailing list. Please verify your email address by clicking on the following link:";
const VERIFY_UNSUBSCRIBE_SUBJECT: &str = "Verify unsubscribe";
const VERIFY_UNSUBSCRIBE_MESSAGE: &str = "Please verify that you would like to unsubscribe from the mailing list by clicking on the following link:";

/// Builds verification links and sends the corresponding emails.
#[derive(Clone)]
pub struct VerificationMailer {
    email_service: Arc<dyn EmailService>,
    template_renderer: Option<Arc<dyn TemplateRenderer>>,
    base_url: Url,
}

impl VerificationMailer {
    /// Creates a mailer whose links point below `base_url`.
    pub fn new(email_service: Arc<dyn EmailService>, base_url: &str) -> AppResult<Self> {
        let normalized = if base_url.ends_with('/') {
            base_url.to_owned()
        } else {
            format!("{base_url}/")
        };
        let base_url = Url::parse(&normalized).map_err(|error| {
            AppError::Validation(format!("invalid verification base url '{base_url}': {error}"))
        })?;

        Ok(Self {
            email_service,
            template_renderer: None,
            base_url,
        })
    }

    /// Enables per-list body templates.
    #[must_use]
    pub fn with_template_renderer(mut self, template_renderer: Arc<dyn TemplateRenderer>) -> Self {
        self.template_renderer = Some(template_renderer);
        self
    }

    /// Returns the link that confirms a pending contact.
    pub fn verify_subscribe_url(&self, raw_token: &str) -> AppResult<Url> {
        let mut url = self.join(VERIFY_SUBSCRIBE_PATH)?;
        url.query_pairs_mut().append_pair("token", raw_token);
        Ok(url)
    }

    /// Returns the link that confirms an unsubscribe request.
    pub fn verify_unsubscribe_url(
        &self,
        contact: &Contact,
        mailing_list: &MailingList,
    ) -> AppResult<Url> {
        let mut url = self.join(VERIFY_UNSUBSCRIBE_PATH)?;
        url.query_pairs_mut()
            .append_pair("cid", contact.cid())
            .append_pair("uid", contact.id().to_string().as_str())
            .append_pair("mlid", mailing_list.id().to_string().as_str());
        Ok(url)
    }

    /// Sends the double opt-in email for a pending contact.
    pub async fn send_verify_subscribe_email(
        &self,
        raw_token: &str,
        pending_contact: &PendingContact,
        mailing_list: &MailingList,
    ) -> AppResult<()> {
        let url = self.verify_subscribe_url(raw_token)?;
        let settings = mailing_list.verification_emails();
        let subject = settings
            .subscribe_subject
            .clone()
            .unwrap_or_else(|| VERIFY_SUBSCRIBE_SUBJECT.to_owned());

        let context = json!({
            "message": VERIFY_SUBSCRIBE_MESSAGE,
            "url": url.as_str(),
            "mailing_list": mailing_list,
            "pending_contact": pending_contact,
        });
        let (text_body, html_body) = self.compose_body(
            settings.subscribe_template.as_deref(),
            &context,
            VERIFY_SUBSCRIBE_MESSAGE,
            &url,
        );

        self.email_service
            .send_email(&OutgoingEmail {
                site_id: mailing_list.site_id(),
                to: pending_contact.email().as_str().to_owned(),
                subject,
                text_body,
                html_body,
            })
            .await
    }

    /// Sends the email that confirms an unsubscribe request.
    pub async fn send_verify_unsubscribe_email(
        &self,
        contact: &Contact,
        mailing_list: &MailingList,
    ) -> AppResult<()> {
        let url = self.verify_unsubscribe_url(contact, mailing_list)?;
        let settings = mailing_list.verification_emails();
        let subject = settings
            .unsubscribe_subject
            .clone()
            .unwrap_or_else(|| VERIFY_UNSUBSCRIBE_SUBJECT.to_owned());

        let context = json!({
            "message": VERIFY_UNSUBSCRIBE_MESSAGE,
            "url": url.as_str(),
            "mailing_list": mailing_list,
            "contact": contact,
        });
        let (text_body, html_body) = self.compose_body(
            settings.unsubscribe_template.as_deref(),
            &context,
            VERIFY_UNSUBSCRIBE_MESSAGE,
            &url,
        );

        self.email_service
            .send_email(&OutgoingEmail {
                site_id: mailing_list.site_id(),
                to: contact.email().as_str().to_owned(),
                subject,
                text_body,
                html_body,
            })
            .await
    }

    fn join(&self, path: &str) -> AppResult<Url> {
        self.base_url.join(path).map_err(|error| {
            AppError::Internal(format!("failed to build verification url: {error}"))
        })
    }

    /// Renders the list template when configured, falling back to plain text.
    fn compose_body(
        &self,
        template: Option<&str>,
        context: &Value,
        message: &str,
        url: &Url,
    ) -> (String, Option<String>) {
        let fallback = format!("{message}\n{url}");

        let (Some(template), Some(renderer)) = (template, self.template_renderer.as_ref()) else {
            return (fallback, None);
        };

        match renderer.render(template, context) {
            Ok(rendered) => (rendered.clone(), Some(rendered)),
            Err(error) => {
                warn!(
                    template = template,
                    error = %error,
                    "failed to render verification email template, using plain text"
                );
                (fallback, None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use serde_json::Value;
    use tokio::sync::Mutex;

    use campaign_core::{AppError, AppResult, SiteId};
    use campaign_domain::{
        Contact, EmailAddress, MailingList, MailingListId, NewPendingContact, PendingContact,
        VerificationEmailSettings,
    };

    use super::VerificationMailer;
    use crate::subscription_ports::{EmailService, OutgoingEmail, TemplateRenderer};

    #[derive(Default)]
    struct RecordingEmailService {
        sent: Mutex<Vec<OutgoingEmail>>,
    }

    #[async_trait]
    impl EmailService for RecordingEmailService {
        async fn send_email(&self, email: &OutgoingEmail) -> AppResult<()> {
            self.sent.lock().await.push(email.clone());
            Ok(())
        }
    }

    struct FixedRenderer {
        fail: bool,
    }

    impl TemplateRenderer for FixedRenderer {
        fn render(&self, template: &str, context: &Value) -> AppResult<String> {
            if self.fail {
                return Err(AppError::Internal(format!("template '{template}' missing")));
            }

            Ok(format!(
                "<a href=\"{}\">{}</a>",
                context["url"].as_str().unwrap_or_default(),
                context["mailing_list"]["title"].as_str().unwrap_or_default()
            ))
        }
    }

    fn mailing_list(settings: VerificationEmailSettings) -> MailingList {
        MailingList::new(MailingListId::new(), SiteId::new(), "Weekly", settings)
            .unwrap_or_else(|_| panic!("test"))
    }

    fn pending_contact(mailing_list: &MailingList) -> PendingContact {
        PendingContact::create(
            NewPendingContact {
                token_hash: "digest".to_owned(),
                email: EmailAddress::new("a@x.com").unwrap_or_else(|_| panic!("test")),
                mailing_list_id: mailing_list.id(),
                source: String::new(),
                field_data: serde_json::Map::new(),
            },
            chrono::Utc::now(),
        )
    }

    #[test]
    fn subscribe_url_carries_token_under_base_path() {
        let mailer = VerificationMailer::new(
            Arc::new(RecordingEmailService::default()),
            "https://news.example.com/campaign",
        )
        .unwrap_or_else(|_| panic!("test"));

        let url = mailer
            .verify_subscribe_url("abc123")
            .unwrap_or_else(|_| panic!("test"));
        assert_eq!(
            url.as_str(),
            "https://news.example.com/campaign/forms/verify-subscribe?token=abc123"
        );
    }

    #[test]
    fn unsubscribe_url_carries_contact_and_list() {
        let mailer =
            VerificationMailer::new(Arc::new(RecordingEmailService::default()), "http://localhost:3001")
                .unwrap_or_else(|_| panic!("test"));
        let list = mailing_list(VerificationEmailSettings::default());
        let contact =
            Contact::new(EmailAddress::new("a@x.com").unwrap_or_else(|_| panic!("test")));

        let url = mailer
            .verify_unsubscribe_url(&contact, &list)
            .unwrap_or_else(|_| panic!("test"));
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("cid".to_owned(), contact.cid().to_owned()),
                ("uid".to_owned(), contact.id().to_string()),
                ("mlid".to_owned(), list.id().to_string()),
            ]
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let result = VerificationMailer::new(Arc::new(RecordingEmailService::default()), "not a url");
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn default_subscribe_email_uses_plain_text() {
        let email_service = Arc::new(RecordingEmailService::default());
        let mailer = VerificationMailer::new(email_service.clone(), "http://localhost:3001")
            .unwrap_or_else(|_| panic!("test"));
        let list = mailing_list(VerificationEmailSettings::default());
        let pending = pending_contact(&list);

        let result = mailer.send_verify_subscribe_email("tok", &pending, &list).await;
        assert!(result.is_ok());

        let sent = email_service.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "a@x.com");
        assert_eq!(sent[0].subject, "Verify your email address");
        assert_eq!(sent[0].site_id, list.site_id());
        assert!(sent[0].text_body.starts_with("Thank you for subscribing"));
        assert!(
            sent[0]
                .text_body
                .ends_with("\nhttp://localhost:3001/forms/verify-subscribe?token=tok")
        );
        assert_eq!(sent[0].html_body, None);
    }

    #[tokio::test]
    async fn list_template_and_subject_override_defaults() {
        let email_service = Arc::new(RecordingEmailService::default());
        let mailer = VerificationMailer::new(email_service.clone(), "http://localhost:3001")
            .unwrap_or_else(|_| panic!("test"))
            .with_template_renderer(Arc::new(FixedRenderer { fail: false }));
        let list = mailing_list(VerificationEmailSettings {
            subscribe_subject: Some("Confirm Weekly".to_owned()),
            subscribe_template: Some("verify.html".to_owned()),
            ..VerificationEmailSettings::default()
        });
        let pending = pending_contact(&list);

        let result = mailer.send_verify_subscribe_email("tok", &pending, &list).await;
        assert!(result.is_ok());

        let sent = email_service.sent.lock().await;
        assert_eq!(sent[0].subject, "Confirm Weekly");
        assert_eq!(
            sent[0].html_body.as_deref(),
            Some("<a href=\"http://localhost:3001/forms/verify-subscribe?token=tok\">Weekly</a>")
        );
    }

    #[tokio::test]
    async fn render_failure_falls_back_to_plain_text() {
        let email_service = Arc::new(RecordingEmailService::default());
        let mailer = VerificationMailer::new(email_service.clone(), "http://localhost:3001")
            .unwrap_or_else(|_| panic!("test"))
            .with_template_renderer(Arc::new(FixedRenderer { fail: true }));
        let list = mailing_list(VerificationEmailSettings {
            unsubscribe_template: Some("missing.html".to_owned()),
            ..VerificationEmailSettings::default()
        });
        let contact =
            Contact::new(EmailAddress::new("a@x.com").unwrap_or_else(|_| panic!("test")));

        let result = mailer.send_verify_unsubscribe_email(&contact, &list).await;
        assert!(result.is_ok());

        let sent = email_service.sent.lock().await;
        assert_eq!(sent[0].subject, "Verify unsubscribe");
        assert!(sent[0].text_body.starts_with("Please verify that you would like"));
        assert!(sent[0].text_body.contains("/forms/verify-unsubscribe?cid="));
        assert_eq!(sent[0].html_body, None);
    }
}
