//! Mailing lists and their verification email settings.

use campaign_core::{AppError, AppResult, SiteId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a mailing list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MailingListId(Uuid);

impl MailingListId {
    /// Creates a new random mailing list identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a mailing list identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for MailingListId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MailingListId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Per-list overrides for verification emails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationEmailSettings {
    /// Subject of the subscribe verification email.
    pub subscribe_subject: Option<String>,
    /// Template rendered as the subscribe verification email body.
    pub subscribe_template: Option<String>,
    /// Subject of the unsubscribe verification email.
    pub unsubscribe_subject: Option<String>,
    /// Template rendered as the unsubscribe verification email body.
    pub unsubscribe_template: Option<String>,
}

/// A list contacts subscribe to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MailingList {
    id: MailingListId,
    site_id: SiteId,
    title: String,
    verification_emails: VerificationEmailSettings,
}

impl MailingList {
    /// Creates a validated mailing list.
    pub fn new(
        id: MailingListId,
        site_id: SiteId,
        title: impl Into<String>,
        verification_emails: VerificationEmailSettings,
    ) -> AppResult<Self> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(AppError::Validation(
                "mailing list title must not be empty".to_owned(),
            ));
        }

        Ok(Self {
            id,
            site_id,
            title,
            verification_emails: VerificationEmailSettings {
                subscribe_subject: non_blank(verification_emails.subscribe_subject),
                subscribe_template: non_blank(verification_emails.subscribe_template),
                unsubscribe_subject: non_blank(verification_emails.unsubscribe_subject),
                unsubscribe_template: non_blank(verification_emails.unsubscribe_template),
            },
        })
    }

    /// Returns the mailing list identifier.
    #[must_use]
    pub fn id(&self) -> MailingListId {
        self.id
    }

    /// Returns the owning site.
    #[must_use]
    pub fn site_id(&self) -> SiteId {
        self.site_id
    }

    /// Returns the display title.
    #[must_use]
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    /// Returns the verification email overrides.
    #[must_use]
    pub fn verification_emails(&self) -> &VerificationEmailSettings {
        &self.verification_emails
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}
