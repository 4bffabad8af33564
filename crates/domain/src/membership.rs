//! Contact to mailing list relationships.

use std::str::FromStr;

use campaign_core::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ContactId, MailingListId};

/// Kind of interaction recorded against a membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionType {
    /// Contact joined the list.
    Subscribed,
    /// Contact left the list.
    Unsubscribed,
}

impl InteractionType {
    /// Returns the storage string for this interaction.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Subscribed => "subscribed",
            Self::Unsubscribed => "unsubscribed",
        }
    }
}

impl FromStr for InteractionType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "subscribed" => Ok(Self::Subscribed),
            "unsubscribed" => Ok(Self::Unsubscribed),
            _ => Err(AppError::Validation(format!(
                "unknown interaction type '{value}'"
            ))),
        }
    }
}

/// Current membership state of one contact in one mailing list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactMailingList {
    /// Member contact.
    pub contact_id: ContactId,
    /// Mailing list.
    pub mailing_list_id: MailingListId,
    /// Latest interaction.
    pub subscription_status: InteractionType,
    /// When the contact last subscribed.
    pub subscribed_at: Option<DateTime<Utc>>,
    /// When the contact last unsubscribed.
    pub unsubscribed_at: Option<DateTime<Utc>>,
    /// When the subscription was last confirmed through double opt-in.
    pub verified_at: Option<DateTime<Utc>>,
    /// Origin category of the subscription, e.g. `web`.
    pub source_type: String,
    /// Origin detail, e.g. the referring URL.
    pub source: String,
}

impl ContactMailingList {
    /// Returns whether the contact is currently subscribed.
    #[must_use]
    pub fn is_subscribed(&self) -> bool {
        self.subscription_status == InteractionType::Subscribed
    }
}
