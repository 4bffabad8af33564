use async_trait::async_trait;
use chrono::{DateTime, Utc};

use campaign_core::AppResult;
use campaign_domain::{ContactId, ContactMailingList, InteractionType, MailingListId};

/// One subscribe or unsubscribe interaction to upsert into the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipInteraction {
    /// Member contact.
    pub contact_id: ContactId,
    /// Mailing list.
    pub mailing_list_id: MailingListId,
    /// New subscription status.
    pub interaction: InteractionType,
    /// Origin category, e.g. `web`.
    pub source_type: String,
    /// Origin detail.
    pub source: String,
    /// Whether the interaction came through double opt-in.
    pub verified: bool,
    /// Interaction time.
    pub occurred_at: DateTime<Utc>,
}

impl MembershipInteraction {
    /// Applies this interaction on top of the current membership, if any.
    ///
    /// Subscribing replaces the source and stamps `verified_at` when verified.
    /// Unsubscribing keeps the original source.
    #[must_use]
    pub fn apply(&self, current: Option<ContactMailingList>) -> ContactMailingList {
        let mut membership = current.unwrap_or_else(|| ContactMailingList {
            contact_id: self.contact_id,
            mailing_list_id: self.mailing_list_id,
            subscription_status: self.interaction,
            subscribed_at: None,
            unsubscribed_at: None,
            verified_at: None,
            source_type: String::new(),
            source: String::new(),
        });

        membership.subscription_status = self.interaction;
        match self.interaction {
            InteractionType::Subscribed => {
                membership.subscribed_at = Some(self.occurred_at);
                membership.source_type = self.source_type.clone();
                membership.source = self.source.clone();
                if self.verified {
                    membership.verified_at = Some(self.occurred_at);
                }
            }
            InteractionType::Unsubscribed => {
                membership.unsubscribed_at = Some(self.occurred_at);
            }
        }

        membership
    }
}

/// Contact to mailing list relationship storage.
#[async_trait]
pub trait MembershipLedger: Send + Sync {
    /// Upserts the membership for the interaction's contact and list.
    ///
    /// Fails when the contact or the mailing list does not exist.
    async fn record_interaction(&self, interaction: MembershipInteraction) -> AppResult<()>;

    /// Returns the current membership of a contact in a list.
    async fn find_membership(
        &self,
        contact_id: ContactId,
        mailing_list_id: MailingListId,
    ) -> AppResult<Option<ContactMailingList>>;
}
