use tracing::{info, warn};

use campaign_core::{AppError, AppResult};
use campaign_domain::{Contact, EmailAddress, MailingList, PendingContact};

use super::{SubscriptionService, pending_contact_not_found};

const CONFIRMED_SOURCE_TYPE: &str = "web";

/// Result of a successful confirmation.
#[derive(Debug, Clone)]
pub struct ConfirmedSubscription {
    /// Saved and verified contact.
    pub contact: Contact,
    /// Mailing list the contact is now subscribed to.
    pub mailing_list: MailingList,
    /// The consumed pending contact.
    pub pending_contact: PendingContact,
}

impl SubscriptionService {
    /// Consumes a verification token and subscribes the contact.
    ///
    /// Unknown, used, expired and evicted tokens all fail with the same
    /// `NotFound` error. A token is consumed at most once, even under
    /// concurrent confirmation. Confirmations for one email on different
    /// lists resolve to the same contact.
    pub async fn confirm(&self, raw_token: &str) -> AppResult<ConfirmedSubscription> {
        let pending_contact = self
            .pending_contacts
            .find_by_token(raw_token)
            .await?
            .ok_or_else(pending_contact_not_found)?;

        let (contact, mailing_list, pending_contact) = {
            let key = pending_contact.key();
            let _guard = self.pending_contacts.lock(&key).await;

            let pending_contact = self
                .pending_contacts
                .find_by_token(raw_token)
                .await?
                .ok_or_else(pending_contact_not_found)?;
            let mailing_list = self
                .mailing_lists
                .find_mailing_list(pending_contact.mailing_list_id())
                .await?
                .ok_or_else(pending_contact_not_found)?;

            // Taken after the pending contact lock; nothing acquires them the other way round.
            let _contact_guard = self
                .contact_locks
                .lock(pending_contact.email().as_str())
                .await;
            let mut contact = self.resolve_contact(pending_contact.email()).await?;
            contact.mark_verified(self.clock.now());
            contact.set_email(pending_contact.email().clone());
            contact.set_field_values(pending_contact.field_data());

            self.contacts.save_contact(&contact).await.map_err(|error| {
                AppError::ConfirmationFailed(format!(
                    "failed to save contact for pending contact '{}': {error}",
                    pending_contact.id()
                ))
            })?;

            if !self.pending_contacts.delete(pending_contact.id()).await? {
                return Err(pending_contact_not_found());
            }

            (contact, mailing_list, pending_contact)
        };

        self.subscribe(
            &contact,
            &mailing_list,
            Some(CONFIRMED_SOURCE_TYPE),
            Some(pending_contact.source()),
            true,
        )
        .await?;

        info!(
            contact_id = %contact.id(),
            mailing_list_id = %mailing_list.id(),
            "pending contact confirmed"
        );

        Ok(ConfirmedSubscription {
            contact,
            mailing_list,
            pending_contact,
        })
    }

    /// Returns the active contact for `email`, a restored trashed one, or a new one.
    async fn resolve_contact(&self, email: &EmailAddress) -> AppResult<Contact> {
        if let Some(contact) = self.contacts.find_by_email(email, false).await? {
            return Ok(contact);
        }

        if let Some(mut trashed) = self.contacts.find_by_email(email, true).await? {
            let restored = match self.contacts.restore_contact(&trashed).await {
                Ok(restored) => restored,
                Err(error) => {
                    warn!(
                        contact_id = %trashed.id(),
                        error = %error,
                        "failed to restore trashed contact"
                    );
                    false
                }
            };

            if restored {
                trashed.restore();
                return Ok(trashed);
            }
        }

        Ok(Contact::new(email.clone()))
    }
}
