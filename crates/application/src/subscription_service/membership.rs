use tracing::{info, warn};

use campaign_core::{AppError, AppResult};
use campaign_domain::{Contact, InteractionType, MailingList};

use super::SubscriptionService;
use crate::subscription_hooks::{SubscribeContactEvent, UnsubscribeContactEvent, UpdateContactEvent};
use crate::subscription_ports::MembershipInteraction;

impl SubscriptionService {
    /// Subscribes a contact to a list, firing the subscribe hooks around it.
    ///
    /// Missing `source_type` and `source` are stored as empty strings.
    pub async fn subscribe(
        &self,
        contact: &Contact,
        mailing_list: &MailingList,
        source_type: Option<&str>,
        source: Option<&str>,
        verify: bool,
    ) -> AppResult<()> {
        let event = SubscribeContactEvent {
            contact: contact.clone(),
            mailing_list: mailing_list.clone(),
            source_type: source_type.unwrap_or_default().to_owned(),
            source: source.unwrap_or_default().to_owned(),
        };
        self.hooks.before_subscribe(&event)?;

        let now = self.clock.now();
        self.memberships
            .record_interaction(MembershipInteraction {
                contact_id: contact.id(),
                mailing_list_id: mailing_list.id(),
                interaction: InteractionType::Subscribed,
                source_type: event.source_type.clone(),
                source: event.source.clone(),
                verified: verify,
                occurred_at: now,
            })
            .await
            .map_err(|error| {
                AppError::SubscriptionFailed(format!(
                    "failed to subscribe contact '{}' to mailing list '{}': {error}",
                    contact.id(),
                    mailing_list.id()
                ))
            })?;

        self.contacts
            .update_last_activity(contact.id(), now)
            .await
            .map_err(|error| {
                AppError::SubscriptionFailed(format!(
                    "failed to update last activity of contact '{}': {error}",
                    contact.id()
                ))
            })?;

        self.hooks.after_subscribe(&event)?;

        info!(
            contact_id = %contact.id(),
            mailing_list_id = %mailing_list.id(),
            verified = verify,
            "contact subscribed"
        );
        Ok(())
    }

    /// Unsubscribes a contact from a list, firing the unsubscribe hooks around it.
    pub async fn unsubscribe(&self, contact: &Contact, mailing_list: &MailingList) -> AppResult<()> {
        let event = UnsubscribeContactEvent {
            contact: contact.clone(),
            mailing_list: mailing_list.clone(),
        };
        self.hooks.before_unsubscribe(&event)?;

        let now = self.clock.now();
        self.memberships
            .record_interaction(MembershipInteraction {
                contact_id: contact.id(),
                mailing_list_id: mailing_list.id(),
                interaction: InteractionType::Unsubscribed,
                source_type: String::new(),
                source: String::new(),
                verified: false,
                occurred_at: now,
            })
            .await
            .map_err(|error| {
                AppError::SubscriptionFailed(format!(
                    "failed to unsubscribe contact '{}' from mailing list '{}': {error}",
                    contact.id(),
                    mailing_list.id()
                ))
            })?;

        self.hooks.after_unsubscribe(&event)?;
        self.contacts
            .update_last_activity(contact.id(), now)
            .await
            .map_err(|error| {
                AppError::SubscriptionFailed(format!(
                    "failed to update last activity of contact '{}': {error}",
                    contact.id()
                ))
            })?;

        info!(
            contact_id = %contact.id(),
            mailing_list_id = %mailing_list.id(),
            "contact unsubscribed"
        );
        Ok(())
    }

    /// Saves a contact, firing the update hooks around it.
    ///
    /// Returns `false` when the contact could not be saved. Hook errors are
    /// returned as errors.
    pub async fn update_contact(&self, contact: &Contact) -> AppResult<bool> {
        let event = UpdateContactEvent {
            contact: contact.clone(),
        };
        self.hooks.before_update(&event)?;

        if let Err(error) = self.contacts.save_contact(contact).await {
            warn!(
                contact_id = %contact.id(),
                error = %error,
                "failed to save contact"
            );
            return Ok(false);
        }

        self.contacts
            .update_last_activity(contact.id(), self.clock.now())
            .await?;
        self.hooks.after_update(&event)?;

        Ok(true)
    }
}
