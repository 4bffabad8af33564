use tracing::info;

use campaign_core::{AppError, AppResult};
use campaign_domain::{Contact, ContactId, EmailAddress, MailingListId};

use super::SubscriptionService;

const CONTACT_NOT_FOUND: &str = "contact not found";

impl SubscriptionService {
    /// Emails an unsubscribe verification link to a subscribed contact.
    ///
    /// Succeeds silently when the email is not subscribed to the list, so the
    /// response does not reveal who is subscribed.
    pub async fn request_unsubscribe(
        &self,
        email: &str,
        mailing_list_id: MailingListId,
    ) -> AppResult<()> {
        let email = EmailAddress::new(email)?;
        let mailing_list = self.require_mailing_list(mailing_list_id).await?;

        let Some(contact) = self.contacts.find_by_email(&email, false).await? else {
            return Ok(());
        };
        let subscribed = self
            .memberships
            .find_membership(contact.id(), mailing_list.id())
            .await?
            .is_some_and(|membership| membership.is_subscribed());
        if !subscribed {
            return Ok(());
        }

        self.mailer
            .send_verify_unsubscribe_email(&contact, &mailing_list)
            .await?;

        info!(
            contact_id = %contact.id(),
            mailing_list_id = %mailing_list.id(),
            "unsubscribe verification requested"
        );
        Ok(())
    }

    /// Unsubscribes the contact named by an unsubscribe verification link.
    ///
    /// `cid` and `contact_id` must both identify the same active contact.
    pub async fn verify_unsubscribe(
        &self,
        cid: &str,
        contact_id: ContactId,
        mailing_list_id: MailingListId,
    ) -> AppResult<Contact> {
        let contact = self
            .contacts
            .find_by_cid(cid)
            .await?
            .filter(|contact| contact.id() == contact_id)
            .ok_or_else(|| AppError::NotFound(CONTACT_NOT_FOUND.to_owned()))?;
        let mailing_list = self
            .mailing_lists
            .find_mailing_list(mailing_list_id)
            .await?
            .ok_or_else(|| AppError::NotFound(CONTACT_NOT_FOUND.to_owned()))?;

        self.unsubscribe(&contact, &mailing_list).await?;
        Ok(contact)
    }
}
