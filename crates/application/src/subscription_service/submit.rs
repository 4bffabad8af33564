use serde_json::{Map, Value};
use tracing::{info, warn};

use campaign_core::AppResult;
use campaign_domain::{EmailAddress, MailingListId, PendingContact};

use super::SubscriptionService;
use crate::pending_contact_service::PendingContactRequest;

/// Input for a subscription form submission.
#[derive(Debug, Clone)]
pub struct SubmitSubscription {
    /// Raw email as typed by the subscriber.
    pub email: String,
    /// Target mailing list.
    pub mailing_list_id: MailingListId,
    /// Submission origin, e.g. the referring page.
    pub source: String,
    /// Extra form fields copied onto the contact on confirmation.
    pub field_data: Map<String, Value>,
}

/// Result of a submission.
#[derive(Debug, Clone)]
pub struct SubmittedSubscription {
    /// Raw verification token, also embedded in the emailed link.
    pub token: String,
    /// Stored pending contact.
    pub pending_contact: PendingContact,
    /// Whether the verification email was handed to the email service.
    pub email_sent: bool,
}

impl SubscriptionService {
    /// Stores a pending contact and emails its verification link.
    ///
    /// A failed email does not undo the stored pending contact; it is
    /// reported through `email_sent`.
    pub async fn submit(&self, request: SubmitSubscription) -> AppResult<SubmittedSubscription> {
        let email = EmailAddress::new(request.email)?;
        let mailing_list = self.require_mailing_list(request.mailing_list_id).await?;

        let issued = self
            .pending_contacts
            .save_pending_contact(PendingContactRequest {
                email,
                mailing_list_id: mailing_list.id(),
                source: request.source,
                field_data: request.field_data,
            })
            .await?;

        let email_sent = match self
            .mailer
            .send_verify_subscribe_email(&issued.token, &issued.pending_contact, &mailing_list)
            .await
        {
            Ok(()) => true,
            Err(error) => {
                warn!(
                    pending_contact_id = %issued.pending_contact.id(),
                    mailing_list_id = %mailing_list.id(),
                    error = %error,
                    "failed to send verify subscribe email"
                );
                false
            }
        };

        info!(
            pending_contact_id = %issued.pending_contact.id(),
            mailing_list_id = %mailing_list.id(),
            email_sent,
            "pending contact submitted"
        );

        Ok(SubmittedSubscription {
            token: issued.token,
            pending_contact: issued.pending_contact,
            email_sent,
        })
    }
}
