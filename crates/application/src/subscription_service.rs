//! Double opt-in subscription workflow.
//!
//! A submission becomes a pending contact and a verification email. Following
//! the emailed link confirms it into a contact and a list membership. Pending
//! contacts that are never confirmed expire or get evicted.

mod confirm;
mod membership;
mod submit;
mod unsubscribe_verification;

use std::sync::Arc;

use campaign_core::{AppError, AppResult};
use campaign_domain::{MailingList, MailingListId};

use crate::keyed_locks::KeyedLocks;
use crate::pending_contact_service::PendingContactService;
use crate::subscription_hooks::SubscriptionHooks;
use crate::subscription_ports::{Clock, ContactDirectory, MailingListDirectory, MembershipLedger};
use crate::verification_mailer::VerificationMailer;

pub use confirm::ConfirmedSubscription;
pub use submit::{SubmitSubscription, SubmittedSubscription};

const PENDING_CONTACT_NOT_FOUND: &str = "pending contact not found";

/// Application service coordinating pending contacts, contacts and memberships.
#[derive(Clone)]
pub struct SubscriptionService {
    pending_contacts: PendingContactService,
    contacts: Arc<dyn ContactDirectory>,
    mailing_lists: Arc<dyn MailingListDirectory>,
    memberships: Arc<dyn MembershipLedger>,
    mailer: VerificationMailer,
    hooks: Arc<SubscriptionHooks>,
    clock: Arc<dyn Clock>,
    /// Serializes contact resolution per email across mailing lists.
    contact_locks: Arc<KeyedLocks>,
}

impl SubscriptionService {
    /// Creates a subscription service without hooks.
    #[must_use]
    pub fn new(
        pending_contacts: PendingContactService,
        contacts: Arc<dyn ContactDirectory>,
        mailing_lists: Arc<dyn MailingListDirectory>,
        memberships: Arc<dyn MembershipLedger>,
        mailer: VerificationMailer,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            pending_contacts,
            contacts,
            mailing_lists,
            memberships,
            mailer,
            hooks: Arc::new(SubscriptionHooks::default()),
            clock,
            contact_locks: Arc::new(KeyedLocks::default()),
        }
    }

    /// Replaces the registered hooks.
    #[must_use]
    pub fn with_hooks(mut self, hooks: SubscriptionHooks) -> Self {
        self.hooks = Arc::new(hooks);
        self
    }

    /// Returns the pending contact service used by this workflow.
    #[must_use]
    pub fn pending_contacts(&self) -> &PendingContactService {
        &self.pending_contacts
    }

    async fn require_mailing_list(&self, id: MailingListId) -> AppResult<MailingList> {
        self.mailing_lists
            .find_mailing_list(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("mailing list '{id}' not found")))
    }
}

fn pending_contact_not_found() -> AppError {
    AppError::NotFound(PENDING_CONTACT_NOT_FOUND.to_owned())
}
