//! Pending contact storage with capacity enforcement and expiry purging.

mod capacity;
mod purge;

use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::MutexGuard;

use campaign_core::AppResult;
use campaign_domain::{
    EmailAddress, MailingListId, NewPendingContact, PendingContact, PendingContactId,
    PendingContactKey,
};

use crate::keyed_locks::KeyedLocks;
use crate::subscription_policy::SubscriptionPolicy;
use crate::subscription_ports::{Clock, PendingContactRepository};
use crate::token_crypto::{generate_token, hash_token};

pub use purge::PurgeReport;

/// A subscription request to hold until the email is verified.
#[derive(Debug, Clone)]
pub struct PendingContactRequest {
    /// Subscriber email.
    pub email: EmailAddress,
    /// Target mailing list.
    pub mailing_list_id: MailingListId,
    /// Submission origin.
    pub source: String,
    /// Submitted form fields.
    pub field_data: Map<String, Value>,
}

/// A stored pending contact together with its raw verification token.
///
/// The raw token is only available here; storage keeps its digest.
#[derive(Debug, Clone)]
pub struct IssuedPendingContact {
    /// Raw verification token to embed in the verification link.
    pub token: String,
    /// Stored pending contact.
    pub pending_contact: PendingContact,
}

/// Application service owning pending contact rows.
#[derive(Clone)]
pub struct PendingContactService {
    repository: Arc<dyn PendingContactRepository>,
    clock: Arc<dyn Clock>,
    locks: Arc<KeyedLocks>,
    policy: SubscriptionPolicy,
}

impl PendingContactService {
    /// Creates a new pending contact service.
    #[must_use]
    pub fn new(
        repository: Arc<dyn PendingContactRepository>,
        clock: Arc<dyn Clock>,
        policy: SubscriptionPolicy,
    ) -> Self {
        Self {
            repository,
            clock,
            locks: Arc::new(KeyedLocks::default()),
            policy,
        }
    }

    /// Returns the active policy.
    #[must_use]
    pub fn policy(&self) -> SubscriptionPolicy {
        self.policy
    }

    /// Purges expired requests, then stores a new one within the key's capacity.
    ///
    /// Eviction and insert run under the key lock so concurrent submissions
    /// for the same email and list cannot overshoot the cap.
    pub async fn save_pending_contact(
        &self,
        request: PendingContactRequest,
    ) -> AppResult<IssuedPendingContact> {
        self.purge_expired_pending_contacts().await?;

        let key = PendingContactKey::new(request.email.clone(), request.mailing_list_id);
        let (token, token_hash) = generate_token()?;

        let _guard = self.lock(&key).await;
        self.enforce_capacity(&key).await?;

        let pending_contact = PendingContact::create(
            NewPendingContact {
                token_hash,
                email: request.email,
                mailing_list_id: request.mailing_list_id,
                source: request.source,
                field_data: request.field_data,
            },
            self.clock.now(),
        );
        self.repository
            .insert_pending_contact(&pending_contact)
            .await?;

        Ok(IssuedPendingContact {
            token,
            pending_contact,
        })
    }

    /// Finds a pending contact by its raw verification token.
    pub async fn find_by_token(&self, raw_token: &str) -> AppResult<Option<PendingContact>> {
        if raw_token.trim().is_empty() {
            return Ok(None);
        }

        self.repository
            .find_by_token_hash(&hash_token(raw_token))
            .await
    }

    /// Deletes a pending contact. Returns `false` when it was already gone.
    pub async fn delete(&self, id: PendingContactId) -> AppResult<bool> {
        self.repository.delete_pending_contact(id).await
    }

    /// Waits for exclusive access to one email and list.
    pub(crate) async fn lock(&self, key: &PendingContactKey) -> MutexGuard<'_, ()> {
        self.locks.lock(&key.lock_key()).await
    }
}
