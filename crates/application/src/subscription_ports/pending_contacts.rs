use async_trait::async_trait;
use chrono::{DateTime, Utc};

use campaign_core::AppResult;
use campaign_domain::{PendingContact, PendingContactId, PendingContactKey};

/// Repository port for pending contact persistence.
#[async_trait]
pub trait PendingContactRepository: Send + Sync {
    /// Stores a new pending contact.
    async fn insert_pending_contact(&self, pending_contact: &PendingContact) -> AppResult<()>;

    /// Finds a pending contact by the digest of its verification token.
    async fn find_by_token_hash(&self, token_hash: &str) -> AppResult<Option<PendingContact>>;

    /// Counts pending contacts for one email and list.
    async fn count_for(&self, key: &PendingContactKey) -> AppResult<u64>;

    /// Returns up to `limit` pending contacts for the key, oldest first.
    async fn oldest_for(
        &self,
        key: &PendingContactKey,
        limit: u64,
    ) -> AppResult<Vec<PendingContact>>;

    /// Deletes a pending contact. Returns `false` when it was already gone.
    async fn delete_pending_contact(&self, id: PendingContactId) -> AppResult<bool>;

    /// Returns pending contacts last updated strictly before `cutoff`.
    async fn find_updated_before(&self, cutoff: DateTime<Utc>) -> AppResult<Vec<PendingContact>>;
}
