use async_trait::async_trait;
use chrono::{DateTime, Utc};

use campaign_core::AppResult;
use campaign_domain::{Contact, ContactId, EmailAddress};

/// Contact storage owned by the content store.
#[async_trait]
pub trait ContactDirectory: Send + Sync {
    /// Finds a contact by email.
    ///
    /// Trashed contacts are only returned when `include_trashed` is set.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
        include_trashed: bool,
    ) -> AppResult<Option<Contact>>;

    /// Finds an active contact by its public contact token.
    async fn find_by_cid(&self, cid: &str) -> AppResult<Option<Contact>>;

    /// Restores a trashed contact. Returns `false` when it could not be restored.
    async fn restore_contact(&self, contact: &Contact) -> AppResult<bool>;

    /// Inserts or updates a contact.
    async fn save_contact(&self, contact: &Contact) -> AppResult<()>;

    /// Updates the denormalized last activity timestamp.
    async fn update_last_activity(&self, contact_id: ContactId, at: DateTime<Utc>)
    -> AppResult<()>;
}
