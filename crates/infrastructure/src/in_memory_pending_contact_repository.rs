use std::collections::HashMap;

use async_trait::async_trait;
use campaign_application::PendingContactRepository;
use campaign_core::{AppError, AppResult};
use campaign_domain::{PendingContact, PendingContactId, PendingContactKey};
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

/// In-memory pending contact repository implementation.
#[derive(Debug, Default)]
pub struct InMemoryPendingContactRepository {
    pending_contacts: RwLock<HashMap<PendingContactId, PendingContact>>,
}

impl InMemoryPendingContactRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pending_contacts: RwLock::new(HashMap::new()),
        }
    }

    fn matching(
        pending_contacts: &HashMap<PendingContactId, PendingContact>,
        key: &PendingContactKey,
    ) -> Vec<PendingContact> {
        pending_contacts
            .values()
            .filter(|pending_contact| {
                pending_contact.email() == &key.email
                    && pending_contact.mailing_list_id() == key.mailing_list_id
            })
            .cloned()
            .collect()
    }
}

#[async_trait]
impl PendingContactRepository for InMemoryPendingContactRepository {
    async fn insert_pending_contact(&self, pending_contact: &PendingContact) -> AppResult<()> {
        let mut pending_contacts = self.pending_contacts.write().await;

        if pending_contacts
            .values()
            .any(|stored| stored.token_hash() == pending_contact.token_hash())
        {
            return Err(AppError::Conflict(
                "pending contact token already exists".to_owned(),
            ));
        }

        pending_contacts.insert(pending_contact.id(), pending_contact.clone());
        Ok(())
    }

    async fn find_by_token_hash(&self, token_hash: &str) -> AppResult<Option<PendingContact>> {
        Ok(self
            .pending_contacts
            .read()
            .await
            .values()
            .find(|pending_contact| pending_contact.token_hash() == token_hash)
            .cloned())
    }

    async fn count_for(&self, key: &PendingContactKey) -> AppResult<u64> {
        let pending_contacts = self.pending_contacts.read().await;
        Ok(Self::matching(&pending_contacts, key).len() as u64)
    }

    async fn oldest_for(
        &self,
        key: &PendingContactKey,
        limit: u64,
    ) -> AppResult<Vec<PendingContact>> {
        let pending_contacts = self.pending_contacts.read().await;
        let mut values = Self::matching(&pending_contacts, key);
        values.sort_by(|left, right| {
            left.created_at()
                .cmp(&right.created_at())
                .then_with(|| left.id().as_uuid().cmp(&right.id().as_uuid()))
        });
        values.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(values)
    }

    async fn delete_pending_contact(&self, id: PendingContactId) -> AppResult<bool> {
        Ok(self.pending_contacts.write().await.remove(&id).is_some())
    }

    async fn find_updated_before(&self, cutoff: DateTime<Utc>) -> AppResult<Vec<PendingContact>> {
        Ok(self
            .pending_contacts
            .read()
            .await
            .values()
            .filter(|pending_contact| pending_contact.updated_at() < cutoff)
            .cloned()
            .collect())
    }
}
