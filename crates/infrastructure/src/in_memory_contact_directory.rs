use std::collections::HashMap;

use async_trait::async_trait;
use campaign_application::ContactDirectory;
use campaign_core::{AppError, AppResult};
use campaign_domain::{Contact, ContactId, EmailAddress};
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

/// In-memory contact directory implementation.
#[derive(Debug, Default)]
pub struct InMemoryContactDirectory {
    contacts: RwLock<HashMap<ContactId, Contact>>,
}

impl InMemoryContactDirectory {
    /// Creates an empty in-memory directory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            contacts: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl ContactDirectory for InMemoryContactDirectory {
    async fn find_by_email(
        &self,
        email: &EmailAddress,
        include_trashed: bool,
    ) -> AppResult<Option<Contact>> {
        Ok(self
            .contacts
            .read()
            .await
            .values()
            .find(|contact| {
                contact.email() == email && (include_trashed || !contact.is_trashed())
            })
            .cloned())
    }

    async fn find_by_cid(&self, cid: &str) -> AppResult<Option<Contact>> {
        Ok(self
            .contacts
            .read()
            .await
            .values()
            .find(|contact| contact.cid() == cid && !contact.is_trashed())
            .cloned())
    }

    async fn restore_contact(&self, contact: &Contact) -> AppResult<bool> {
        let mut contacts = self.contacts.write().await;
        let Some(stored) = contacts.get_mut(&contact.id()) else {
            return Ok(false);
        };

        stored.restore();
        Ok(true)
    }

    async fn save_contact(&self, contact: &Contact) -> AppResult<()> {
        let mut contacts = self.contacts.write().await;

        if contacts
            .values()
            .any(|stored| stored.id() != contact.id() && stored.email() == contact.email())
        {
            return Err(AppError::Conflict(format!(
                "contact with email '{}' already exists",
                contact.email()
            )));
        }

        contacts.insert(contact.id(), contact.clone());
        Ok(())
    }

    async fn update_last_activity(
        &self,
        contact_id: ContactId,
        at: DateTime<Utc>,
    ) -> AppResult<()> {
        if let Some(contact) = self.contacts.write().await.get_mut(&contact_id) {
            contact.touch_activity(at);
        }

        Ok(())
    }
}
