use std::collections::HashMap;

use async_trait::async_trait;
use campaign_application::MailingListDirectory;
use campaign_core::AppResult;
use campaign_domain::{MailingList, MailingListId};
use tokio::sync::RwLock;

/// In-memory mailing list directory implementation.
#[derive(Debug, Default)]
pub struct InMemoryMailingListDirectory {
    mailing_lists: RwLock<HashMap<MailingListId, MailingList>>,
}

impl InMemoryMailingListDirectory {
    /// Creates an empty in-memory directory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            mailing_lists: RwLock::new(HashMap::new()),
        }
    }

    /// Adds or replaces a mailing list.
    pub async fn insert_mailing_list(&self, mailing_list: MailingList) {
        self.mailing_lists
            .write()
            .await
            .insert(mailing_list.id(), mailing_list);
    }
}

#[async_trait]
impl MailingListDirectory for InMemoryMailingListDirectory {
    async fn find_mailing_list(&self, id: MailingListId) -> AppResult<Option<MailingList>> {
        Ok(self.mailing_lists.read().await.get(&id).cloned())
    }
}
