use std::collections::HashMap;

use async_trait::async_trait;
use campaign_application::{MembershipInteraction, MembershipLedger};
use campaign_core::AppResult;
use campaign_domain::{ContactId, ContactMailingList, MailingListId};
use tokio::sync::RwLock;

/// In-memory membership ledger implementation.
#[derive(Debug, Default)]
pub struct InMemoryMembershipLedger {
    memberships: RwLock<HashMap<(ContactId, MailingListId), ContactMailingList>>,
}

impl InMemoryMembershipLedger {
    /// Creates an empty in-memory ledger.
    #[must_use]
    pub fn new() -> Self {
        Self {
            memberships: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl MembershipLedger for InMemoryMembershipLedger {
    async fn record_interaction(&self, interaction: MembershipInteraction) -> AppResult<()> {
        let key = (interaction.contact_id, interaction.mailing_list_id);
        let mut memberships = self.memberships.write().await;
        let updated = interaction.apply(memberships.remove(&key));
        memberships.insert(key, updated);
        Ok(())
    }

    async fn find_membership(
        &self,
        contact_id: ContactId,
        mailing_list_id: MailingListId,
    ) -> AppResult<Option<ContactMailingList>> {
        Ok(self
            .memberships
            .read()
            .await
            .get(&(contact_id, mailing_list_id))
            .cloned())
    }
}
