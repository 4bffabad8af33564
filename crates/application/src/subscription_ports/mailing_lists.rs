use async_trait::async_trait;

use campaign_core::AppResult;
use campaign_domain::{MailingList, MailingListId};

/// Read access to mailing lists.
#[async_trait]
pub trait MailingListDirectory: Send + Sync {
    /// Finds a mailing list by id.
    async fn find_mailing_list(&self, id: MailingListId) -> AppResult<Option<MailingList>>;
}
