use campaign_core::AppResult;
use tracing::{info, warn};

use super::PendingContactService;

/// Outcome of one purge pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeReport {
    /// Requests deleted.
    pub deleted: u64,
    /// Requests whose deletion failed and were skipped.
    pub failed: u64,
}

impl PendingContactService {
    /// Deletes pending contacts not updated within the retention window.
    ///
    /// A no-op when retention is `Forever`. Safe to run concurrently with
    /// submissions and with other purges.
    pub async fn purge_expired_pending_contacts(&self) -> AppResult<PurgeReport> {
        let Some(cutoff) = self
            .policy
            .pending_contact_retention
            .cutoff(self.clock.now())
        else {
            return Ok(PurgeReport::default());
        };

        let expired = self.repository.find_updated_before(cutoff).await?;
        let mut report = PurgeReport::default();

        for pending_contact in expired {
            match self
                .repository
                .delete_pending_contact(pending_contact.id())
                .await
            {
                // Already removed by a confirm or another purge.
                Ok(false) => {}
                Ok(true) => {
                    report.deleted = report.deleted.saturating_add(1);
                    info!(
                        email = %pending_contact.email(),
                        mailing_list_id = %pending_contact.mailing_list_id(),
                        "deleted pending contact \"{}\", because they took too long to verify their email",
                        pending_contact.email()
                    );
                }
                Err(error) => {
                    report.failed = report.failed.saturating_add(1);
                    warn!(
                        pending_contact_id = %pending_contact.id(),
                        email = %pending_contact.email(),
                        error = %error,
                        "failed to purge expired pending contact"
                    );
                }
            }
        }

        Ok(report)
    }
}
