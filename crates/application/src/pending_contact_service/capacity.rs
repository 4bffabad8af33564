use campaign_core::AppResult;
use campaign_domain::PendingContactKey;
use tracing::warn;

use super::PendingContactService;
use crate::subscription_policy::PendingContactCap;

impl PendingContactService {
    /// Deletes the oldest requests for `key` so one more fits under the cap.
    ///
    /// Must be called with the key lock held. Returns how many were evicted.
    pub(super) async fn enforce_capacity(&self, key: &PendingContactKey) -> AppResult<u64> {
        if self.policy.max_pending_contacts == PendingContactCap::Unlimited {
            return Ok(0);
        }

        let existing = self.repository.count_for(key).await?;
        let excess = self
            .policy
            .max_pending_contacts
            .evictions_before_insert(existing);
        if excess == 0 {
            return Ok(0);
        }

        let oldest = self.repository.oldest_for(key, excess).await?;
        let mut evicted = 0_u64;
        for pending_contact in oldest {
            match self
                .repository
                .delete_pending_contact(pending_contact.id())
                .await
            {
                Ok(false) => {}
                Ok(true) => {
                    evicted = evicted.saturating_add(1);
                }
                Err(error) => {
                    warn!(
                        pending_contact_id = %pending_contact.id(),
                        email = %pending_contact.email(),
                        error = %error,
                        "failed to evict pending contact over capacity"
                    );
                }
            }
        }

        Ok(evicted)
    }
}
