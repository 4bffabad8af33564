//! In-memory port fakes shared by service tests.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use tokio::sync::Mutex;

use campaign_core::{AppError, AppResult, SiteId};
use campaign_domain::{
    Contact, ContactId, ContactMailingList, EmailAddress, MailingList, MailingListId,
    PendingContact, PendingContactId, PendingContactKey, VerificationEmailSettings,
};

use crate::subscription_ports::{
    Clock, ContactDirectory, EmailService, MailingListDirectory, MembershipInteraction,
    MembershipLedger, OutgoingEmail, PendingContactRepository,
};

pub(crate) fn email(value: &str) -> EmailAddress {
    EmailAddress::new(value).unwrap_or_else(|_| panic!("test email"))
}

pub(crate) fn mailing_list(title: &str) -> MailingList {
    MailingList::new(
        MailingListId::new(),
        SiteId::new(),
        title,
        VerificationEmailSettings::default(),
    )
    .unwrap_or_else(|_| panic!("test mailing list"))
}

/// Manually advanced clock.
pub(crate) struct FakeClock {
    now: std::sync::Mutex<DateTime<Utc>>,
}

impl FakeClock {
    pub(crate) fn starting_at_epoch() -> Self {
        Self {
            now: std::sync::Mutex::new(Utc.timestamp_opt(1_700_000_000, 0).single().unwrap_or_default()),
        }
    }

    pub(crate) fn advance(&self, by: Duration) {
        if let Ok(mut now) = self.now.lock() {
            *now += by;
        }
    }
}

impl Clock for FakeClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
            .lock()
            .map(|now| *now)
            .unwrap_or_else(|_| panic!("clock poisoned"))
    }
}

#[derive(Default)]
pub(crate) struct FakePendingContactRepository {
    pub(crate) records: Mutex<Vec<PendingContact>>,
    pub(crate) failing_deletes: Mutex<HashSet<PendingContactId>>,
    /// Rows another writer removes just before our delete reaches them.
    pub(crate) raced_deletes: Mutex<HashSet<PendingContactId>>,
}

impl FakePendingContactRepository {
    pub(crate) async fn stored(&self) -> Vec<PendingContact> {
        self.records.lock().await.clone()
    }
}

#[async_trait]
impl PendingContactRepository for FakePendingContactRepository {
    async fn insert_pending_contact(&self, pending_contact: &PendingContact) -> AppResult<()> {
        self.records.lock().await.push(pending_contact.clone());
        Ok(())
    }

    async fn find_by_token_hash(&self, token_hash: &str) -> AppResult<Option<PendingContact>> {
        Ok(self
            .records
            .lock()
            .await
            .iter()
            .find(|record| record.token_hash() == token_hash)
            .cloned())
    }

    async fn count_for(&self, key: &PendingContactKey) -> AppResult<u64> {
        let count = self
            .records
            .lock()
            .await
            .iter()
            .filter(|record| &record.key() == key)
            .count();
        Ok(count as u64)
    }

    async fn oldest_for(
        &self,
        key: &PendingContactKey,
        limit: u64,
    ) -> AppResult<Vec<PendingContact>> {
        let mut matching: Vec<PendingContact> = self
            .records
            .lock()
            .await
            .iter()
            .filter(|record| &record.key() == key)
            .cloned()
            .collect();
        matching.sort_by_key(PendingContact::created_at);
        matching.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(matching)
    }

    async fn delete_pending_contact(&self, id: PendingContactId) -> AppResult<bool> {
        if self.failing_deletes.lock().await.contains(&id) {
            return Err(AppError::Persistence(format!(
                "failed to delete pending contact '{id}'"
            )));
        }

        let mut records = self.records.lock().await;
        if self.raced_deletes.lock().await.contains(&id) {
            records.retain(|record| record.id() != id);
        }
        let before = records.len();
        records.retain(|record| record.id() != id);
        Ok(records.len() < before)
    }

    async fn find_updated_before(&self, cutoff: DateTime<Utc>) -> AppResult<Vec<PendingContact>> {
        Ok(self
            .records
            .lock()
            .await
            .iter()
            .filter(|record| record.updated_at() < cutoff)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub(crate) struct FakeContactDirectory {
    pub(crate) contacts: Mutex<HashMap<ContactId, Contact>>,
    pub(crate) activity: Mutex<Vec<(ContactId, DateTime<Utc>)>>,
    pub(crate) fail_saves: AtomicBool,
    pub(crate) lookup_delay_ms: AtomicU64,
}

impl FakeContactDirectory {
    pub(crate) async fn all(&self) -> Vec<Contact> {
        self.contacts.lock().await.values().cloned().collect()
    }

    pub(crate) async fn insert(&self, contact: Contact) {
        self.contacts.lock().await.insert(contact.id(), contact);
    }
}

#[async_trait]
impl ContactDirectory for FakeContactDirectory {
    async fn find_by_email(
        &self,
        email: &EmailAddress,
        include_trashed: bool,
    ) -> AppResult<Option<Contact>> {
        let found = self
            .contacts
            .lock()
            .await
            .values()
            .find(|contact| contact.email() == email && (include_trashed || !contact.is_trashed()))
            .cloned();

        let delay_ms = self.lookup_delay_ms.load(Ordering::SeqCst);
        if delay_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(delay_ms)).await;
        }
        Ok(found)
    }

    async fn find_by_cid(&self, cid: &str) -> AppResult<Option<Contact>> {
        Ok(self
            .contacts
            .lock()
            .await
            .values()
            .find(|contact| contact.cid() == cid && !contact.is_trashed())
            .cloned())
    }

    async fn restore_contact(&self, contact: &Contact) -> AppResult<bool> {
        let mut contacts = self.contacts.lock().await;
        let Some(stored) = contacts.get_mut(&contact.id()) else {
            return Ok(false);
        };
        stored.restore();
        Ok(true)
    }

    async fn save_contact(&self, contact: &Contact) -> AppResult<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(AppError::Persistence("failed to save contact".to_owned()));
        }

        self.contacts
            .lock()
            .await
            .insert(contact.id(), contact.clone());
        Ok(())
    }

    async fn update_last_activity(&self, contact_id: ContactId, at: DateTime<Utc>) -> AppResult<()> {
        self.activity.lock().await.push((contact_id, at));
        if let Some(contact) = self.contacts.lock().await.get_mut(&contact_id) {
            contact.touch_activity(at);
        }
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct FakeMailingListDirectory {
    pub(crate) lists: Mutex<HashMap<MailingListId, MailingList>>,
}

impl FakeMailingListDirectory {
    pub(crate) async fn insert(&self, mailing_list: MailingList) {
        self.lists
            .lock()
            .await
            .insert(mailing_list.id(), mailing_list);
    }
}

#[async_trait]
impl MailingListDirectory for FakeMailingListDirectory {
    async fn find_mailing_list(&self, id: MailingListId) -> AppResult<Option<MailingList>> {
        Ok(self.lists.lock().await.get(&id).cloned())
    }
}

#[derive(Default)]
pub(crate) struct FakeMembershipLedger {
    pub(crate) memberships: Mutex<HashMap<(ContactId, MailingListId), ContactMailingList>>,
    pub(crate) fail_writes: AtomicBool,
}

#[async_trait]
impl MembershipLedger for FakeMembershipLedger {
    async fn record_interaction(&self, interaction: MembershipInteraction) -> AppResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Persistence(
                "failed to upsert contact mailing list".to_owned(),
            ));
        }

        let mut memberships = self.memberships.lock().await;
        let key = (interaction.contact_id, interaction.mailing_list_id);
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
            .lock()
            .await
            .get(&(contact_id, mailing_list_id))
            .cloned())
    }
}

#[derive(Default)]
pub(crate) struct RecordingEmailService {
    pub(crate) sent: Mutex<Vec<OutgoingEmail>>,
    pub(crate) fail: AtomicBool,
}

#[async_trait]
impl EmailService for RecordingEmailService {
    async fn send_email(&self, email: &OutgoingEmail) -> AppResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::Internal("smtp relay unavailable".to_owned()));
        }

        self.sent.lock().await.push(email.clone());
        Ok(())
    }
}

/// Fakes wired together for service tests.
pub(crate) struct Fixture {
    pub(crate) clock: Arc<FakeClock>,
    pub(crate) pending_contacts: Arc<FakePendingContactRepository>,
    pub(crate) contacts: Arc<FakeContactDirectory>,
    pub(crate) mailing_lists: Arc<FakeMailingListDirectory>,
    pub(crate) memberships: Arc<FakeMembershipLedger>,
    pub(crate) emails: Arc<RecordingEmailService>,
}

impl Fixture {
    pub(crate) fn new() -> Self {
        Self {
            clock: Arc::new(FakeClock::starting_at_epoch()),
            pending_contacts: Arc::new(FakePendingContactRepository::default()),
            contacts: Arc::new(FakeContactDirectory::default()),
            mailing_lists: Arc::new(FakeMailingListDirectory::default()),
            memberships: Arc::new(FakeMembershipLedger::default()),
            emails: Arc::new(RecordingEmailService::default()),
        }
    }

    pub(crate) async fn activity_count(&self) -> usize {
        self.contacts.activity.lock().await.len()
    }
}
