//! Pending (double opt-in) subscription requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{EmailAddress, MailingListId};

/// Unique identifier for a pending contact row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PendingContactId(Uuid);

impl PendingContactId {
    /// Creates a new random pending contact identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a pending contact identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for PendingContactId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PendingContactId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Capacity key: one email address on one mailing list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PendingContactKey {
    /// Subscriber email.
    pub email: EmailAddress,
    /// Target mailing list.
    pub mailing_list_id: MailingListId,
}

impl PendingContactKey {
    /// Creates a capacity key.
    #[must_use]
    pub fn new(email: EmailAddress, mailing_list_id: MailingListId) -> Self {
        Self {
            email,
            mailing_list_id,
        }
    }

    /// Returns a stable string form used for lock striping.
    #[must_use]
    pub fn lock_key(&self) -> String {
        format!("{}|{}", self.email.as_str(), self.mailing_list_id)
    }
}

/// Data needed to persist a new pending contact.
#[derive(Debug, Clone)]
pub struct NewPendingContact {
    /// SHA-256 hex digest of the verification token.
    pub token_hash: String,
    /// Subscriber email.
    pub email: EmailAddress,
    /// Target mailing list.
    pub mailing_list_id: MailingListId,
    /// Submission origin, e.g. the referring URL.
    pub source: String,
    /// Submitted form fields, forwarded to the contact on confirmation.
    pub field_data: Map<String, Value>,
}

/// Persisted pending contact state used to rebuild a [`PendingContact`].
#[derive(Debug, Clone)]
pub struct PendingContactInput {
    /// Row identifier.
    pub id: PendingContactId,
    /// SHA-256 hex digest of the verification token.
    pub token_hash: String,
    /// Subscriber email.
    pub email: EmailAddress,
    /// Target mailing list.
    pub mailing_list_id: MailingListId,
    /// Submission origin.
    pub source: String,
    /// Submitted form fields.
    pub field_data: Map<String, Value>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

/// A subscription request waiting for email verification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingContact {
    id: PendingContactId,
    #[serde(skip_serializing)]
    token_hash: String,
    email: EmailAddress,
    mailing_list_id: MailingListId,
    source: String,
    field_data: Map<String, Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PendingContact {
    /// Creates a pending contact stamped with `now` as both timestamps.
    #[must_use]
    pub fn create(new: NewPendingContact, now: DateTime<Utc>) -> Self {
        Self {
            id: PendingContactId::new(),
            token_hash: new.token_hash,
            email: new.email,
            mailing_list_id: new.mailing_list_id,
            source: new.source,
            field_data: new.field_data,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuilds a pending contact from persisted state.
    #[must_use]
    pub fn from_input(input: PendingContactInput) -> Self {
        Self {
            id: input.id,
            token_hash: input.token_hash,
            email: input.email,
            mailing_list_id: input.mailing_list_id,
            source: input.source,
            field_data: input.field_data,
            created_at: input.created_at,
            updated_at: input.updated_at,
        }
    }

    /// Returns the row identifier.
    #[must_use]
    pub fn id(&self) -> PendingContactId {
        self.id
    }

    /// Returns the stored token digest.
    #[must_use]
    pub fn token_hash(&self) -> &str {
        self.token_hash.as_str()
    }

    /// Returns the subscriber email.
    #[must_use]
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Returns the target mailing list.
    #[must_use]
    pub fn mailing_list_id(&self) -> MailingListId {
        self.mailing_list_id
    }

    /// Returns the submission origin.
    #[must_use]
    pub fn source(&self) -> &str {
        self.source.as_str()
    }

    /// Returns the submitted form fields.
    #[must_use]
    pub fn field_data(&self) -> &Map<String, Value> {
        &self.field_data
    }

    /// Returns the creation time.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last update time.
    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the capacity key of this request.
    #[must_use]
    pub fn key(&self) -> PendingContactKey {
        PendingContactKey::new(self.email.clone(), self.mailing_list_id)
    }
}
