//! Contact records owned by the content store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::EmailAddress;

/// Unique identifier for a contact record.
///
/// Also serves as the `uid` half of the unsubscribe verification link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactId(Uuid);

impl ContactId {
    /// Creates a new random contact identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a contact identifier from an existing UUID value.
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

impl Default for ContactId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ContactId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Persisted contact state used to rebuild a [`Contact`] from storage.
#[derive(Debug, Clone)]
pub struct ContactInput {
    /// Contact identifier.
    pub id: ContactId,
    /// Public contact token.
    pub cid: String,
    /// Contact email address.
    pub email: EmailAddress,
    /// Most recent verification time.
    pub verified_at: Option<DateTime<Utc>>,
    /// Most recent subscription activity.
    pub last_activity: Option<DateTime<Utc>>,
    /// Custom field values.
    pub field_values: Map<String, Value>,
    /// Soft-delete time.
    pub trashed_at: Option<DateTime<Utc>>,
}

/// A subscriber known to the platform.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contact {
    id: ContactId,
    cid: String,
    email: EmailAddress,
    verified_at: Option<DateTime<Utc>>,
    last_activity: Option<DateTime<Utc>>,
    field_values: Map<String, Value>,
    trashed_at: Option<DateTime<Utc>>,
}

impl Contact {
    /// Creates a new, unverified contact.
    #[must_use]
    pub fn new(email: EmailAddress) -> Self {
        Self {
            id: ContactId::new(),
            cid: Uuid::new_v4().simple().to_string(),
            email,
            verified_at: None,
            last_activity: None,
            field_values: Map::new(),
            trashed_at: None,
        }
    }

    /// Rebuilds a contact from persisted state.
    #[must_use]
    pub fn from_input(input: ContactInput) -> Self {
        Self {
            id: input.id,
            cid: input.cid,
            email: input.email,
            verified_at: input.verified_at,
            last_activity: input.last_activity,
            field_values: input.field_values,
            trashed_at: input.trashed_at,
        }
    }

    /// Returns the contact identifier.
    #[must_use]
    pub fn id(&self) -> ContactId {
        self.id
    }

    /// Returns the public contact token.
    #[must_use]
    pub fn cid(&self) -> &str {
        self.cid.as_str()
    }

    /// Returns the contact email.
    #[must_use]
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Returns the most recent verification time.
    #[must_use]
    pub fn verified_at(&self) -> Option<DateTime<Utc>> {
        self.verified_at
    }

    /// Returns the most recent subscription activity time.
    #[must_use]
    pub fn last_activity(&self) -> Option<DateTime<Utc>> {
        self.last_activity
    }

    /// Returns the custom field values.
    #[must_use]
    pub fn field_values(&self) -> &Map<String, Value> {
        &self.field_values
    }

    /// Returns the soft-delete time, if trashed.
    #[must_use]
    pub fn trashed_at(&self) -> Option<DateTime<Utc>> {
        self.trashed_at
    }

    /// Returns whether the contact is soft-deleted.
    #[must_use]
    pub fn is_trashed(&self) -> bool {
        self.trashed_at.is_some()
    }

    /// Records a successful email verification, replacing any earlier one.
    pub fn mark_verified(&mut self, at: DateTime<Utc>) {
        self.verified_at = Some(at);
    }

    /// Replaces the contact email.
    pub fn set_email(&mut self, email: EmailAddress) {
        self.email = email;
    }

    /// Sets the given field values, keeping fields that are not mentioned.
    pub fn set_field_values(&mut self, values: &Map<String, Value>) {
        for (name, value) in values {
            self.field_values.insert(name.clone(), value.clone());
        }
    }

    /// Records subscription activity.
    pub fn touch_activity(&mut self, at: DateTime<Utc>) {
        self.last_activity = Some(at);
    }

    /// Clears the soft-delete marker.
    pub fn restore(&mut self) {
        self.trashed_at = None;
    }

    /// Marks the contact as soft-deleted.
    pub fn trash(&mut self, at: DateTime<Utc>) {
        self.trashed_at = Some(at);
    }
}
