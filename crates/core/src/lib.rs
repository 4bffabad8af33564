//! Shared primitives for all Rust crates in Campaign.

#![forbid(unsafe_code)]

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Result type used across Campaign crates.
pub type AppResult<T> = Result<T, AppError>;

/// Site identifier used to pick the sender identity for outgoing email.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SiteId(Uuid);

impl SiteId {
    /// Creates a random site identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a site identifier from an existing UUID value.
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

impl Default for SiteId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for SiteId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested resource does not exist.
    ///
    /// Also returned for consumed or expired verification tokens so callers
    /// cannot tell those cases apart.
    #[error("not found: {0}")]
    NotFound(String),

    /// Write operation conflicts with existing state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The backing store rejected a read or write.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// The contact could not be persisted while confirming a pending contact.
    #[error("confirmation failed: {0}")]
    ConfirmationFailed(String),

    /// A direct subscribe, unsubscribe or contact update could not be applied.
    #[error("subscription failed: {0}")]
    SubscriptionFailed(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}
