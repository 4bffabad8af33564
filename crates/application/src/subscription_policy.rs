//! Pending contact capacity and retention settings.

use std::num::NonZeroU64;

use chrono::{DateTime, Duration, Utc};

use campaign_core::{AppError, AppResult};

/// Default cap on pending contacts per email and list.
pub const DEFAULT_MAX_PENDING_CONTACTS: i64 = 5;

/// Maximum number of pending contacts kept per email and list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingContactCap {
    /// No eviction.
    Unlimited,
    /// At most this many pending contacts.
    Max(NonZeroU64),
}

impl PendingContactCap {
    /// Maps a configured value; zero or negative disables the cap.
    #[must_use]
    pub fn from_setting(value: i64) -> Self {
        u64::try_from(value)
            .ok()
            .and_then(NonZeroU64::new)
            .map_or(Self::Unlimited, Self::Max)
    }

    /// Returns how many of `existing` requests must go before one more is inserted.
    #[must_use]
    pub fn evictions_before_insert(&self, existing: u64) -> u64 {
        match self {
            Self::Unlimited => 0,
            Self::Max(max) if existing >= max.get() => existing - max.get() + 1,
            Self::Max(_) => 0,
        }
    }
}

/// How long a pending contact may wait for verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingContactRetention {
    /// Never purge.
    Forever,
    /// Purge requests not updated within this duration.
    For(Duration),
}

impl PendingContactRetention {
    /// Maps a number of seconds; zero means never purge.
    pub fn from_seconds(seconds: u64) -> AppResult<Self> {
        if seconds == 0 {
            return Ok(Self::Forever);
        }

        let seconds = i64::try_from(seconds).map_err(|_| {
            AppError::Validation(format!("purge duration of {seconds}s is too large"))
        })?;
        Duration::try_seconds(seconds)
            .map(Self::For)
            .ok_or_else(|| AppError::Validation(format!("purge duration of {seconds}s is too large")))
    }

    /// Parses a duration setting.
    ///
    /// Accepts plain seconds (`86400`) or a number with one of the suffixes
    /// `s`, `m`, `h`, `d`, `w` (`30d`). `0` means never purge.
    pub fn parse(value: &str) -> AppResult<Self> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "purge duration must not be empty".to_owned(),
            ));
        }

        let (digits, multiplier) = match trimmed.char_indices().last() {
            Some((index, unit)) if unit.is_ascii_alphabetic() => {
                let multiplier = match unit.to_ascii_lowercase() {
                    's' => 1,
                    'm' => 60,
                    'h' => 60 * 60,
                    'd' => 24 * 60 * 60,
                    'w' => 7 * 24 * 60 * 60,
                    other => {
                        return Err(AppError::Validation(format!(
                            "unknown purge duration unit '{other}' in '{trimmed}'"
                        )));
                    }
                };
                (&trimmed[..index], multiplier)
            }
            _ => (trimmed, 1),
        };

        let amount = digits.trim().parse::<u64>().map_err(|error| {
            AppError::Validation(format!("invalid purge duration '{trimmed}': {error}"))
        })?;
        let seconds = amount.checked_mul(multiplier).ok_or_else(|| {
            AppError::Validation(format!("purge duration '{trimmed}' is too large"))
        })?;

        Self::from_seconds(seconds)
    }

    /// Returns the purge cutoff for `now`, or `None` when nothing expires.
    #[must_use]
    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::Forever => None,
            Self::For(duration) => now.checked_sub_signed(*duration),
        }
    }
}

/// Capacity and retention applied to pending contacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionPolicy {
    /// Cap per email and list.
    pub max_pending_contacts: PendingContactCap,
    /// Purge window.
    pub pending_contact_retention: PendingContactRetention,
}

impl Default for SubscriptionPolicy {
    fn default() -> Self {
        Self {
            max_pending_contacts: PendingContactCap::from_setting(DEFAULT_MAX_PENDING_CONTACTS),
            pending_contact_retention: PendingContactRetention::Forever,
        }
    }
}
