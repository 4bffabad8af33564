//! Striped async locks serializing work per string key.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use tokio::sync::{Mutex, MutexGuard};

const DEFAULT_STRIPE_COUNT: usize = 64;

/// Fixed set of mutexes; a key always maps to the same stripe.
///
/// Distinct keys may share a stripe, which only costs contention.
#[derive(Debug)]
pub struct KeyedLocks {
    stripes: Vec<Mutex<()>>,
}

impl KeyedLocks {
    /// Creates a lock set with `stripe_count` stripes (at least one).
    #[must_use]
    pub fn new(stripe_count: usize) -> Self {
        let stripes = (0..stripe_count.max(1)).map(|_| Mutex::new(())).collect();
        Self { stripes }
    }

    /// Waits for exclusive access to `key`.
    pub async fn lock(&self, key: &str) -> MutexGuard<'_, ()> {
        self.stripes[self.stripe_index(key)].lock().await
    }

    fn stripe_index(&self, key: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        let stripe_count = self.stripes.len() as u64;
        usize::try_from(hasher.finish() % stripe_count).unwrap_or(0)
    }
}

impl Default for KeyedLocks {
    fn default() -> Self {
        Self::new(DEFAULT_STRIPE_COUNT)
    }
}
