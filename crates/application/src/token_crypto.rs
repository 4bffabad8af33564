//! Verification token generation and storage digests.

use campaign_core::{AppError, AppResult};

/// Generates a cryptographically random token and its SHA-256 hash.
///
/// Returns `(raw_token_hex, sha256_hash_hex)`. The raw token is 256 bits of
/// OS randomness and is never derived from the email, list or time.
pub(crate) fn generate_token() -> AppResult<(String, String)> {
    let mut bytes = [0u8; 32];
    getrandom::fill(&mut bytes).map_err(|error| {
        AppError::Internal(format!("failed to generate verification token: {error}"))
    })?;

    let raw_token = to_hex(&bytes);
    let hash = hash_token(&raw_token);
    Ok((raw_token, hash))
}

/// Computes the SHA-256 hash of a token string for storage.
pub(crate) fn hash_token(raw_token: &str) -> String {
    use sha2::{Digest, Sha256};

    let mut hasher = Sha256::new();
    hasher.update(raw_token.as_bytes());
    to_hex(&hasher.finalize())
}

fn to_hex(bytes: &[u8]) -> String {
    use std::fmt::Write;

    bytes
        .iter()
        .fold(String::with_capacity(bytes.len() * 2), |mut acc, byte| {
            let _ = write!(acc, "{byte:02x}");
            acc
        })
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::{generate_token, hash_token};

    #[test]
    fn tokens_do_not_collide() {
        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            let (raw_token, _) = generate_token().unwrap_or_else(|_| panic!("test"));
            assert!(seen.insert(raw_token));
        }
    }

    #[test]
    fn token_is_64_hex_chars_and_hash_differs() {
        let (raw_token, token_hash) = generate_token().unwrap_or_else(|_| panic!("test"));
        assert_eq!(raw_token.len(), 64);
        assert!(raw_token.chars().all(|character| character.is_ascii_hexdigit()));
        assert_ne!(raw_token, token_hash);
        assert_eq!(hash_token(&raw_token), token_hash);
    }

    #[test]
    fn token_is_not_the_hash_of_its_inputs() {
        let (raw_token, _) = generate_token().unwrap_or_else(|_| panic!("test"));
        assert_ne!(raw_token, hash_token("a@x.com"));
        assert!(!raw_token.contains("a@x.com"));
    }
}
