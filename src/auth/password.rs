//! Password digests.
//!
//! bcrypt is deliberately slow, so both operations run on tokio's blocking pool instead of
//! an async worker thread.

use crate::errors::Result;
use tracing::warn;

/// Computes a bcrypt digest of `password` with the given work factor.
///
/// # Errors
/// `PasswordHash` for a cost outside bcrypt's range, `Task` if the blocking task panics.
pub async fn hash_password(password: &str, cost: u32) -> Result<String> {
    let password = password.to_owned();
    let digest = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;
    Ok(digest)
}

/// Checks `password` against a stored digest.
///
/// A digest that cannot be parsed never matches.
///
/// # Errors
/// `Task` if the blocking task panics.
pub async fn verify_password(password: &str, digest: &str) -> Result<bool> {
    let password = password.to_owned();
    let digest = digest.to_owned();
    let verdict = tokio::task::spawn_blocking(move || bcrypt::verify(password, &digest)).await?;
    Ok(verdict.unwrap_or_else(|e| {
        warn!("Stored password digest is unreadable: {e}");
        false
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TEST_BCRYPT_COST;

    #[tokio::test]
    async fn test_hash_then_verify() -> Result<()> {
        let digest = hash_password("password123", TEST_BCRYPT_COST).await?;
        assert_ne!(digest, "password123");
        assert!(verify_password("password123", &digest).await?);
        assert!(!verify_password("password124", &digest).await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_same_password_gets_distinct_salts() -> Result<()> {
        let a = hash_password("same", TEST_BCRYPT_COST).await?;
        let b = hash_password("same", TEST_BCRYPT_COST).await?;
        assert_ne!(a, b);
        Ok(())
    }

    #[tokio::test]
    async fn test_garbage_digest_never_matches() -> Result<()> {
        assert!(!verify_password("anything", "not-a-bcrypt-digest").await?);
        Ok(())
    }
}
