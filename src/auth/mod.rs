//! Identity and token service.
//!
//! `/api/auth` is both login and sign-up: the first successful call for a username registers
//! it with the supplied password, later calls must present the same password. On success a
//! signed bearer token is issued; every other endpoint validates that token.

pub mod password;
pub mod token;

use crate::{
    core::user::{Registration, find_or_create_user},
    errors::{Error, Result},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tracing::{info, instrument, warn};

pub use token::{Claims, JwtService, TOKEN_TTL_HOURS};

/// Longest accepted username, in characters.
pub const MAX_USERNAME_LEN: usize = 31;

/// Authenticates users against the credential store and issues tokens.
#[derive(Clone)]
pub struct AuthService {
    db: DatabaseConnection,
    jwt: Arc<JwtService>,
    bcrypt_cost: u32,
    starting_balance: i64,
}

impl AuthService {
    /// Creates the service. `bcrypt_cost` is applied to new registrations only; existing
    /// digests carry their own cost.
    #[must_use]
    pub const fn new(
        db: DatabaseConnection,
        jwt: Arc<JwtService>,
        bcrypt_cost: u32,
        starting_balance: i64,
    ) -> Self {
        Self {
            db,
            jwt,
            bcrypt_cost,
            starting_balance,
        }
    }

    /// Logs `username` in, registering it on first sight, and returns a bearer token.
    ///
    /// Empty or over-long usernames and empty passwords are rejected before the store is
    /// touched. A freshly registered user is accepted unconditionally; an existing one must
    /// present a password that verifies against the stored digest.
    ///
    /// # Errors
    /// `InvalidCredentials` on bad input or a wrong password; `StoreUnavailable`,
    /// `PasswordHash`, `Task` or `Token` on infrastructure failures.
    #[instrument(skip(self, password))]
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<String> {
        validate_credentials(username, password)?;

        let digest = password::hash_password(password, self.bcrypt_cost).await?;
        let credentials =
            find_or_create_user(&self.db, username, &digest, self.starting_balance).await?;

        match credentials.registration {
            Registration::Created => {
                info!(user_id = credentials.user_id, "First login registered user");
            }
            Registration::Existing => {
                if !password::verify_password(password, &credentials.password_hash).await? {
                    warn!(user_id = credentials.user_id, "Wrong password");
                    return Err(Error::InvalidCredentials);
                }
            }
        }

        self.jwt.issue_token(credentials.user_id)
    }

    /// Validates a bearer token and returns the user ID it carries.
    ///
    /// # Errors
    /// `InvalidCredentials` for a malformed, forged or expired token.
    pub fn verify_token(&self, token: &str) -> Result<i64> {
        self.jwt.verify_token(token)
    }
}

fn validate_credentials(username: &str, password: &str) -> Result<()> {
    if username.is_empty() || username.chars().count() > MAX_USERNAME_LEN || password.is_empty() {
        return Err(Error::InvalidCredentials);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::config::settings::JwtSecret;
    use crate::core::{snapshot::read_user_snapshot, user::get_user_by_username};
    use crate::test_utils::*;
    use sea_orm::{EntityTrait, PaginatorTrait};

    fn service(db: DatabaseConnection) -> AuthService {
        AuthService::new(
            db,
            Arc::new(JwtService::new(&JwtSecret::new("test-secret"))),
            TEST_BCRYPT_COST,
            1000,
        )
    }

    #[tokio::test]
    async fn test_invalid_input_rejected_before_store() -> Result<()> {
        // Any query on this connection fails with `StoreUnavailable`
        let auth = service(DatabaseConnection::Disconnected);

        let too_long = "x".repeat(MAX_USERNAME_LEN + 1);
        for (username, password) in [("", "pw"), ("alice", ""), (too_long.as_str(), "pw")] {
            let result = auth.authenticate(username, password).await;
            assert!(matches!(result, Err(Error::InvalidCredentials)));
        }

        Ok(())
    }

    #[test]
    fn test_username_length_counts_characters() {
        let max = "é".repeat(MAX_USERNAME_LEN);
        assert!(validate_credentials(&max, "pw").is_ok());
        let over = "é".repeat(MAX_USERNAME_LEN + 1);
        assert!(validate_credentials(&over, "pw").is_err());
    }

    #[tokio::test]
    async fn test_first_login_registers_and_issues_token() -> Result<()> {
        let db = setup_test_db().await?;
        let auth = service(db.clone());

        let token = auth.authenticate("alice", "password123").await?;
        let user_id = auth.verify_token(&token)?;

        let stored = get_user_by_username(&db, "alice").await?.unwrap();
        assert_eq!(stored.id, user_id);
        assert_eq!(stored.balance, 1000);
        assert_ne!(stored.password_hash, "password123");

        Ok(())
    }

    #[tokio::test]
    async fn test_returning_user_with_correct_password() -> Result<()> {
        let db = setup_test_db().await?;
        let auth = service(db.clone());

        let first = auth.verify_token(&auth.authenticate("alice", "pw").await?)?;
        let second = auth.verify_token(&auth.authenticate("alice", "pw").await?)?;
        assert_eq!(first, second);

        Ok(())
    }

    #[tokio::test]
    async fn test_wrong_password_rejected_and_nothing_changes() -> Result<()> {
        let db = setup_test_db().await?;
        let auth = service(db.clone());

        let user_id = auth.verify_token(&auth.authenticate("alice", "right").await?)?;
        let before = read_user_snapshot(&db, user_id).await?;

        let result = auth.authenticate("alice", "wrong").await;
        assert!(matches!(result, Err(Error::InvalidCredentials)));

        assert_eq!(read_user_snapshot(&db, user_id).await?, before);
        assert_eq!(crate::entities::User::find().count(&db).await?, 1);

        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_logins_share_one_account() -> Result<()> {
        let (_dir, db) = setup_pooled_test_db().await?;
        let auth = service(db.clone());

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let auth = auth.clone();
                tokio::spawn(async move { auth.authenticate("racer", "same-password").await })
            })
            .collect();
        let mut user_ids = Vec::new();
        for handle in handles {
            let token = handle.await??;
            user_ids.push(auth.verify_token(&token)?);
        }

        assert!(user_ids.iter().all(|id| *id == user_ids[0]));
        assert_eq!(crate::entities::User::find().count(&db).await?, 1);

        Ok(())
    }
}
