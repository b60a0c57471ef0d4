//! Bearer token signing and validation (HS256 JWT).

use crate::{
    config::settings::JwtSecret,
    errors::{Error, Result},
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Lifetime of every issued token.
pub const TOKEN_TTL_HOURS: i64 = 24;

/// Claims carried by a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    /// Issued-at, seconds since the epoch
    pub iat: i64,
    /// Expiry, seconds since the epoch
    pub exp: i64,
}

/// Signs and validates tokens with one HMAC secret.
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtService {
    #[must_use]
    pub fn new(secret: &JwtSecret) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Issues a token for `user_id` that expires [`TOKEN_TTL_HOURS`] from now.
    pub fn issue_token(&self, user_id: i64) -> Result<String> {
        self.issue_token_at(user_id, Utc::now())
    }

    fn issue_token_at(&self, user_id: i64, issued_at: DateTime<Utc>) -> Result<String> {
        let claims = Claims {
            user_id,
            iat: issued_at.timestamp(),
            exp: (issued_at + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            Error::Token {
                message: e.to_string(),
            }
        })
    }

    /// Validates signature and expiry and returns the embedded user ID.
    ///
    /// # Errors
    /// `InvalidCredentials` for malformed, forged or expired tokens and for tokens whose
    /// `user_id` claim is missing or not an integer.
    pub fn verify_token(&self, token: &str) -> Result<i64> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims.user_id)
            .map_err(|e| {
                debug!("Rejected bearer token: {e}");
                Error::InvalidCredentials
            })
    }
}
