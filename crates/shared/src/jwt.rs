//! JWT validation.
//!
//! Tokens are issued by the identity service. Issuing is compiled in only
//! for tests and the `test-util` feature.

use jsonwebtoken::{DecodingKey, Validation, decode};
use thiserror::Error;

use crate::auth::Claims;
use crate::config::JwtConfig;
#[cfg(any(test, feature = "test-util"))]
use crate::auth::AccessToken;

/// Errors that can occur during JWT operations.
#[derive(Debug, Error)]
pub enum JwtError {
    /// Token encoding failed.
    #[error("failed to encode token: {0}")]
    EncodingError(String),

    /// Token decoding failed.
    #[error("failed to decode token: {0}")]
    DecodingError(String),

    /// Token has expired.
    #[error("token has expired")]
    Expired,
}

/// JWT service for token operations.
#[derive(Clone)]
pub struct JwtService {
    access_token_expiry_secs: i64,
    #[cfg(any(test, feature = "test-util"))]
    encoding_key: jsonwebtoken::EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("access_token_expiry_secs", &self.access_token_expiry_secs)
            .field("decoding_key", &"[hidden]")
            .finish()
    }
}

impl JwtService {
    /// Creates a new JWT service with the given configuration.
    #[must_use]
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            access_token_expiry_secs: i64::try_from(config.access_token_expiry_secs)
                .unwrap_or(i64::MAX),
            #[cfg(any(test, feature = "test-util"))]
            encoding_key: jsonwebtoken::EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
        }
    }

    /// Signs an access token for a user working in a branch.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::EncodingError` if token generation fails.
    #[cfg(any(test, feature = "test-util"))]
    pub fn generate_access_token(
        &self,
        user_id: uuid::Uuid,
        branch_id: uuid::Uuid,
        role: Option<&str>,
    ) -> Result<AccessToken, JwtError> {
        let expires_at =
            chrono::Utc::now() + chrono::Duration::seconds(self.access_token_expiry_secs);
        let claims = Claims::new(user_id, branch_id, role, expires_at);

        let header = jsonwebtoken::Header::default();
        let access_token = jsonwebtoken::encode(&header, &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingError(e.to_string()))?;

        Ok(AccessToken {
            access_token,
            expires_in: self.access_token_expiry_secs,
        })
    }

    /// Validates and decodes a token.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::Expired` if the token has expired.
    /// Returns `JwtError::DecodingError` if the token is malformed or the
    /// signature does not match.
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let validation = Validation::default();

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::DecodingError(e.to_string()),
            })
    }
}

#[cfg(test)]
#[path = "jwt_tests.rs"]
mod tests;
