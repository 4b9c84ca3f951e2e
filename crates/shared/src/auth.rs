//! Authentication types for JWT access tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims for access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: Uuid,
    /// Branch the user is working in.
    pub branch: Uuid,
    /// User's role. Older tokens may omit it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for a user.
    #[must_use]
    pub fn new(
        user_id: Uuid,
        branch_id: Uuid,
        role: Option<&str>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            branch: branch_id,
            role: role.map(str::to_string),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the user ID from claims.
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.sub
    }

    /// Returns the branch ID from claims.
    #[must_use]
    pub const fn branch_id(&self) -> Uuid {
        self.branch
    }
}

/// A signed token and its lifetime, as issued in tests.
#[cfg(any(test, feature = "test-util"))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    /// Encoded JWT.
    pub access_token: String,
    /// Expiration in seconds.
    pub expires_in: i64,
}
