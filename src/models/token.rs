//! Refresh token model and auth request/response types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::user::User;

/// Persisted opaque refresh token
#[derive(Debug, Clone, FromRow)]
pub struct RefreshToken {
    pub id: i32,
    pub user_id: i32,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub is_revoked: bool,
    pub created_at: DateTime<Utc>,
}

impl RefreshToken {
    /// Valid = not revoked and not past its expiry
    pub fn is_valid(&self) -> bool {
        !self.is_revoked && self.expires_at > Utc::now()
    }
}

/// Google sign-in request. The token is checked for presence in the
/// handler so an absent field answers 400, not a deserialization rejection.
#[derive(Debug, Deserialize, ToSchema)]
pub struct GoogleLoginRequest {
    pub token: Option<String>,
}

/// Refresh request
#[derive(Debug, Deserialize, ToSchema)]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

/// Logout request; the refresh token to revoke is optional
#[derive(Debug, Deserialize, ToSchema)]
pub struct LogoutRequest {
    pub refresh_token: Option<String>,
}

/// Successful login response
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: User,
}

/// Successful refresh response
#[derive(Debug, Serialize, ToSchema)]
pub struct RefreshResponse {
    pub access_token: String,
    pub user: User,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn token(expires_at: DateTime<Utc>, is_revoked: bool) -> RefreshToken {
        RefreshToken {
            id: 1,
            user_id: 1,
            token: "opaque".to_string(),
            expires_at,
            is_revoked,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_validity() {
        let future = Utc::now() + Duration::days(1);
        let past = Utc::now() - Duration::days(1);

        assert!(token(future, false).is_valid());
        assert!(!token(future, true).is_valid());
        assert!(!token(past, false).is_valid());
    }
}
