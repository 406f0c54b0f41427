//! Authentication service: login, token issuance, verification, revocation

use chrono::{Duration, Utc};
use rand::{distributions::Alphanumeric, Rng};

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::{
        token::{LoginResponse, RefreshResponse},
        user::{AccessClaims, Role, User},
    },
    repository::Repository,
    services::google::{GoogleVerifier, IdentityClaim},
};

/// Resolve the role granted to a brand-new user from the configured
/// allow-lists. Admin membership wins over librarian; everyone else starts
/// as member. Only consulted at user creation; administrative role changes
/// override it afterwards.
pub fn resolve_role(email: &str, config: &AuthConfig) -> Role {
    let email = email.trim();

    if config.admin_allow_list().iter().any(|e| e == email) {
        Role::Admin
    } else if config.librarian_allow_list().iter().any(|e| e == email) {
        Role::Librarian
    } else {
        Role::Member
    }
}

/// Decode a bearer token into access claims without touching the database.
/// Returns `None` for a bad signature, an expired token, or a `token_type`
/// other than "access" (refresh tokens are opaque strings, but nothing stops
/// a client from presenting some other signed JWT here).
fn decode_access_claims(token: &str, secret: &str) -> Option<AccessClaims> {
    let claims = match AccessClaims::from_token(token, secret) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!("Access token rejected: {}", e);
            return None;
        }
    };

    if claims.token_type != "access" {
        tracing::debug!("Rejected token with type {:?}", claims.token_type);
        return None;
    }

    Some(claims)
}

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
    google: std::sync::Arc<GoogleVerifier>,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        let google = std::sync::Arc::new(GoogleVerifier::new(config.google_client_id.clone()));
        Self {
            repository,
            config,
            google,
        }
    }

    /// Full Google sign-in flow: verify the ID token, upsert the user and
    /// mint an access/refresh token pair.
    pub async fn login_with_google(&self, id_token: &str) -> AppResult<LoginResponse> {
        let claim = self
            .google
            .verify(id_token)
            .await
            .ok_or_else(|| AppError::Authentication("Invalid Google token".to_string()))?;

        let user = self.upsert_from_claim(&claim).await?;

        let access_token = self.issue_access_token(&user)?;
        let refresh_token = self.issue_refresh_token(&user).await?;

        tracing::info!(user_id = user.id, email = %user.email, "User logged in");

        Ok(LoginResponse {
            access_token,
            refresh_token,
            user,
        })
    }

    /// Single write path for identity-derived fields: update an existing
    /// user's name/picture/google id and last login, or create a new user
    /// with a role resolved from the allow-lists.
    pub async fn upsert_from_claim(&self, claim: &IdentityClaim) -> AppResult<User> {
        match self.repository.users.find_by_email(&claim.email).await? {
            Some(user) => self.repository.users.update_from_claim(user.id, claim).await,
            None => {
                let role = resolve_role(&claim.email, &self.config);
                let user = self.repository.users.create_from_claim(claim, role).await?;
                tracing::info!(user_id = user.id, email = %user.email, role = %user.role, "Created user");
                Ok(user)
            }
        }
    }

    /// Mint a signed access token for a user. Stateless, 1 hour by default.
    pub fn issue_access_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now();
        let exp = now + Duration::hours(self.config.access_token_hours as i64);

        let claims = AccessClaims {
            sub: user.id.to_string(),
            user_id: user.id,
            email: user.email.clone(),
            role: user.role,
            token_type: "access".to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Mint, persist and return a new opaque refresh token. Any previously
    /// issued token for the user is revoked in the same transaction, so at
    /// most one refresh token per user is ever valid. The raw string is
    /// returned here and never retrievable afterwards.
    pub async fn issue_refresh_token(&self, user: &User) -> AppResult<String> {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(64)
            .map(char::from)
            .collect();

        let expires_at = Utc::now() + Duration::days(self.config.refresh_token_days as i64);

        self.repository
            .tokens
            .issue(user.id, &token, expires_at)
            .await?;

        Ok(token)
    }

    /// Verify an access token and resolve its user.
    ///
    /// Returns `Ok(None)` for every verification failure: bad signature,
    /// expired, wrong token type, unknown or deactivated user. Only
    /// persistence errors propagate.
    pub async fn verify_access_token(&self, token: &str) -> AppResult<Option<User>> {
        let claims = match decode_access_claims(token, &self.config.jwt_secret) {
            Some(claims) => claims,
            None => return Ok(None),
        };

        match self.repository.users.get_by_id(claims.user_id).await {
            Ok(user) if user.is_active => Ok(Some(user)),
            Ok(_) | Err(AppError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Exchange a valid refresh token for a fresh access token. The refresh
    /// token itself is not rotated; it stays valid until its own expiry or
    /// explicit revocation.
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<Option<RefreshResponse>> {
        let row = match self.repository.tokens.find_active(refresh_token).await? {
            Some(row) if row.is_valid() => row,
            _ => return Ok(None),
        };

        let user = match self.repository.users.get_by_id(row.user_id).await {
            Ok(user) if user.is_active => user,
            Ok(_) | Err(AppError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };

        let access_token = self.issue_access_token(&user)?;

        Ok(Some(RefreshResponse { access_token, user }))
    }

    /// Revoke a single refresh token; reports whether it existed
    pub async fn revoke(&self, refresh_token: &str) -> AppResult<bool> {
        self.repository.tokens.revoke(refresh_token).await
    }

    /// Revoke every refresh token for a user (logout-all, deactivation)
    pub async fn revoke_all(&self, user_id: i32) -> AppResult<()> {
        self.repository.tokens.revoke_all_for_user(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(admins: &str, librarians: &str) -> AuthConfig {
        AuthConfig {
            admin_emails: admins.to_string(),
            librarian_emails: librarians.to_string(),
            ..AuthConfig::default()
        }
    }

    #[test]
    fn test_default_role_is_member() {
        let cfg = config("", "");
        assert_eq!(resolve_role("a@x.com", &cfg), Role::Member);
    }

    #[test]
    fn test_allow_lists_resolve_roles() {
        let cfg = config("root@lib.org", "desk@lib.org");
        assert_eq!(resolve_role("root@lib.org", &cfg), Role::Admin);
        assert_eq!(resolve_role("desk@lib.org", &cfg), Role::Librarian);
        assert_eq!(resolve_role("patron@lib.org", &cfg), Role::Member);
    }

    #[test]
    fn test_admin_list_wins_over_librarian_list() {
        let cfg = config("both@lib.org", "both@lib.org");
        assert_eq!(resolve_role("both@lib.org", &cfg), Role::Admin);
    }

    fn signed_token(token_type: &str, secret: &str) -> String {
        AccessClaims {
            sub: "1".to_string(),
            user_id: 1,
            email: "a@x.com".to_string(),
            role: Role::Member,
            token_type: token_type.to_string(),
            iat: Utc::now().timestamp(),
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
        }
        .create_token(secret)
        .unwrap()
    }

    #[test]
    fn test_access_claims_decoded() {
        let token = signed_token("access", "secret");
        let claims = decode_access_claims(&token, "secret").expect("valid access token");
        assert_eq!(claims.user_id, 1);
    }

    #[test]
    fn test_non_access_token_type_rejected() {
        // A validly signed JWT whose type claim is anything but "access"
        // must not pass bearer verification
        for token_type in ["refresh", "id", ""] {
            let token = signed_token(token_type, "secret");
            assert!(decode_access_claims(&token, "secret").is_none());
        }
    }

    #[test]
    fn test_allow_list_whitespace_trimmed() {
        let cfg = config(" root@lib.org , second@lib.org ", "");
        assert_eq!(resolve_role("root@lib.org", &cfg), Role::Admin);
        assert_eq!(resolve_role("second@lib.org", &cfg), Role::Admin);
        assert_eq!(resolve_role("  root@lib.org  ", &cfg), Role::Admin);
    }
}
