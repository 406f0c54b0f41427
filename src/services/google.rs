//! Google ID token verification
//!
//! Verifies RS256-signed Google ID tokens against Google's published JWKS,
//! checking signature, expiry, audience (our OAuth client id) and issuer.
//! Every failure is absorbed into `None`; the caller answers 401.

use std::time::{Duration, Instant};

use jsonwebtoken::{decode, decode_header, jwk::JwkSet, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use tokio::sync::RwLock;

const GOOGLE_JWKS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";
const GOOGLE_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];
const JWKS_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Normalized identity extracted from a verified Google ID token
#[derive(Debug, Clone)]
pub struct IdentityClaim {
    /// Google account subject id
    pub sub: String,
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
}

/// Claims Google embeds in ID tokens (the subset we consume)
#[derive(Debug, Deserialize)]
struct GoogleIdClaims {
    sub: String,
    email: String,
    name: String,
    picture: Option<String>,
}

struct CachedKeys {
    set: JwkSet,
    fetched_at: Instant,
}

pub struct GoogleVerifier {
    client_id: String,
    http: reqwest::Client,
    keys: RwLock<Option<CachedKeys>>,
}

impl GoogleVerifier {
    pub fn new(client_id: String) -> Self {
        Self {
            client_id,
            http: reqwest::Client::new(),
            keys: RwLock::new(None),
        }
    }

    /// Verify a Google ID token and extract the identity it asserts.
    ///
    /// Returns `None` on any failure: bad signature, expired, wrong
    /// audience, wrong issuer, unknown key or malformed token.
    pub async fn verify(&self, token: &str) -> Option<IdentityClaim> {
        let header = match decode_header(token) {
            Ok(h) => h,
            Err(e) => {
                tracing::debug!("Google token header rejected: {}", e);
                return None;
            }
        };

        let kid = header.kid?;
        let jwk = self.find_key(&kid).await?;
        let key = match DecodingKey::from_jwk(&jwk) {
            Ok(k) => k,
            Err(e) => {
                tracing::warn!("Unusable JWK from Google certs: {}", e);
                return None;
            }
        };

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.client_id]);
        validation.set_issuer(&GOOGLE_ISSUERS);

        match decode::<GoogleIdClaims>(token, &key, &validation) {
            Ok(data) => Some(IdentityClaim {
                sub: data.claims.sub,
                email: data.claims.email,
                name: data.claims.name,
                picture: data.claims.picture,
            }),
            Err(e) => {
                tracing::debug!("Google token verification failed: {}", e);
                None
            }
        }
    }

    /// Look up a key by id in the cached JWKS, refetching when the cache is
    /// stale or the kid is unknown (Google rotates keys).
    async fn find_key(&self, kid: &str) -> Option<jsonwebtoken::jwk::Jwk> {
        {
            let cache = self.keys.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.fetched_at.elapsed() < JWKS_CACHE_TTL {
                    if let Some(jwk) = cached.set.find(kid) {
                        return Some(jwk.clone());
                    }
                }
            }
        }

        let set = match self.fetch_keys().await {
            Ok(set) => set,
            Err(e) => {
                tracing::warn!("Failed to fetch Google JWKS: {}", e);
                return None;
            }
        };

        let jwk = set.find(kid).cloned();

        let mut cache = self.keys.write().await;
        *cache = Some(CachedKeys {
            set,
            fetched_at: Instant::now(),
        });

        jwk
    }

    async fn fetch_keys(&self) -> Result<JwkSet, reqwest::Error> {
        self.http
            .get(GOOGLE_JWKS_URL)
            .send()
            .await?
            .error_for_status()?
            .json::<JwkSet>()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Malformed tokens must be rejected before any network call
    #[tokio::test]
    async fn test_malformed_token_rejected() {
        let verifier = GoogleVerifier::new("client-id".to_string());
        assert!(verifier.verify("not-a-jwt").await.is_none());
        assert!(verifier.verify("").await.is_none());
    }

    // Tokens without a kid in the header cannot be matched to a key
    #[tokio::test]
    async fn test_token_without_kid_rejected() {
        use crate::models::user::AccessClaims;
        use chrono::{Duration, Utc};

        let claims = AccessClaims {
            sub: "1".to_string(),
            user_id: 1,
            email: "a@x.com".to_string(),
            role: crate::models::user::Role::Member,
            token_type: "access".to_string(),
            iat: Utc::now().timestamp(),
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
        };
        let token = claims.create_token("secret").unwrap();

        let verifier = GoogleVerifier::new("client-id".to_string());
        assert!(verifier.verify(&token).await.is_none());
    }
}
