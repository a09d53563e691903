use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::config::{AuthConfig, KeySource};
use crate::utils::{AppError, AppResult};

const JWKS_TTL: Duration = Duration::from_secs(60 * 60);

/// Verified caller identity, stored in the request extensions by `AuthMiddleware`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub email: String,
}

// Only the claims this service reads; everything else in the token is ignored
#[derive(Debug, Deserialize)]
struct IdentityClaims {
    #[allow(dead_code)]
    sub: String,
    email: Option<String>,
}

#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> AppResult<Identity>;
}

/// Extracts the token from an `Authorization: Bearer <token>` header value
pub fn bearer_token(header: Option<&str>) -> AppResult<&str> {
    let header = header.ok_or_else(|| AppError::Unauthorized("unauthorized".to_string()))?;
    match header.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
            Ok(token.trim())
        }
        _ => Err(AppError::Unauthorized("unauthorized".to_string())),
    }
}

/// Verifies identity-provider JWTs, either HS256 with a shared secret or RS256
/// against a remotely published key set
pub struct JwtVerifier {
    config: AuthConfig,
    http: reqwest::Client,
    jwks: RwLock<Option<(JwkSet, Instant)>>,
}

impl JwtVerifier {
    pub fn new(config: AuthConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
            jwks: RwLock::new(None),
        }
    }

    fn validation(&self, algorithm: Algorithm) -> Validation {
        let mut validation = Validation::new(algorithm);
        match &self.config.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }
        if let Some(issuer) = &self.config.issuer {
            validation.set_issuer(&[issuer]);
        }
        validation
    }

    async fn fetch_jwks(&self, url: &str) -> AppResult<JwkSet> {
        log::info!("🔑 Fetching identity signing keys from {}", url);

        let response = self
            .http
            .get(url)
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to fetch JWKS: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Upstream(format!("JWKS endpoint error: {}", response.status())));
        }

        response
            .json::<JwkSet>()
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to parse JWKS: {}", e)))
    }

    /// Looks the key up in the cached set, refreshing once when it is stale or the
    /// key id is unknown (keys rotate)
    async fn decoding_key(&self, url: &str, kid: &str) -> AppResult<DecodingKey> {
        {
            let cache = self.jwks.read().await;
            if let Some((set, fetched_at)) = cache.as_ref() {
                if fetched_at.elapsed() < JWKS_TTL {
                    if let Some(jwk) = set.find(kid) {
                        return DecodingKey::from_jwk(jwk)
                            .map_err(|e| AppError::InvalidToken(format!("invalid token: {}", e)));
                    }
                }
            }
        }

        let set = self.fetch_jwks(url).await?;
        let key = set
            .find(kid)
            .map(DecodingKey::from_jwk)
            .transpose()
            .map_err(|e| AppError::InvalidToken(format!("invalid token: {}", e)))?;
        *self.jwks.write().await = Some((set, Instant::now()));

        key.ok_or_else(|| AppError::InvalidToken("invalid token".to_string()))
    }
}

#[async_trait]
impl IdentityVerifier for JwtVerifier {
    async fn verify(&self, token: &str) -> AppResult<Identity> {
        let (key, algorithm) = match &self.config.key_source {
            KeySource::Secret(secret) => (DecodingKey::from_secret(secret.as_bytes()), Algorithm::HS256),
            KeySource::Jwks(url) => {
                let header = decode_header(token)
                    .map_err(|_| AppError::InvalidToken("invalid token".to_string()))?;
                let kid = header
                    .kid
                    .ok_or_else(|| AppError::InvalidToken("invalid token".to_string()))?;
                (self.decoding_key(url, &kid).await?, Algorithm::RS256)
            }
        };

        let claims = decode::<IdentityClaims>(token, &key, &self.validation(algorithm))
            .map(|data| data.claims)
            .map_err(|e| {
                log::debug!("Token rejected: {}", e);
                AppError::InvalidToken("invalid token".to_string())
            })?;

        match claims.email {
            Some(email) if !email.is_empty() => Ok(Identity { email }),
            _ => Err(AppError::InvalidToken("invalid token".to_string())),
        }
    }
}

#[cfg(test)]
pub mod testing {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde::Serialize;

    pub const SECRET: &str = "contest-hub-test-secret";

    #[derive(Serialize)]
    struct TestClaims<'a> {
        sub: &'a str,
        email: Option<&'a str>,
        exp: usize,
    }

    pub fn token_with(email: Option<&str>, secret: &str, exp_offset_secs: i64) -> String {
        let exp = (chrono::Utc::now().timestamp() + exp_offset_secs) as usize;
        encode(
            &Header::default(),
            &TestClaims { sub: "uid-1", email, exp },
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    /// A valid HS256 token for `email`, signed with [`SECRET`]
    pub fn token_for(email: &str) -> String {
        token_with(Some(email), SECRET, 3600)
    }
}
