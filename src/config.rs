use std::env;

use crate::utils::AppError;

/// Where identity tokens get their verification keys from
#[derive(Debug, Clone)]
pub enum KeySource {
    /// HS256 shared secret
    Secret(String),
    /// RS256 keys published as a JWK set (e.g. Firebase securetoken)
    Jwks(String),
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub key_source: KeySource,
    pub issuer: Option<String>,
    pub audience: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StripeConfig {
    pub secret_key: String,
    pub api_base: String,
    pub currency: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub database_name: String,
    pub site_domain: String,
    pub cors_origins: Vec<String>,
    pub auth: AuthConfig,
    pub stripe: StripeConfig,
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn required(name: &str) -> Result<String, AppError> {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::Config(format!("{} must be set", name)))
}

impl Config {
    /// Reads the process environment (after `.env` has been loaded)
    pub fn from_env() -> Result<Self, AppError> {
        let port = var_or("PORT", "3000")
            .parse::<u16>()
            .map_err(|e| AppError::Config(format!("Invalid PORT: {}", e)))?;

        let key_source = match (env::var("JWKS_URL").ok(), env::var("JWT_SECRET").ok()) {
            (Some(url), _) if !url.is_empty() => KeySource::Jwks(url),
            (_, Some(secret)) if !secret.is_empty() => KeySource::Secret(secret),
            _ => {
                return Err(AppError::Config(
                    "Either JWKS_URL or JWT_SECRET must be set".to_string(),
                ))
            }
        };

        let cors_origins = var_or("CORS_ORIGINS", "http://localhost:5173")
            .split(',')
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();

        Ok(Self {
            host: var_or("HOST", "0.0.0.0"),
            port,
            database_url: required("DATABASE_URL")?,
            database_name: var_or("DATABASE_NAME", "contest_hub_db"),
            site_domain: var_or("SITE_DOMAIN", "http://localhost:5173")
                .trim_end_matches('/')
                .to_string(),
            cors_origins,
            auth: AuthConfig {
                key_source,
                issuer: env::var("JWT_ISSUER").ok().filter(|v| !v.is_empty()),
                audience: env::var("JWT_AUDIENCE").ok().filter(|v| !v.is_empty()),
            },
            stripe: StripeConfig {
                secret_key: required("STRIPE_SECRET")?,
                api_base: var_or("STRIPE_API_BASE", "https://api.stripe.com")
                    .trim_end_matches('/')
                    .to_string(),
                currency: var_or("PAYMENT_CURRENCY", "usd"),
            },
        })
    }

    pub fn success_url(&self) -> String {
        format!(
            "{}/dashboard/payment-success?session_id={{CHECKOUT_SESSION_ID}}",
            self.site_domain
        )
    }

    pub fn cancel_url(&self) -> String {
        format!("{}/dashboard/payment-cancelled", self.site_domain)
    }

    #[cfg(test)]
    pub fn for_tests(site_domain: &str) -> Config {
        Config {
            host: "127.0.0.1".into(),
            port: 3000,
            database_url: "mongodb://localhost:27017".into(),
            database_name: "contest_hub_test".into(),
            site_domain: site_domain.into(),
            cors_origins: vec![],
            auth: AuthConfig {
                key_source: KeySource::Secret("s".into()),
                issuer: None,
                audience: None,
            },
            stripe: StripeConfig {
                secret_key: "sk_test".into(),
                api_base: "https://api.stripe.com".into(),
                currency: "usd".into(),
            },
        }
    }
}
