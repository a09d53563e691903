use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::config::StripeConfig;
use crate::utils::{AppError, AppResult};

/// One-item checkout for a contest entry fee
#[derive(Debug, Clone)]
pub struct CheckoutSessionRequest {
    pub product_name: String,
    /// Minor currency units (cents)
    pub unit_amount: i64,
    pub currency: String,
    pub customer_email: String,
    pub metadata: HashMap<String, String>,
    pub success_url: String,
    pub cancel_url: String,
}

/// Provider view of a checkout session, as needed for reconciliation
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub amount_total: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub payment_status: String,
    /// Transaction identifier of the underlying charge
    #[serde(default)]
    pub payment_intent: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl CheckoutSession {
    pub fn is_paid(&self) -> bool {
        self.payment_status == "paid"
    }
}

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Returns the hosted checkout URL
    async fn create_checkout_session(&self, request: &CheckoutSessionRequest) -> AppResult<String>;
    async fn retrieve_session(&self, session_id: &str) -> AppResult<CheckoutSession>;
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    #[serde(default)]
    message: Option<String>,
}

/// Stripe Checkout over the REST API
pub struct StripeClient {
    config: StripeConfig,
    http: reqwest::Client,
}

impl StripeClient {
    pub fn new(config: StripeConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Stripe expects nested parameters flattened into bracketed form keys
    fn form_params(request: &CheckoutSessionRequest) -> Vec<(String, String)> {
        let mut params = vec![
            ("mode".to_string(), "payment".to_string()),
            ("line_items[0][quantity]".to_string(), "1".to_string()),
            ("line_items[0][price_data][currency]".to_string(), request.currency.clone()),
            ("line_items[0][price_data][unit_amount]".to_string(), request.unit_amount.to_string()),
            (
                "line_items[0][price_data][product_data][name]".to_string(),
                request.product_name.clone(),
            ),
            ("customer_email".to_string(), request.customer_email.clone()),
            ("success_url".to_string(), request.success_url.clone()),
            ("cancel_url".to_string(), request.cancel_url.clone()),
        ];

        let mut metadata: Vec<_> = request.metadata.iter().collect();
        metadata.sort();
        for (key, value) in metadata {
            params.push((format!("metadata[{}]", key), value.clone()));
        }

        params
    }

    async fn parse<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> AppResult<T> {
        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<StripeErrorBody>()
                .await
                .ok()
                .and_then(|body| body.error.message)
                .unwrap_or_else(|| status.to_string());
            return Err(AppError::Upstream(format!("Stripe error: {}", message)));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to parse Stripe response: {}", e)))
    }
}

#[async_trait]
impl PaymentProvider for StripeClient {
    async fn create_checkout_session(&self, request: &CheckoutSessionRequest) -> AppResult<String> {
        log::info!(
            "💳 Creating checkout session: {} {} for {}",
            request.unit_amount,
            request.currency,
            request.customer_email
        );

        let response = self
            .http
            .post(format!("{}/v1/checkout/sessions", self.config.api_base))
            .bearer_auth(&self.config.secret_key)
            .form(&Self::form_params(request))
            .timeout(Duration::from_secs(15))
            .send()
            .await?;

        let session: CheckoutSession = Self::parse(response).await?;
        log::info!("✅ Checkout session {} created", session.id);
        session.url.ok_or_else(|| {
            AppError::Upstream(format!("Stripe returned session {} without a URL", session.id))
        })
    }

    async fn retrieve_session(&self, session_id: &str) -> AppResult<CheckoutSession> {
        let response = self
            .http
            .get(format!(
                "{}/v1/checkout/sessions/{}",
                self.config.api_base,
                urlencoding::encode(session_id)
            ))
            .bearer_auth(&self.config.secret_key)
            .timeout(Duration::from_secs(15))
            .send()
            .await?;

        Self::parse(response).await
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Scripted provider: sessions are registered up front, created checkouts are recorded
    #[derive(Default)]
    pub struct FakeProvider {
        pub sessions: Mutex<HashMap<String, CheckoutSession>>,
        pub created: Mutex<Vec<CheckoutSessionRequest>>,
    }

    impl FakeProvider {
        pub fn with_session(self, session: CheckoutSession) -> Self {
            self.sessions.lock().unwrap().insert(session.id.clone(), session);
            self
        }

        pub fn add_session(&self, session: CheckoutSession) {
            self.sessions.lock().unwrap().insert(session.id.clone(), session);
        }
    }

    pub fn paid_session(id: &str, transaction_id: &str, contest_id: &str, amount_total: i64) -> CheckoutSession {
        let mut metadata = HashMap::new();
        metadata.insert("contestId".to_string(), contest_id.to_string());
        metadata.insert("contestName".to_string(), "Logo Design".to_string());
        CheckoutSession {
            id: id.to_string(),
            url: None,
            amount_total: Some(amount_total),
            currency: Some("usd".to_string()),
            customer_email: Some("player@example.com".to_string()),
            payment_status: "paid".to_string(),
            payment_intent: Some(transaction_id.to_string()),
            metadata,
        }
    }

    #[async_trait]
    impl PaymentProvider for FakeProvider {
        async fn create_checkout_session(&self, request: &CheckoutSessionRequest) -> AppResult<String> {
            self.created.lock().unwrap().push(request.clone());
            Ok(format!("https://checkout.test/pay/{}", self.created.lock().unwrap().len()))
        }

        async fn retrieve_session(&self, session_id: &str) -> AppResult<CheckoutSession> {
            self.sessions
                .lock()
                .unwrap()
                .get(session_id)
                .cloned()
                .ok_or_else(|| AppError::Upstream(format!("No such checkout.session: {}", session_id)))
        }
    }
}
