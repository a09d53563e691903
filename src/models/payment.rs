use serde::{Deserialize, Serialize};

/// Document in the "payments" collection
///
/// `transaction_id` is the provider's charge identifier and is unique across the
/// collection; it is the idempotency key for reconciliation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    #[serde(rename = "_id")]
    pub id: String,
    pub amount: f64,
    pub currency: String,
    pub user_email: String,
    pub contest_id: String,
    #[serde(default)]
    pub contest_name: Option<String>,
    pub transaction_id: String,
    pub payment_status: String,
    pub paid_at: i64,
    pub tracking_id: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub price: f64,
    pub contest_id: String,
    pub contest_name: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CheckoutResponse {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct PaymentSuccessQuery {
    pub session_id: String,
}

#[derive(Debug, Deserialize)]
pub struct PaymentListQuery {
    pub email: Option<String>,
}

/// A payment enriched with the state of the contest it paid for
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipatedContest {
    #[serde(flatten)]
    pub payment: Payment,
    pub deadline: Option<String>,
    pub is_submitted: bool,
}
