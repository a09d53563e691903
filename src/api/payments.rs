use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::models::{Capability, CheckoutRequest, CheckoutResponse, PaymentListQuery, PaymentSuccessQuery};
use crate::services::{Identity, ReconcileOutcome};
use crate::state::AppState;
use crate::utils::{AppError, AppResult};

/// POST /create-checkout-session
#[utoipa::path(post, path = "/create-checkout-session", tag = "Payments", security(("bearer_auth" = [])),
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Hosted checkout URL", body = CheckoutResponse),
        (status = 404, description = "Contest not found")
    ))]
pub async fn create_checkout_session(
    state: web::Data<AppState>,
    caller: web::ReqData<Identity>,
    body: web::Json<CheckoutRequest>,
) -> AppResult<HttpResponse> {
    let url = state.payments.create_checkout(&caller.email, &body).await?;
    Ok(HttpResponse::Ok().json(CheckoutResponse { url }))
}

/// PATCH /payment-success?session_id= - Idempotent by transactionId
#[utoipa::path(patch, path = "/payment-success", tag = "Payments",
    params(("session_id" = String, Query, description = "Checkout session id")),
    responses(
        (status = 200, description = "Payment recorded, or already processed"),
        (status = 400, description = "Payment not paid")
    ))]
pub async fn payment_success(
    state: web::Data<AppState>,
    query: web::Query<PaymentSuccessQuery>,
) -> AppResult<HttpResponse> {
    match state.payments.reconcile(&query.session_id).await? {
        ReconcileOutcome::Recorded(payment) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "trackingId": payment.tracking_id,
            "transactionId": payment.transaction_id,
            "paymentId": payment.id,
        }))),
        ReconcileOutcome::AlreadyProcessed(payment) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Already processed",
            "trackingId": payment.tracking_id,
            "transactionId": payment.transaction_id,
        }))),
        ReconcileOutcome::NotPaid { payment_status } => {
            log::info!("💳 Session {} not paid yet ({})", query.session_id, payment_status);
            Err(AppError::InvalidRequest("Payment not paid".to_string()))
        }
    }
}

/// GET /payments?email=
#[utoipa::path(get, path = "/payments", tag = "Payments", security(("bearer_auth" = [])),
    params(("email" = Option<String>, Query, description = "Must be the caller's own email")),
    responses((status = 200, description = "Payments, newest first"), (status = 403, description = "forbidden access")))]
pub async fn list_payments(
    state: web::Data<AppState>,
    caller: web::ReqData<Identity>,
    query: web::Query<PaymentListQuery>,
) -> AppResult<HttpResponse> {
    let is_admin = state.users.has_capability(&caller.email, Capability::Admin).await?;
    let payments = state
        .payments
        .list_payments(&caller.email, query.email.as_deref(), is_admin)
        .await?;
    Ok(HttpResponse::Ok().json(payments))
}

/// GET /my-participated-contests
#[utoipa::path(get, path = "/my-participated-contests", tag = "Payments", security(("bearer_auth" = [])),
    responses((status = 200, description = "Paid contests with deadline and submission flag")))]
pub async fn my_participated_contests(
    state: web::Data<AppState>,
    caller: web::ReqData<Identity>,
) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.payments.participated_contests(&caller.email).await?))
}
