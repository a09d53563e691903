use futures::future::try_join_all;
use std::collections::HashMap;
use std::sync::Arc;

use crate::api::metrics;
use crate::database::{new_id, StoreError, Storage};
use crate::models::{CheckoutRequest, ParticipatedContest, Payment};
use crate::services::payment_provider::{CheckoutSessionRequest, PaymentProvider};
use crate::services::tracking::generate_tracking_id;
use crate::utils::{now_millis, AppError, AppResult};

/// Checkout parameters that come from configuration rather than the request
#[derive(Debug, Clone)]
pub struct CheckoutSettings {
    pub currency: String,
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Debug)]
pub enum ReconcileOutcome {
    /// First reconciliation of this transaction: payment stored, participant counted
    Recorded(Payment),
    /// The transaction was reconciled before; nothing was written
    AlreadyProcessed(Payment),
    /// The provider does not report the session as paid; nothing was written
    NotPaid { payment_status: String },
}

/// Converts a decimal price into minor units (cents), rejecting non-positive amounts
pub fn to_minor_units(price: f64) -> AppResult<i64> {
    if !price.is_finite() || price <= 0.0 {
        return Err(AppError::InvalidRequest("Invalid price".to_string()));
    }
    Ok((price * 100.0).round() as i64)
}

#[derive(Clone)]
pub struct PaymentService {
    storage: Storage,
    provider: Arc<dyn PaymentProvider>,
    settings: CheckoutSettings,
}

impl PaymentService {
    pub fn new(storage: Storage, provider: Arc<dyn PaymentProvider>, settings: CheckoutSettings) -> Self {
        Self {
            storage,
            provider,
            settings,
        }
    }

    /// Opens a provider checkout session for a contest entry fee.
    ///
    /// The amount and product name come from the stored contest. The client's
    /// price is still validated, but a stale or tampered value is never charged.
    pub async fn create_checkout(&self, customer_email: &str, request: &CheckoutRequest) -> AppResult<String> {
        to_minor_units(request.price)?;
        if request.contest_id.trim().is_empty() {
            return Err(AppError::InvalidRequest("Missing required fields".to_string()));
        }
        let contest = self
            .storage
            .contests
            .find_by_id(&request.contest_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Contest not found".to_string()))?;
        let unit_amount = to_minor_units(contest.price)?;

        if (request.price - contest.price).abs() > f64::EPSILON {
            log::warn!(
                "⚠️  Checkout for {} sent price {} but contest costs {}",
                contest.id,
                request.price,
                contest.price
            );
        }

        let mut metadata = HashMap::new();
        metadata.insert("contestId".to_string(), contest.id.clone());
        metadata.insert("contestName".to_string(), contest.name.clone());

        self.provider
            .create_checkout_session(&CheckoutSessionRequest {
                product_name: contest.name,
                unit_amount,
                currency: self.settings.currency.clone(),
                customer_email: customer_email.to_string(),
                metadata,
                success_url: self.settings.success_url.clone(),
                cancel_url: self.settings.cancel_url.clone(),
            })
            .await
    }

    /// Turns a checkout session outcome into a stored payment, at most once per
    /// provider transaction.
    ///
    /// The payment write happens before the participant increment, and a failed
    /// increment never fails the reconciliation: the payment record is authoritative.
    pub async fn reconcile(&self, session_id: &str) -> AppResult<ReconcileOutcome> {
        let session = self.provider.retrieve_session(session_id).await?;

        if let Some(transaction_id) = session.payment_intent.as_deref() {
            if let Some(existing) = self.storage.payments.find_by_transaction(transaction_id).await? {
                log::info!(
                    "🔁 Transaction {} already reconciled ({})",
                    transaction_id,
                    existing.tracking_id
                );
                return Ok(ReconcileOutcome::AlreadyProcessed(existing));
            }
        }

        if !session.is_paid() {
            log::warn!(
                "⚠️  Session {} not paid (status: {})",
                session_id,
                session.payment_status
            );
            return Ok(ReconcileOutcome::NotPaid {
                payment_status: session.payment_status,
            });
        }

        let transaction_id = session.payment_intent.clone().ok_or_else(|| {
            AppError::Upstream(format!("Paid session {} has no transaction id", session_id))
        })?;

        let payment = Payment {
            id: new_id(),
            amount: session.amount_total.unwrap_or(0) as f64 / 100.0,
            currency: session.currency.clone().unwrap_or_else(|| self.settings.currency.clone()),
            user_email: session.customer_email.clone().unwrap_or_default(),
            contest_id: session.metadata.get("contestId").cloned().unwrap_or_default(),
            contest_name: session.metadata.get("contestName").cloned(),
            transaction_id,
            payment_status: session.payment_status.clone(),
            paid_at: now_millis(),
            tracking_id: generate_tracking_id(),
        };

        match self.storage.payments.insert(&payment).await {
            Ok(()) => {}
            Err(StoreError::Duplicate(_)) => {
                // A concurrent reconcile of the same transaction got there first
                return match self.storage.payments.find_by_transaction(&payment.transaction_id).await? {
                    Some(existing) => Ok(ReconcileOutcome::AlreadyProcessed(existing)),
                    None => Err(AppError::Database(format!(
                        "Duplicate payment {} could not be read back",
                        payment.transaction_id
                    ))),
                };
            }
            Err(e) => return Err(e.into()),
        }

        log::info!(
            "✅ Payment recorded: {} for contest {} ({})",
            payment.transaction_id,
            payment.contest_id,
            payment.tracking_id
        );
        metrics::increment_payments_reconciled();

        self.count_participant(&payment.contest_id).await;

        Ok(ReconcileOutcome::Recorded(payment))
    }

    /// Best-effort denormalized counter; drift is repaired by `recount_participants`
    async fn count_participant(&self, contest_id: &str) {
        if contest_id.is_empty() {
            log::warn!("⚠️  Payment without contest reference, participants not incremented");
            return;
        }

        match self.storage.contests.increment_participants(contest_id).await {
            Ok(outcome) if outcome.matched() => {}
            Ok(_) => log::warn!("⚠️  Contest {} not found, participants not incremented", contest_id),
            Err(e) => log::error!("❌ Failed to increment participants for {}: {}", contest_id, e),
        }
    }

    /// Lists payments. Asking for someone else's payments is forbidden; without an
    /// email filter only admins see every payment.
    pub async fn list_payments(&self, caller: &str, email: Option<&str>, caller_is_admin: bool) -> AppResult<Vec<Payment>> {
        match email {
            Some(email) if email != caller => Err(AppError::Forbidden("forbidden access".to_string())),
            Some(email) => Ok(self.storage.payments.list(Some(email)).await?),
            None if caller_is_admin => Ok(self.storage.payments.list(None).await?),
            None => Ok(self.storage.payments.list(Some(caller)).await?),
        }
    }

    /// Every contest the caller paid for, with its deadline and whether an entry was
    /// submitted. A missing contest yields a null deadline instead of an error.
    pub async fn participated_contests(&self, email: &str) -> AppResult<Vec<ParticipatedContest>> {
        let payments = self.storage.payments.list(Some(email)).await?;

        let entries = payments.into_iter().map(|payment| async move {
            let deadline = match self.storage.contests.find_by_id(&payment.contest_id).await {
                Ok(contest) => contest.and_then(|c| c.deadline),
                Err(e) => {
                    log::warn!("⚠️  Contest lookup failed for {}: {}", payment.contest_id, e);
                    None
                }
            };
            let is_submitted = self
                .storage
                .submissions
                .find_by_contest_and_user(&payment.contest_id, email)
                .await?
                .is_some();

            Ok::<_, AppError>(ParticipatedContest {
                payment,
                deadline,
                is_submitted,
            })
        });

        try_join_all(entries).await
    }

    /// Rebuilds the participant counter from the stored payments
    pub async fn recount_participants(&self, contest_id: &str) -> AppResult<i64> {
        if self.storage.contests.find_by_id(contest_id).await?.is_none() {
            return Err(AppError::NotFound("Contest not found".to_string()));
        }

        let paid = self.storage.payments.count_paid_for_contest(contest_id).await? as i64;
        let outcome = self.storage.contests.set_participants(contest_id, paid).await?;
        if outcome.modified_count > 0 {
            log::info!("🔧 Participants for contest {} repaired to {}", contest_id, paid);
        }

        Ok(paid)
    }
}
