use actix_web::HttpResponse;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

static REQUEST_COUNT: AtomicU64 = AtomicU64::new(0);
static ERROR_COUNT: AtomicU64 = AtomicU64::new(0);
static PAYMENTS_RECONCILED: AtomicU64 = AtomicU64::new(0);
static WINNERS_DECLARED: AtomicU64 = AtomicU64::new(0);

pub fn increment_request_count() {
    REQUEST_COUNT.fetch_add(1, Ordering::Relaxed);
}

pub fn increment_error_count() {
    ERROR_COUNT.fetch_add(1, Ordering::Relaxed);
}

/// Counts first-time reconciliations only, replays are not counted
pub fn increment_payments_reconciled() {
    PAYMENTS_RECONCILED.fetch_add(1, Ordering::Relaxed);
}

pub fn increment_winners_declared() {
    WINNERS_DECLARED.fetch_add(1, Ordering::Relaxed);
}

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct MetricsResponse {
    pub http_requests_total: u64,
    pub http_errors_total: u64,
    pub payments_reconciled_total: u64,
    pub winners_declared_total: u64,
}

impl MetricsResponse {
    fn snapshot() -> Self {
        Self {
            http_requests_total: REQUEST_COUNT.load(Ordering::Relaxed),
            http_errors_total: ERROR_COUNT.load(Ordering::Relaxed),
            payments_reconciled_total: PAYMENTS_RECONCILED.load(Ordering::Relaxed),
            winners_declared_total: WINNERS_DECLARED.load(Ordering::Relaxed),
        }
    }

    fn to_prometheus(&self) -> String {
        let counters = [
            ("http_requests_total", "Total number of HTTP requests", self.http_requests_total),
            ("http_errors_total", "Total number of HTTP errors", self.http_errors_total),
            (
                "payments_reconciled_total",
                "Payments recorded from checkout sessions",
                self.payments_reconciled_total,
            ),
            ("winners_declared_total", "Contest winners declared", self.winners_declared_total),
        ];

        counters
            .iter()
            .map(|(name, help, value)| {
                format!("# HELP {name} {help}\n# TYPE {name} counter\n{name} {value}\n")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[utoipa::path(
    get,
    path = "/metrics",
    tag = "Health",
    responses(
        (status = 200, description = "Prometheus counters", body = String, content_type = "text/plain")
    )
)]
pub async fn get_metrics() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(MetricsResponse::snapshot().to_prometheus())
}
