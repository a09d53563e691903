pub mod auth_service;
pub mod contest_service;
pub mod payment_provider;
pub mod payment_service;
pub mod submission_service;
pub mod tracking;
pub mod user_service;

pub use auth_service::{Identity, IdentityVerifier, JwtVerifier};
pub use contest_service::ContestService;
pub use payment_provider::{PaymentProvider, StripeClient};
pub use payment_service::{CheckoutSettings, PaymentService, ReconcileOutcome};
pub use submission_service::SubmissionService;
pub use user_service::{Registration, UserService};
