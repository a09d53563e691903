use std::sync::Arc;

use crate::config::Config;
use crate::database::Storage;
use crate::services::{
    CheckoutSettings, ContestService, IdentityVerifier, PaymentProvider, PaymentService,
    SubmissionService, UserService,
};

/// Everything a handler needs, shared across workers through `web::Data`
#[derive(Clone)]
pub struct AppState {
    pub users: UserService,
    pub contests: ContestService,
    pub payments: PaymentService,
    pub submissions: SubmissionService,
    pub identity: Arc<dyn IdentityVerifier>,
}

impl AppState {
    pub fn new(
        config: &Config,
        storage: Storage,
        provider: Arc<dyn PaymentProvider>,
        identity: Arc<dyn IdentityVerifier>,
    ) -> Self {
        let settings = CheckoutSettings {
            currency: config.stripe.currency.clone(),
            success_url: config.success_url(),
            cancel_url: config.cancel_url(),
        };

        Self {
            users: UserService::new(storage.clone()),
            contests: ContestService::new(storage.clone()),
            payments: PaymentService::new(storage.clone(), provider, settings),
            submissions: SubmissionService::new(storage),
            identity,
        }
    }
}
