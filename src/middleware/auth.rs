use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    web, Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;

use crate::services::auth_service::bearer_token;
use crate::state::AppState;
use crate::utils::AppError;

/// Verifies the bearer token and stores the caller's `Identity` in the request
/// extensions, where handlers pick it up through `web::ReqData<Identity>`.
///
/// Missing or malformed header: 401. Token that fails verification: 403.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let header = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let verifier = req
            .app_data::<web::Data<AppState>>()
            .map(|state| state.identity.clone());

        Box::pin(async move {
            let token = bearer_token(header.as_deref())?;
            let verifier = verifier
                .ok_or_else(|| AppError::Config("identity verifier is not registered".to_string()))?;

            let identity = verifier.verify(token).await.map_err(|e| {
                log::warn!("🔒 Rejected token on {} {}", req.method(), req.path());
                e
            })?;

            req.extensions_mut().insert(identity);
            service.call(req).await
        })
    }
}
