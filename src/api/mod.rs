pub mod contests;
pub mod creators;
pub mod health;
pub mod metrics;
pub mod payments;
pub mod submissions;
pub mod swagger;
pub mod users;

use actix_web::{guard, web};

use crate::middleware::AuthMiddleware;
use crate::utils::AppError;

/// Registers every route. Public and authenticated handlers that share a path are
/// split into method-guarded resources so only the latter go through `AuthMiddleware`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _| AppError::InvalidRequest(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _| AppError::InvalidRequest(err.to_string()).into()),
    )
    .route("/", web::get().to(health::root))
    .route("/health", web::get().to(health::health_check))
    .route("/metrics", web::get().to(metrics::get_metrics))
    // ==================== USERS ====================
    .service(
        web::resource("/users")
            .guard(guard::Post())
            .route(web::post().to(users::register)),
    )
    .service(
        web::resource("/users")
            .wrap(AuthMiddleware)
            .route(web::get().to(users::list_users)),
    )
    .service(
        web::resource("/users/profile")
            .wrap(AuthMiddleware)
            .route(web::get().to(users::get_profile))
            .route(web::patch().to(users::update_profile)),
    )
    .service(
        web::resource("/users/{key}/role")
            .wrap(AuthMiddleware)
            .route(web::get().to(users::get_role))
            .route(web::patch().to(users::set_role)),
    )
    // ==================== CONTESTS ====================
    .service(
        web::resource("/contests")
            .guard(guard::Get())
            .route(web::get().to(contests::list_contests)),
    )
    .service(
        web::resource("/contests")
            .wrap(AuthMiddleware)
            .route(web::post().to(contests::create_contest)),
    )
    // Must precede /contests/{id}
    .route("/contests/popular", web::get().to(contests::popular))
    .service(
        web::resource("/contests/{id}")
            .guard(guard::Get())
            .route(web::get().to(contests::get_contest)),
    )
    .service(
        web::resource("/contests/{id}")
            .wrap(AuthMiddleware)
            .route(web::patch().to(contests::set_approval))
            .route(web::delete().to(contests::delete_contest)),
    )
    .service(
        web::resource("/contests/{id}/recount-participants")
            .wrap(AuthMiddleware)
            .route(web::post().to(contests::recount_participants)),
    )
    .route("/contest-details/{id}", web::get().to(contests::get_contest))
    .service(
        web::resource("/creator/contests/{id}")
            .wrap(AuthMiddleware)
            .route(web::patch().to(contests::creator_edit)),
    )
    // ==================== PAYMENTS ====================
    .service(
        web::resource("/create-checkout-session")
            .wrap(AuthMiddleware)
            .route(web::post().to(payments::create_checkout_session)),
    )
    .route("/payment-success", web::patch().to(payments::payment_success))
    .service(
        web::resource("/payments")
            .wrap(AuthMiddleware)
            .route(web::get().to(payments::list_payments)),
    )
    .service(
        web::resource("/my-participated-contests")
            .wrap(AuthMiddleware)
            .route(web::get().to(payments::my_participated_contests)),
    )
    // ==================== CREATORS ====================
    .service(
        web::resource("/creators")
            .guard(guard::Get())
            .route(web::get().to(creators::list_applications)),
    )
    .service(
        web::resource("/creators")
            .wrap(AuthMiddleware)
            .route(web::post().to(creators::apply)),
    )
    .service(
        web::resource("/creators/{id}")
            .wrap(AuthMiddleware)
            .route(web::patch().to(creators::review)),
    )
    // ==================== SUBMISSIONS ====================
    .service(
        web::scope("/submissions")
            .wrap(AuthMiddleware)
            .route("", web::post().to(submissions::submit))
            .route("/contest/{contest_id}", web::get().to(submissions::list_for_contest))
            .route(
                "/declare-winner/{submission_id}",
                web::patch().to(submissions::declare_winner),
            )
            .route("/my-wins/{email}", web::get().to(submissions::my_wins)),
    );
}
