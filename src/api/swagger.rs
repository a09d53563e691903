use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Contest Hub API",
        version = "1.0.0",
        description = "Contest hosting platform: creators propose contests, admins moderate them, participants pay to enter and submit entries, creators declare winners.\n\n**Authentication:** identity-provider JWT sent as `Authorization: Bearer <token>`.",
        contact(name = "Contest Hub Team")
    ),
    paths(
        // Health & Metrics
        crate::api::health::root,
        crate::api::health::health_check,
        crate::api::metrics::get_metrics,

        // Users
        crate::api::users::register,
        crate::api::users::list_users,
        crate::api::users::get_role,
        crate::api::users::set_role,
        crate::api::users::get_profile,
        crate::api::users::update_profile,

        // Contests
        crate::api::contests::list_contests,
        crate::api::contests::popular,
        crate::api::contests::get_contest,
        crate::api::contests::create_contest,
        crate::api::contests::set_approval,
        crate::api::contests::creator_edit,
        crate::api::contests::delete_contest,
        crate::api::contests::recount_participants,

        // Payments
        crate::api::payments::create_checkout_session,
        crate::api::payments::payment_success,
        crate::api::payments::list_payments,
        crate::api::payments::my_participated_contests,

        // Creators
        crate::api::creators::list_applications,
        crate::api::creators::apply,
        crate::api::creators::review,

        // Submissions
        crate::api::submissions::submit,
        crate::api::submissions::list_for_contest,
        crate::api::submissions::declare_winner,
        crate::api::submissions::my_wins,
    ),
    components(
        schemas(
            crate::api::health::HealthResponse,
            crate::api::metrics::MetricsResponse,
            crate::models::RegisterUserRequest,
            crate::models::ProfileUpdate,
            crate::models::RoleUpdateRequest,
            crate::models::UserRole,
            crate::models::CreateContestRequest,
            crate::models::ContestEdit,
            crate::models::ApprovalRequest,
            crate::models::ApprovalStatus,
            crate::models::ContestStatus,
            crate::models::CheckoutRequest,
            crate::models::CheckoutResponse,
            crate::models::SubmitEntryRequest,
            crate::models::SubmissionStatus,
            crate::models::CreatorApplicationRequest,
            crate::models::ReviewApplicationRequest,
            crate::models::ApplicationStatus,
        )
    ),
    tags(
        (name = "Health", description = "Liveness, database health and Prometheus counters."),
        (name = "Users", description = "Registration, roles and profiles."),
        (name = "Contests", description = "Contest lifecycle: creation, moderation, creator edits and deletion."),
        (name = "Payments", description = "Checkout sessions and idempotent payment reconciliation."),
        (name = "Creators", description = "Applications to become a contest creator."),
        (name = "Submissions", description = "Entries and winner declaration."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Identity-provider ID token"))
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_route_group() {
        let doc = ApiDoc::openapi();
        for path in ["/payment-success", "/contests/{id}", "/submissions/declare-winner/{submissionId}"] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
