use actix_web::{web, HttpResponse};

use crate::models::{CreatorApplicationRequest, CreatorListQuery, ReviewApplicationRequest};
use crate::services::Identity;
use crate::state::AppState;
use crate::utils::AppResult;

/// GET /creators?status=
#[utoipa::path(get, path = "/creators", tag = "Creators",
    params(("status" = Option<String>, Query, description = "pending | approved | rejected")),
    responses((status = 200, description = "Creator applications")))]
pub async fn list_applications(
    state: web::Data<AppState>,
    query: web::Query<CreatorListQuery>,
) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.users.creator_applications(query.status).await?))
}

/// POST /creators - Email always comes from the token
#[utoipa::path(post, path = "/creators", tag = "Creators", security(("bearer_auth" = [])),
    request_body = CreatorApplicationRequest,
    responses((status = 200, description = "Inserted id")))]
pub async fn apply(
    state: web::Data<AppState>,
    caller: web::ReqData<Identity>,
    body: web::Json<CreatorApplicationRequest>,
) -> AppResult<HttpResponse> {
    let outcome = state.users.apply_for_creator(&caller.email, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

/// PATCH /creators/{id} - Admin only; approval promotes the applicant
#[utoipa::path(patch, path = "/creators/{id}", tag = "Creators", security(("bearer_auth" = [])),
    request_body = ReviewApplicationRequest,
    responses((status = 200, description = "Update result"), (status = 400, description = "Already reviewed")))]
pub async fn review(
    state: web::Data<AppState>,
    caller: web::ReqData<Identity>,
    path: web::Path<String>,
    body: web::Json<ReviewApplicationRequest>,
) -> AppResult<HttpResponse> {
    state.users.require_admin(&caller.email).await?;
    let outcome = state.users.review_application(&path.into_inner(), body.status).await?;
    Ok(HttpResponse::Ok().json(outcome))
}
