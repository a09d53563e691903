use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::models::{ApprovalRequest, ContestEdit, ContestFilter, CreateContestRequest, InsertOutcome};
use crate::services::Identity;
use crate::state::AppState;
use crate::utils::AppResult;

/// GET /contests?email=&status=
#[utoipa::path(get, path = "/contests", tag = "Contests",
    params(
        ("email" = Option<String>, Query, description = "Creator email"),
        ("status" = Option<String>, Query, description = "Approval status")
    ),
    responses((status = 200, description = "Contests, newest first")))]
pub async fn list_contests(state: web::Data<AppState>, query: web::Query<ContestFilter>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.contests.list(&query).await?))
}

/// GET /contests/popular - Top 5 by participants
#[utoipa::path(get, path = "/contests/popular", tag = "Contests",
    responses((status = 200, description = "Most joined contests")))]
pub async fn popular(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.contests.popular().await?))
}

/// GET /contests/{id} and GET /contest-details/{id}
#[utoipa::path(get, path = "/contests/{id}", tag = "Contests",
    responses((status = 200, description = "The contest"), (status = 404, description = "Contest not found")))]
pub async fn get_contest(state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.contests.get(&path.into_inner()).await?))
}

/// POST /contests - creatorEmail is always the authenticated caller
#[utoipa::path(post, path = "/contests", tag = "Contests", security(("bearer_auth" = [])),
    request_body = CreateContestRequest,
    responses((status = 200, description = "Inserted id")))]
pub async fn create_contest(
    state: web::Data<AppState>,
    caller: web::ReqData<Identity>,
    body: web::Json<CreateContestRequest>,
) -> AppResult<HttpResponse> {
    let contest = state.contests.create(&caller.email, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(InsertOutcome::new(contest.id)))
}

/// PATCH /contests/{id} - Admin approve/reject
#[utoipa::path(patch, path = "/contests/{id}", tag = "Contests", security(("bearer_auth" = [])),
    request_body = ApprovalRequest,
    responses(
        (status = 200, description = "Update result"),
        (status = 400, description = "Transition not allowed"),
        (status = 403, description = "Caller is not an admin")
    ))]
pub async fn set_approval(
    state: web::Data<AppState>,
    caller: web::ReqData<Identity>,
    path: web::Path<String>,
    body: web::Json<ApprovalRequest>,
) -> AppResult<HttpResponse> {
    state.users.require_admin(&caller.email).await?;
    let outcome = state.contests.set_approval(&path.into_inner(), body.status).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

/// PATCH /creator/contests/{id} - Creator only, while still pending
#[utoipa::path(patch, path = "/creator/contests/{id}", tag = "Contests", security(("bearer_auth" = [])),
    request_body = ContestEdit,
    responses((status = 200, description = "Update result"), (status = 403, description = "You cannot edit this contest")))]
pub async fn creator_edit(
    state: web::Data<AppState>,
    caller: web::ReqData<Identity>,
    path: web::Path<String>,
    body: web::Json<ContestEdit>,
) -> AppResult<HttpResponse> {
    let outcome = state
        .contests
        .edit_pending(&path.into_inner(), &caller.email, &body)
        .await?;
    Ok(HttpResponse::Ok().json(outcome))
}

/// DELETE /contests/{id}
#[utoipa::path(delete, path = "/contests/{id}", tag = "Contests", security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Delete result"),
        (status = 400, description = "Only pending contests can be deleted"),
        (status = 403, description = "Not the creator"),
        (status = 404, description = "Contest not found")
    ))]
pub async fn delete_contest(
    state: web::Data<AppState>,
    caller: web::ReqData<Identity>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let deleted = state.contests.delete_pending(&path.into_inner(), &caller.email).await?;
    Ok(HttpResponse::Ok().json(json!({ "acknowledged": true, "deletedCount": deleted })))
}

/// POST /contests/{id}/recount-participants - Admin; rebuilt from payments
#[utoipa::path(post, path = "/contests/{id}/recount-participants", tag = "Contests", security(("bearer_auth" = [])),
    responses((status = 200, description = "New participant count")))]
pub async fn recount_participants(
    state: web::Data<AppState>,
    caller: web::ReqData<Identity>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    state.users.require_admin(&caller.email).await?;
    let participants = state.payments.recount_participants(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "participants": participants })))
}
