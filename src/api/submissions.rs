use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::models::SubmitEntryRequest;
use crate::services::Identity;
use crate::state::AppState;
use crate::utils::AppResult;

/// POST /submissions
#[utoipa::path(post, path = "/submissions", tag = "Submissions", security(("bearer_auth" = [])),
    request_body = SubmitEntryRequest,
    responses(
        (status = 200, description = "Submission stored"),
        (status = 400, description = "Missing fields or already submitted"),
        (status = 404, description = "User not found")
    ))]
pub async fn submit(
    state: web::Data<AppState>,
    caller: web::ReqData<Identity>,
    body: web::Json<SubmitEntryRequest>,
) -> AppResult<HttpResponse> {
    let submission = state.submissions.submit(&caller.email, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Submission successful",
        "insertedId": submission.id,
    })))
}

/// GET /submissions/contest/{contestId} - Contest creator only
#[utoipa::path(get, path = "/submissions/contest/{contestId}", tag = "Submissions", security(("bearer_auth" = [])),
    params(("contestId" = String, Path, description = "Contest id")),
    responses((status = 200, description = "Entries, newest first"), (status = 404, description = "Contest not found")))]
pub async fn list_for_contest(
    state: web::Data<AppState>,
    caller: web::ReqData<Identity>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let submissions = state
        .submissions
        .list_for_contest(&path.into_inner(), &caller.email)
        .await?;
    Ok(HttpResponse::Ok().json(submissions))
}

/// PATCH /submissions/declare-winner/{submissionId}
#[utoipa::path(patch, path = "/submissions/declare-winner/{submissionId}", tag = "Submissions",
    security(("bearer_auth" = [])),
    params(("submissionId" = String, Path, description = "Winning submission")),
    responses(
        (status = 200, description = "Winner declared"),
        (status = 400, description = "Winner already declared for this contest"),
        (status = 404, description = "Submission or contest not found")
    ))]
pub async fn declare_winner(
    state: web::Data<AppState>,
    caller: web::ReqData<Identity>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let submission = state
        .submissions
        .declare_winner(&path.into_inner(), &caller.email)
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "submission": submission })))
}

/// GET /submissions/my-wins/{email}
#[utoipa::path(get, path = "/submissions/my-wins/{email}", tag = "Submissions", security(("bearer_auth" = [])),
    params(("email" = String, Path, description = "Winner email")),
    responses((status = 200, description = "Winning submissions")))]
pub async fn my_wins(
    state: web::Data<AppState>,
    _caller: web::ReqData<Identity>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.submissions.wins(&path.into_inner()).await?))
}
