use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::models::{ProfileUpdate, RegisterUserRequest, RoleUpdateRequest};
use crate::services::{Identity, Registration};
use crate::state::AppState;
use crate::utils::AppResult;

/// POST /users - Registers the user on first sign-in (idempotent by email)
#[utoipa::path(
    post,
    path = "/users",
    tag = "Users",
    request_body = RegisterUserRequest,
    responses((status = 200, description = "Inserted id, or a note that the user already exists"))
)]
pub async fn register(state: web::Data<AppState>, body: web::Json<RegisterUserRequest>) -> AppResult<HttpResponse> {
    match state.users.register(body.into_inner()).await? {
        Registration::Created(outcome) => Ok(HttpResponse::Ok().json(outcome)),
        Registration::Existing => Ok(HttpResponse::Ok().json(json!({ "message": "user already exist" }))),
    }
}

/// GET /users
#[utoipa::path(get, path = "/users", tag = "Users", security(("bearer_auth" = [])),
    responses((status = 200, description = "All users")))]
pub async fn list_users(state: web::Data<AppState>, _caller: web::ReqData<Identity>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.users.list().await?))
}

/// GET /users/{email}/role - Unknown emails read as "user"
#[utoipa::path(get, path = "/users/{email}/role", tag = "Users", security(("bearer_auth" = [])),
    params(("email" = String, Path, description = "User email")),
    responses((status = 200, description = "The stored role")))]
pub async fn get_role(
    state: web::Data<AppState>,
    _caller: web::ReqData<Identity>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let role = state.users.role_of(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "role": role })))
}

/// PATCH /users/{id}/role - Admin only
#[utoipa::path(patch, path = "/users/{id}/role", tag = "Users", security(("bearer_auth" = [])),
    request_body = RoleUpdateRequest,
    responses((status = 200, description = "Update result"), (status = 403, description = "Caller is not an admin")))]
pub async fn set_role(
    state: web::Data<AppState>,
    caller: web::ReqData<Identity>,
    path: web::Path<String>,
    body: web::Json<RoleUpdateRequest>,
) -> AppResult<HttpResponse> {
    state.users.require_admin(&caller.email).await?;
    let outcome = state.users.set_role(&path.into_inner(), body.role).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

/// GET /users/profile
#[utoipa::path(get, path = "/users/profile", tag = "Users", security(("bearer_auth" = [])),
    responses((status = 200, description = "The caller's user document"), (status = 404, description = "Not registered")))]
pub async fn get_profile(state: web::Data<AppState>, caller: web::ReqData<Identity>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.users.profile(&caller.email).await?))
}

/// PATCH /users/profile
#[utoipa::path(patch, path = "/users/profile", tag = "Users", security(("bearer_auth" = [])),
    request_body = ProfileUpdate,
    responses((status = 200, description = "Update result")))]
pub async fn update_profile(
    state: web::Data<AppState>,
    caller: web::ReqData<Identity>,
    body: web::Json<ProfileUpdate>,
) -> AppResult<HttpResponse> {
    let outcome = state.users.update_profile(&caller.email, &body).await?;
    Ok(HttpResponse::Ok().json(outcome))
}
