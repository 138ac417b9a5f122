use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use storage::{
    dto::{
        common::ApiResponse,
        student::{SetRoleRequest, StudentProfile},
    },
    models::Student,
};

use crate::error::WebError;
use crate::extract::AppJson;
use crate::middleware::auth::CurrentStudent;
use crate::state::AppState;

use super::services;

#[utoipa::path(
    get,
    path = "/api/students/me",
    responses(
        (status = 200, description = "Caller's profile with its team", body = ApiResponse<StudentProfile>),
        (status = 401, description = "Missing caller identity"),
        (status = 404, description = "Caller has no student record")
    ),
    tag = "students"
)]
pub async fn get_me(
    State(state): State<AppState>,
    CurrentStudent(student): CurrentStudent,
) -> Result<Response, WebError> {
    let profile = services::get_profile(state.store(), student).await?;

    Ok(Json(ApiResponse::ok(profile)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/students/me/role",
    request_body = SetRoleRequest,
    responses(
        (status = 200, description = "Role set, draft application provisioned", body = ApiResponse<Student>),
        (status = 401, description = "Missing caller identity"),
        (status = 404, description = "Caller has no student record")
    ),
    tag = "students"
)]
pub async fn set_role(
    State(state): State<AppState>,
    CurrentStudent(student): CurrentStudent,
    AppJson(payload): AppJson<SetRoleRequest>,
) -> Result<Response, WebError> {
    let student = services::set_role(state.store(), student.id, payload.role).await?;

    Ok(Json(ApiResponse::ok(student)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/students/me/role/change",
    request_body = SetRoleRequest,
    responses(
        (status = 200, description = "Role changed", body = ApiResponse<Student>),
        (status = 401, description = "Missing caller identity"),
        (status = 403, description = "Application already left draft")
    ),
    tag = "students"
)]
pub async fn change_role(
    State(state): State<AppState>,
    CurrentStudent(student): CurrentStudent,
    AppJson(payload): AppJson<SetRoleRequest>,
) -> Result<Response, WebError> {
    let student = services::change_role(state.store(), student, payload.role).await?;

    Ok(Json(ApiResponse::ok(student)).into_response())
}
