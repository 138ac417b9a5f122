use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use storage::{
    dto::{
        application::HasApplicationResponse,
        common::{ApiResponse, SuccessResponse},
    },
    models::Application,
    services::form_steps::{FormValue, StepFields},
};
use uuid::Uuid;

use crate::error::WebError;
use crate::extract::{AppJson, AppPath};
use crate::middleware::auth::CurrentStudent;
use crate::state::AppState;

use super::services;

#[utoipa::path(
    get,
    path = "/api/applications/me/status",
    responses(
        (status = 200, description = "Whether the caller has an application and its status", body = HasApplicationResponse),
        (status = 401, description = "Missing caller identity")
    ),
    tag = "applications"
)]
pub async fn get_status(
    State(state): State<AppState>,
    CurrentStudent(student): CurrentStudent,
) -> Result<Response, WebError> {
    let response = match services::find_student_application(state.store(), student.id).await? {
        Some(application) => HasApplicationResponse::from(&application),
        None => HasApplicationResponse::none(),
    };

    Ok(Json(response).into_response())
}

#[utoipa::path(
    get,
    path = "/api/applications/me",
    responses(
        (status = 200, description = "Caller's current application", body = ApiResponse<Application>),
        (status = 401, description = "Missing caller identity"),
        (status = 404, description = "Caller has no application")
    ),
    tag = "applications"
)]
pub async fn get_mine(
    State(state): State<AppState>,
    CurrentStudent(student): CurrentStudent,
) -> Result<Response, WebError> {
    let application = services::find_student_application(state.store(), student.id)
        .await?
        .ok_or_else(|| WebError::NotFound("Application".to_string()))?;

    Ok(Json(ApiResponse::ok(application)).into_response())
}

#[utoipa::path(
    delete,
    path = "/api/applications/me",
    responses(
        (status = 200, description = "Applications withdrawn and role cleared", body = SuccessResponse),
        (status = 401, description = "Missing caller identity"),
        (status = 403, description = "Application has already been rated")
    ),
    tag = "applications"
)]
pub async fn withdraw(
    State(state): State<AppState>,
    CurrentStudent(student): CurrentStudent,
) -> Result<Response, WebError> {
    services::withdraw_application(state.store(), student.id).await?;

    Ok(Json(SuccessResponse::ok()).into_response())
}

#[utoipa::path(
    post,
    path = "/api/applications/me/submit",
    responses(
        (status = 200, description = "Application submitted", body = ApiResponse<Application>),
        (status = 401, description = "Missing caller identity"),
        (status = 404, description = "No application for the current role"),
        (status = 409, description = "Current role has no application")
    ),
    tag = "applications"
)]
pub async fn submit(
    State(state): State<AppState>,
    CurrentStudent(student): CurrentStudent,
) -> Result<Response, WebError> {
    let application = services::submit_application(state.store(), student.id).await?;

    Ok(Json(ApiResponse::ok(application)).into_response())
}

#[utoipa::path(
    put,
    path = "/api/applications/{id}/steps/{step}",
    params(
        ("id" = Uuid, Path, description = "Application ID"),
        ("step" = String, Path, description = "Form step, 1 to 3")
    ),
    request_body = std::collections::HashMap<String, FormValue>,
    responses(
        (status = 200, description = "Step merged into the application", body = ApiResponse<Application>),
        (status = 400, description = "Unknown step or invalid field value"),
        (status = 403, description = "Application belongs to another student"),
        (status = 404, description = "Application not found")
    ),
    tag = "applications"
)]
pub async fn update_step(
    State(state): State<AppState>,
    CurrentStudent(student): CurrentStudent,
    AppPath((id, step)): AppPath<(Uuid, String)>,
    AppJson(fields): AppJson<StepFields>,
) -> Result<Response, WebError> {
    let application =
        services::update_application_data(state.store(), student.id, id, &step, &fields).await?;

    Ok(Json(ApiResponse::ok(application)).into_response())
}
