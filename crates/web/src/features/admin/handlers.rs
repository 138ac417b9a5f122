use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use storage::{
    dto::{
        admin::{ApplicationStats, GroupedApplications},
        application::UpdateStatusRequest,
        common::ApiResponse,
    },
    models::{Application, ApplicationKind},
};
use uuid::Uuid;

use crate::error::WebError;
use crate::extract::{AppJson, AppPath};
use crate::state::AppState;

use super::services;

#[utoipa::path(
    get,
    path = "/api/admin/stats",
    responses(
        (status = 200, description = "Application counts per type", body = ApiResponse<ApplicationStats>),
        (status = 403, description = "Caller is not an admin")
    ),
    tag = "admin",
    security(("user_id" = []))
)]
pub async fn get_stats(State(state): State<AppState>) -> Result<Response, WebError> {
    let stats = services::application_stats(state.store()).await?;

    Ok(Json(ApiResponse::ok(stats)).into_response())
}

#[utoipa::path(
    get,
    path = "/api/admin/applications/{application_type}",
    params(
        ("application_type" = String, Path, description = "participant, mentor or judge")
    ),
    responses(
        (status = 200, description = "Applications grouped by status", body = ApiResponse<GroupedApplications>),
        (status = 400, description = "Unknown application type"),
        (status = 403, description = "Caller is not an admin")
    ),
    tag = "admin",
    security(("user_id" = []))
)]
pub async fn list_applications(
    State(state): State<AppState>,
    AppPath(application_type): AppPath<String>,
) -> Result<Response, WebError> {
    let kind: ApplicationKind = application_type.parse()?;

    let grouped = services::list_by_status(state.store(), kind).await?;

    Ok(Json(ApiResponse::ok(grouped)).into_response())
}

#[utoipa::path(
    put,
    path = "/api/admin/applications/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Application ID")
    ),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status recorded", body = ApiResponse<Application>),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Application not found")
    ),
    tag = "admin",
    security(("user_id" = []))
)]
pub async fn update_status(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateStatusRequest>,
) -> Result<Response, WebError> {
    let application = services::set_status(state.store(), id, payload.status).await?;

    Ok(Json(ApiResponse::ok(application)).into_response())
}
