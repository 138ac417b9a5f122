use axum::{
    Extension, Json,
    extract::State,
    response::{IntoResponse, Response},
};
use storage::dto::rating::{LatestRatingsRequest, RateRequest, RatingResponse, RatingsResponse};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;
use crate::extract::{AppJson, AppPath};
use crate::middleware::auth::AdminUser;
use crate::state::AppState;

use super::services;

#[utoipa::path(
    post,
    path = "/api/admin/ratings/{application_id}",
    params(
        ("application_id" = Uuid, Path, description = "Application ID")
    ),
    request_body = RateRequest,
    responses(
        (status = 200, description = "Rating stored, replacing any previous one", body = RatingResponse),
        (status = 400, description = "Score or feedback out of bounds"),
        (status = 403, description = "Caller is not an admin")
    ),
    tag = "ratings",
    security(("user_id" = []))
)]
pub async fn rate_application(
    State(state): State<AppState>,
    Extension(AdminUser(admin)): Extension<AdminUser>,
    AppPath(application_id): AppPath<Uuid>,
    AppJson(payload): AppJson<RateRequest>,
) -> Result<Response, WebError> {
    payload.validate()?;

    let rating = services::rate(
        state.store(),
        application_id,
        payload.score,
        payload.feedback,
        admin.id,
    )
    .await?;

    Ok(Json(RatingResponse {
        rating: Some(rating),
    })
    .into_response())
}

#[utoipa::path(
    get,
    path = "/api/admin/ratings/{application_id}",
    params(
        ("application_id" = Uuid, Path, description = "Application ID")
    ),
    responses(
        (status = 200, description = "Latest rating, null when unrated", body = RatingResponse),
        (status = 403, description = "Caller is not an admin")
    ),
    tag = "ratings",
    security(("user_id" = []))
)]
pub async fn get_rating(
    State(state): State<AppState>,
    AppPath(application_id): AppPath<Uuid>,
) -> Result<Response, WebError> {
    let rating = services::latest_rating(state.store(), application_id).await?;

    Ok(Json(RatingResponse { rating }).into_response())
}

#[utoipa::path(
    post,
    path = "/api/admin/ratings/latest",
    request_body = LatestRatingsRequest,
    responses(
        (status = 200, description = "Latest rating per rated application", body = RatingsResponse),
        (status = 400, description = "No application ids given"),
        (status = 403, description = "Caller is not an admin")
    ),
    tag = "ratings",
    security(("user_id" = []))
)]
pub async fn get_latest_ratings(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LatestRatingsRequest>,
) -> Result<Response, WebError> {
    payload.validate()?;

    let ratings = services::latest_ratings(state.store(), &payload.application_ids).await?;

    Ok(Json(RatingsResponse { ratings }).into_response())
}
