use axum::{
    Router,
    routing::{get, post},
};

use super::handlers::{get_latest_ratings, get_rating, rate_application};
use crate::state::AppState;

/// Mounted under the admin router, which applies the admin gate.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/latest", post(get_latest_ratings))
        .route("/:application_id", get(get_rating).post(rate_application))
}
