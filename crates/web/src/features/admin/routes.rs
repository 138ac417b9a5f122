use axum::{
    Router, middleware,
    routing::{get, put},
};

use super::handlers::{get_stats, list_applications, update_status};
use crate::features::ratings;
use crate::middleware::auth::require_admin;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    // one segment name for both routes; `:id` is the application type in the listing
    Router::new()
        .route("/stats", get(get_stats))
        .route("/applications/:id", get(list_applications))
        .route("/applications/:id/status", put(update_status))
        .nest("/ratings", ratings::routes::routes())
        .route_layer(middleware::from_fn_with_state(state, require_admin))
}
