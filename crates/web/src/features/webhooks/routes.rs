use axum::{Router, middleware, routing::post};

use super::handlers::clerk_webhook;
use crate::middleware::signature::verify_webhook_signature;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/clerk", post(clerk_webhook))
        .route_layer(middleware::from_fn_with_state(state, verify_webhook_signature))
}
