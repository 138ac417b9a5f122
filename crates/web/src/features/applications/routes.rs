use axum::{
    Router,
    routing::{get, post, put},
};

use super::handlers::{get_mine, get_status, submit, update_step, withdraw};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_mine).delete(withdraw))
        .route("/me/status", get(get_status))
        .route("/me/submit", post(submit))
        .route("/:id/steps/:step", put(update_step))
}
