use axum::{
    Router,
    routing::{get, post},
};

use super::handlers::{change_role, get_me, set_role};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_me))
        .route("/me/role", post(set_role))
        .route("/me/role/change", post(change_role))
}
