use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::error::WebError;
use crate::extract::AppJson;
use crate::state::AppState;

use super::services::{self, ClerkEvent, WebhookOutcome};

#[utoipa::path(
    post,
    path = "/api/webhooks/clerk",
    request_body = ClerkEvent,
    responses(
        (status = 200, description = "Event acknowledged"),
        (status = 400, description = "Malformed event payload"),
        (status = 401, description = "Missing or invalid signature"),
        (status = 503, description = "Webhook secret not configured")
    ),
    tag = "webhooks"
)]
pub async fn clerk_webhook(
    State(state): State<AppState>,
    AppJson(event): AppJson<ClerkEvent>,
) -> Result<Response, WebError> {
    let message = match services::handle_event(state.store(), event).await? {
        WebhookOutcome::Provisioned(student) => format!("Provisioned student {}", student.id),
        WebhookOutcome::AlreadyProvisioned(student) => {
            format!("Student {} already provisioned", student.id)
        }
        WebhookOutcome::Ignored(event_type) => format!("Ignored {}", event_type),
    };

    Ok(Json(json!({
        "success": true,
        "message": message
    }))
    .into_response())
}
