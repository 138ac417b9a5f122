use serde::Deserialize;
use storage::{
    error::StorageError,
    models::{NewStudent, Student},
    repository::DatathonStore,
};
use utoipa::ToSchema;

use crate::error::{WebError, WebResult};

pub const USER_CREATED: &str = "user.created";

/// Envelope of an identity-provider event.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ClerkEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[schema(value_type = Object)]
    pub data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct ClerkUser {
    pub id: String,
    #[serde(default)]
    pub email_addresses: Vec<ClerkEmailAddress>,
    pub primary_email_address_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ClerkEmailAddress {
    pub id: String,
    pub email_address: String,
}

impl ClerkUser {
    /// The address flagged primary, else the first one listed.
    pub fn primary_email(&self) -> Option<&str> {
        let primary = self.primary_email_address_id.as_deref().and_then(|id| {
            self.email_addresses
                .iter()
                .find(|address| address.id == id)
        });

        primary
            .or_else(|| self.email_addresses.first())
            .map(|address| address.email_address.as_str())
    }

    fn into_new_student(self) -> WebResult<NewStudent> {
        let email = self
            .primary_email()
            .ok_or_else(|| WebError::BadRequest("User has no email address".to_string()))?
            .to_string();

        Ok(NewStudent {
            external_user_id: self.id,
            email,
            first_name: self.first_name.unwrap_or_default(),
            last_name: self.last_name.unwrap_or_default(),
        })
    }
}

/// Outcome of handling one delivery.
#[derive(Debug)]
pub enum WebhookOutcome {
    Provisioned(Student),
    AlreadyProvisioned(Student),
    Ignored(String),
}

pub async fn handle_event(store: &dyn DatathonStore, event: ClerkEvent) -> WebResult<WebhookOutcome> {
    if event.event_type != USER_CREATED {
        tracing::info!("Ignoring webhook event {}", event.event_type);
        return Ok(WebhookOutcome::Ignored(event.event_type));
    }

    let user: ClerkUser = serde_json::from_value(event.data)
        .map_err(|e| WebError::BadRequest(format!("Malformed user payload: {}", e)))?;

    provision_student(store, user).await
}

/// Create the student for a new identity-provider user. Redelivery of the
/// same event resolves to the existing row.
pub async fn provision_student(
    store: &dyn DatathonStore,
    user: ClerkUser,
) -> WebResult<WebhookOutcome> {
    if let Some(existing) = store.find_student_by_external_id(&user.id).await? {
        return Ok(WebhookOutcome::AlreadyProvisioned(existing));
    }

    let new_student = user.into_new_student()?;

    match store.create_student(&new_student).await {
        Ok(student) => {
            tracing::info!(
                "Provisioned student {} for user {}",
                student.id,
                student.external_user_id
            );
            Ok(WebhookOutcome::Provisioned(student))
        }
        // a concurrent delivery won the insert
        Err(StorageError::ConstraintViolation(_)) => store
            .find_student_by_external_id(&new_student.external_user_id)
            .await?
            .map(WebhookOutcome::AlreadyProvisioned)
            .ok_or_else(|| {
                WebError::InternalServerError(format!(
                    "Student for user {} conflicted but cannot be found",
                    new_student.external_user_id
                ))
            }),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use storage::repository::InMemoryStore;

    fn user_created(user_id: &str) -> ClerkEvent {
        serde_json::from_value(json!({
            "object": "event",
            "type": "user.created",
            "data": {
                "id": user_id,
                "first_name": "Grace",
                "last_name": null,
                "primary_email_address_id": "idn_2",
                "email_addresses": [
                    { "id": "idn_1", "email_address": "old@example.com" },
                    { "id": "idn_2", "email_address": "grace@example.com" }
                ]
            }
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_user_created_provisions_student() {
        let store = InMemoryStore::new();

        let outcome = handle_event(&store, user_created("user_grace")).await.unwrap();
        let WebhookOutcome::Provisioned(student) = outcome else {
            panic!("expected a new student, got {:?}", outcome);
        };
        assert_eq!(student.external_user_id, "user_grace");
        assert_eq!(student.email, "grace@example.com");
        assert_eq!(student.first_name, "Grace");
        assert_eq!(student.last_name, "");
        assert_eq!(student.role, None);
        assert_eq!(student.team_id, None);
    }

    #[tokio::test]
    async fn test_redelivery_does_not_duplicate() {
        let store = InMemoryStore::new();

        let first = handle_event(&store, user_created("user_twice")).await.unwrap();
        let second = handle_event(&store, user_created("user_twice")).await.unwrap();

        let (WebhookOutcome::Provisioned(a), WebhookOutcome::AlreadyProvisioned(b)) =
            (first, second)
        else {
            panic!("expected provisioned then already provisioned");
        };
        assert_eq!(a.id, b.id);
    }

    #[tokio::test]
    async fn test_other_events_are_ignored() {
        let store = InMemoryStore::new();
        let event: ClerkEvent = serde_json::from_value(json!({
            "type": "user.deleted",
            "data": { "id": "user_gone", "deleted": true }
        }))
        .unwrap();

        let outcome = handle_event(&store, event).await.unwrap();
        assert!(matches!(outcome, WebhookOutcome::Ignored(ref t) if t == "user.deleted"));
        assert!(store
            .find_student_by_external_id("user_gone")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_user_without_email_is_rejected() {
        let store = InMemoryStore::new();
        let event: ClerkEvent = serde_json::from_value(json!({
            "type": "user.created",
            "data": { "id": "user_noemail", "email_addresses": [] }
        }))
        .unwrap();

        let result = handle_event(&store, event).await;
        assert!(matches!(result, Err(WebError::BadRequest(_))));
    }

    #[test]
    fn test_primary_email_falls_back_to_first() {
        let user = ClerkUser {
            id: "user_x".to_string(),
            email_addresses: vec![ClerkEmailAddress {
                id: "idn_a".to_string(),
                email_address: "a@example.com".to_string(),
            }],
            primary_email_address_id: Some("idn_missing".to_string()),
            first_name: None,
            last_name: None,
        };
        assert_eq!(user.primary_email(), Some("a@example.com"));
    }
}
