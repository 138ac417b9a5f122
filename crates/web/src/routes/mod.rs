use axum::Router;

use crate::features::{admin, applications, students, webhooks};
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/api/students", students::routes::routes())
        .nest("/api/applications", applications::routes::routes())
        .nest("/api/admin", admin::routes::routes(state.clone()))
        .nest("/api/webhooks", webhooks::routes::routes(state.clone()))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use base64::prelude::*;
    use chrono::Utc;
    use hmac::{Hmac, Mac};
    use serde_json::{Value, json};
    use sha2::Sha256;
    use storage::{
        models::{ApplicationKind, Role},
        repository::{DatathonStore, InMemoryStore},
    };
    use tower::ServiceExt;

    use super::*;
    use crate::middleware::auth::{AdminEmails, USER_ID_HEADER};
    use crate::test_support::provision;

    const WEBHOOK_KEY: &[u8] = b"datathon-test-signing-key";

    fn app(store: &Arc<InMemoryStore>, webhook_secret: Option<String>) -> Router {
        let state = AppState::new(
            store.clone() as Arc<dyn DatathonStore>,
            AdminEmails::from_comma_separated("admin@example.com"),
            webhook_secret,
        );
        router(state)
    }

    fn request(method: &str, uri: &str, user: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header(USER_ID_HEADER, user);
        }
        match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_missing_identity_is_unauthorized() {
        let store = Arc::new(InMemoryStore::new());

        let response = app(&store, None)
            .oneshot(request("GET", "/api/students/me", None, None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = json_body(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Unauthorized");
    }

    #[tokio::test]
    async fn test_unprovisioned_caller_is_not_found() {
        let store = Arc::new(InMemoryStore::new());

        let response = app(&store, None)
            .oneshot(request("GET", "/api/students/me", Some("user_ghost"), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_role_selection_flow() {
        let store = Arc::new(InMemoryStore::new());
        let student = provision(&store, "user_jane", "Jane", "Doe").await;

        let response = app(&store, None)
            .oneshot(request(
                "POST",
                "/api/students/me/role",
                Some("user_jane"),
                Some(json!({ "role": "participant" })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["role"], "participant");

        let response = app(&store, None)
            .oneshot(request(
                "GET",
                "/api/applications/me/status",
                Some("user_jane"),
                None,
            ))
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["has_application"], true);
        assert_eq!(body["application_type"], "participant");
        assert_eq!(body["application_status"], "draft");

        let application = store
            .find_application_for_student(ApplicationKind::Participant, student.id)
            .await
            .unwrap()
            .unwrap();
        let response = app(&store, None)
            .oneshot(request(
                "PUT",
                &format!("/api/applications/{}/steps/1", application.id),
                Some("user_jane"),
                Some(json!({ "full_name": "Jane Doe", "gender": "female" })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["data"]["gender"], "female");
        assert_eq!(body["data"]["application_type"], "participant");

        let response = app(&store, None)
            .oneshot(request(
                "POST",
                "/api/applications/me/submit",
                Some("user_jane"),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app(&store, None)
            .oneshot(request(
                "POST",
                "/api/students/me/role/change",
                Some("user_jane"),
                Some(json!({ "role": "judge" })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_withdrawal_is_idempotent() {
        let store = Arc::new(InMemoryStore::new());
        provision(&store, "user_w", "Wren", "Withdraw").await;

        for _ in 0..2 {
            let response = app(&store, None)
                .oneshot(request("DELETE", "/api/applications/me", Some("user_w"), None))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(json_body(response).await, json!({ "success": true }));
        }
    }

    #[tokio::test]
    async fn test_admin_routes_require_allow_listed_email() {
        let store = Arc::new(InMemoryStore::new());
        provision(&store, "user_plain", "Plain", "User").await;
        provision(&store, "admin", "Ada", "Admin").await;

        let response = app(&store, None)
            .oneshot(request("GET", "/api/admin/stats", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app(&store, None)
            .oneshot(request("GET", "/api/admin/stats", Some("user_plain"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app(&store, None)
            .oneshot(request("GET", "/api/admin/stats", Some("admin"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["data"]["participant"]["total"], 0);

        let response = app(&store, None)
            .oneshot(request(
                "GET",
                "/api/admin/applications/coordinator",
                Some("admin"),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_admin_rating_flow() {
        let store = Arc::new(InMemoryStore::new());
        let admin = provision(&store, "admin", "Ada", "Admin").await;
        let student = provision(&store, "user_r", "Rex", "Rated").await;
        crate::features::students::services::set_role(store.as_ref(), student.id, Role::Mentor)
            .await
            .unwrap();
        let application = store
            .find_application_for_student(ApplicationKind::Mentor, student.id)
            .await
            .unwrap()
            .unwrap();
        let uri = format!("/api/admin/ratings/{}", application.id);

        let response = app(&store, None)
            .oneshot(request("GET", &uri, Some("admin"), None))
            .await
            .unwrap();
        assert_eq!(json_body(response).await, json!({ "rating": null }));

        let response = app(&store, None)
            .oneshot(request("POST", &uri, Some("admin"), Some(json!({ "score": 11 }))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        for (score, feedback) in [(8, json!("Good")), (3, Value::Null)] {
            let response = app(&store, None)
                .oneshot(request(
                    "POST",
                    &uri,
                    Some("admin"),
                    Some(json!({ "score": score, "feedback": feedback })),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = app(&store, None)
            .oneshot(request("GET", &uri, Some("admin"), None))
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["rating"]["score"], 3);
        assert_eq!(body["rating"]["rated_by"], admin.id.to_string());
        assert_eq!(store.rating_count(application.id).await, 1);

        let response = app(&store, None)
            .oneshot(request(
                "POST",
                "/api/admin/ratings/latest",
                Some("admin"),
                Some(json!({ "application_ids": [application.id] })),
            ))
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["ratings"][application.id.to_string()]["score"], 3);

        let response = app(&store, None)
            .oneshot(request("DELETE", "/api/applications/me", Some("user_r"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_malformed_input_gets_error_envelope() {
        let store = Arc::new(InMemoryStore::new());
        let student = provision(&store, "user_bad", "Bea", "Badinput").await;
        crate::features::students::services::set_role(store.as_ref(), student.id, Role::Mentor)
            .await
            .unwrap();
        let application = store
            .find_application_for_student(ApplicationKind::Mentor, student.id)
            .await
            .unwrap()
            .unwrap();

        let cases = [
            request(
                "POST",
                "/api/students/me/role",
                Some("user_bad"),
                Some(json!({ "role": "wizard" })),
            ),
            request(
                "POST",
                "/api/students/me/role/change",
                Some("user_bad"),
                Some(json!({})),
            ),
            request(
                "PUT",
                &format!("/api/applications/{}/steps/300", application.id),
                Some("user_bad"),
                Some(json!({})),
            ),
            request(
                "PUT",
                &format!("/api/applications/{}/steps/two", application.id),
                Some("user_bad"),
                Some(json!({})),
            ),
            request(
                "PUT",
                "/api/applications/not-a-uuid/steps/1",
                Some("user_bad"),
                Some(json!({})),
            ),
            request(
                "PUT",
                &format!("/api/applications/{}/steps/2", application.id),
                Some("user_bad"),
                Some(json!({ "dietary_restrictions": [1, 2] })),
            ),
            Request::builder()
                .method("POST")
                .uri("/api/students/me/role")
                .header(USER_ID_HEADER, "user_bad")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        ];

        for case in cases {
            let uri = case.uri().to_string();
            let response = app(&store, None).oneshot(case).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
            let body = json_body(response).await;
            assert_eq!(body["success"], false, "{}", uri);
            assert!(body["error"].is_string(), "{}", uri);
        }

        let reloaded = store.find_student(student.id).await.unwrap().unwrap();
        assert_eq!(reloaded.role, Some(Role::Mentor));
    }

    #[tokio::test]
    async fn test_step_accepts_json_scalars() {
        let store = Arc::new(InMemoryStore::new());
        let student = provision(&store, "user_num", "Nu", "Meric").await;
        crate::features::students::services::set_role(store.as_ref(), student.id, Role::Judge)
            .await
            .unwrap();
        let application = store
            .find_application_for_student(ApplicationKind::Judge, student.id)
            .await
            .unwrap()
            .unwrap();

        let response = app(&store, None)
            .oneshot(request(
                "PUT",
                &format!("/api/applications/{}/steps/2", application.id),
                Some("user_num"),
                Some(json!({
                    "domain_expertise_level": 8,
                    "judging_experience": true,
                    "availability": null
                })),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["data"]["domain_expertise_level"], 8);
        assert_eq!(body["data"]["judging_experience"], true);
        assert_eq!(body["data"]["availability"], Value::Null);
    }

    fn signed_webhook(body: &Value, signing_key: &[u8]) -> Request<Body> {
        let payload = body.to_string();
        let msg_id = "msg_router_test";
        let timestamp = Utc::now().timestamp().to_string();

        let mut mac = Hmac::<Sha256>::new_from_slice(signing_key).unwrap();
        mac.update(format!("{}.{}.{}", msg_id, timestamp, payload).as_bytes());
        let signature = BASE64_STANDARD.encode(mac.finalize().into_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/webhooks/clerk")
            .header("content-type", "application/json")
            .header("svix-id", msg_id)
            .header("svix-timestamp", timestamp)
            .header("svix-signature", format!("v1,{}", signature))
            .body(Body::from(payload))
            .unwrap()
    }

    #[tokio::test]
    async fn test_webhook_provisions_student() {
        let store = Arc::new(InMemoryStore::new());
        let secret = format!("whsec_{}", BASE64_STANDARD.encode(WEBHOOK_KEY));
        let event = json!({
            "type": "user.created",
            "data": {
                "id": "user_hooked",
                "first_name": "Hook",
                "last_name": "Ed",
                "primary_email_address_id": "idn_1",
                "email_addresses": [{ "id": "idn_1", "email_address": "hook@example.com" }]
            }
        });

        let response = app(&store, None)
            .oneshot(signed_webhook(&event, WEBHOOK_KEY))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = app(&store, Some(secret.clone()))
            .oneshot(signed_webhook(&event, b"some-other-key"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(store
            .find_student_by_external_id("user_hooked")
            .await
            .unwrap()
            .is_none());

        let response = app(&store, Some(secret))
            .oneshot(signed_webhook(&event, WEBHOOK_KEY))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let student = store
            .find_student_by_external_id("user_hooked")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(student.email, "hook@example.com");
        assert_eq!(student.role, None);
    }
}
