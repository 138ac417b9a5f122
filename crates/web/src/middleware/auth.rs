use std::collections::HashSet;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, request::Parts},
    middleware::Next,
    response::Response,
};
use storage::models::Student;

use crate::error::WebError;
use crate::state::AppState;

/// Header carrying the identity provider's user id, set by the
/// authenticating edge in front of this service.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Opaque user id of the signed-in caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity(pub String);

impl CallerIdentity {
    fn from_headers(headers: &HeaderMap) -> Result<Self, WebError> {
        headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| Self(value.to_string()))
            .ok_or(WebError::Unauthorized)
    }
}

/// The caller's student record.
pub struct CurrentStudent(pub Student);

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentStudent {
    type Rejection = WebError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let identity = CallerIdentity::from_headers(&parts.headers)?;
        let student = resolve_student(state, &identity).await?;
        Ok(Self(student))
    }
}

async fn resolve_student(state: &AppState, identity: &CallerIdentity) -> Result<Student, WebError> {
    state
        .store()
        .find_student_by_external_id(&identity.0)
        .await?
        .ok_or_else(|| WebError::NotFound("Student".to_string()))
}

/// Student record of an admin caller, attached by `require_admin`.
#[derive(Debug, Clone)]
pub struct AdminUser(pub Student);

/// Admin allow-list, read once at startup.
#[derive(Debug, Clone, Default)]
pub struct AdminEmails {
    emails: HashSet<String>,
}

impl AdminEmails {
    pub fn from_comma_separated(emails_str: &str) -> Self {
        let emails = emails_str
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
            .collect();

        Self { emails }
    }

    pub fn is_admin(&self, email: &str) -> bool {
        self.emails.contains(&email.trim().to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.emails.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }
}

/// Rejects callers whose student email is not on the admin allow-list.
pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, WebError> {
    let identity = CallerIdentity::from_headers(request.headers())?;

    let student = match resolve_student(&state, &identity).await {
        Ok(student) => student,
        Err(WebError::NotFound(_)) => {
            tracing::warn!("Admin request from unprovisioned user {}", identity.0);
            return Err(WebError::Forbidden("Admin access required".to_string()));
        }
        Err(e) => return Err(e),
    };

    if !state.admins.is_admin(&student.email) {
        tracing::warn!("Non-admin {} attempted an admin action", student.email);
        return Err(WebError::Forbidden("Admin access required".to_string()));
    }

    request.extensions_mut().insert(AdminUser(student));
    Ok(next.run(request).await)
}
