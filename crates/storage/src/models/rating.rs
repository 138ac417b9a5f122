use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Reviewer score attached by convention to an application of any type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Rating {
    pub id: Uuid,
    pub application_id: Uuid,
    pub score: i32,
    pub feedback: Option<String>,
    /// Student id of the reviewer.
    pub rated_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewRating {
    pub application_id: Uuid,
    pub score: i32,
    pub feedback: Option<String>,
    pub rated_by: Uuid,
}
