use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::Role;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Student {
    pub id: Uuid,
    /// Opaque user id issued by the identity provider.
    pub external_user_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Option<Role>,
    pub team_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Student {
    /// Name used to seed `full_name` on freshly provisioned applications.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Data needed to provision a student from an identity-provider event.
#[derive(Debug, Clone)]
pub struct NewStudent {
    pub external_user_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}
