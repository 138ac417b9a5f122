use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Role, Student, Team};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SetRoleRequest {
    pub role: Role,
}

/// The caller's profile together with the team it points at, if any.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StudentProfile {
    #[serde(flatten)]
    pub student: Student,
    pub team: Option<Team>,
}
