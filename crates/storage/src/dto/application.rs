use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Application, ApplicationKind, ApplicationStatus};

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct HasApplicationResponse {
    pub has_application: bool,
    pub application_type: Option<ApplicationKind>,
    pub application_status: Option<ApplicationStatus>,
}

impl HasApplicationResponse {
    pub fn none() -> Self {
        Self {
            has_application: false,
            application_type: None,
            application_status: None,
        }
    }
}

impl From<&Application> for HasApplicationResponse {
    fn from(application: &Application) -> Self {
        Self {
            has_application: true,
            application_type: Some(application.kind()),
            application_status: Some(application.status),
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    pub status: ApplicationStatus,
}
