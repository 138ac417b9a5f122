use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{ApplicationKind, UnknownVariant};

/// Role a student picks after sign-up. A student without a role has `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Participant,
    Mentor,
    Judge,
    Coordinator,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Participant => "participant",
            Self::Mentor => "mentor",
            Self::Judge => "judge",
            Self::Coordinator => "coordinator",
        }
    }

    /// Application table backing this role. Coordinators have none.
    pub fn application_kind(&self) -> Option<ApplicationKind> {
        match self {
            Self::Participant => Some(ApplicationKind::Participant),
            Self::Mentor => Some(ApplicationKind::Mentor),
            Self::Judge => Some(ApplicationKind::Judge),
            Self::Coordinator => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "participant" => Ok(Self::Participant),
            "mentor" => Ok(Self::Mentor),
            "judge" => Ok(Self::Judge),
            "coordinator" => Ok(Self::Coordinator),
            other => Err(UnknownVariant::new("role", other)),
        }
    }
}
