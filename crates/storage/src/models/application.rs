use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::UnknownVariant;

/// The three application tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationKind {
    Participant,
    Mentor,
    Judge,
}

impl ApplicationKind {
    /// Table order used when resolving an application by id.
    pub const ID_LOOKUP_ORDER: [ApplicationKind; 3] = [Self::Participant, Self::Mentor, Self::Judge];

    /// Precedence used when asking whether a student has any application.
    pub const OWNERSHIP_LOOKUP_ORDER: [ApplicationKind; 3] =
        [Self::Participant, Self::Judge, Self::Mentor];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Participant => "participant",
            Self::Mentor => "mentor",
            Self::Judge => "judge",
        }
    }
}

impl fmt::Display for ApplicationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationKind {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "participant" => Ok(Self::Participant),
            "mentor" => Ok(Self::Mentor),
            "judge" => Ok(Self::Judge),
            other => Err(UnknownVariant::new("application type", other)),
        }
    }
}

/// Review status of an application.
///
/// `Pending` is the historical name of `Submitted`; both are kept and treated
/// as the same "awaiting decision" bucket wherever statuses are counted or
/// filtered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Draft,
    Pending,
    Submitted,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Submitted => "submitted",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }

    pub fn is_awaiting_decision(&self) -> bool {
        matches!(self, Self::Pending | Self::Submitted)
    }

    /// Any status other than draft locks the owner's role.
    pub fn locks_role(&self) -> bool {
        !matches!(self, Self::Draft)
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "pending" => Ok(Self::Pending),
            "submitted" => Ok(Self::Submitted),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            other => Err(UnknownVariant::new("application status", other)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ParticipantFields {
    pub gender: Option<String>,
    pub university: Option<String>,
    pub program: Option<String>,
    pub year_of_study: Option<String>,
    pub phone: Option<String>,
    /// 1 to 5
    pub programming_experience: Option<i32>,
    /// 1 to 5
    pub data_science_experience: Option<i32>,
    pub technical_skills: Option<String>,
    pub has_team: bool,
    pub team_members: Option<String>,
    /// Multi-select stored as a single `", "`-joined string.
    pub dietary_restrictions: Option<String>,
    pub tshirt_size: Option<String>,
    pub motivation: Option<String>,
    pub heard_from: Option<String>,
    pub agree_to_code_of_conduct: bool,
    pub agree_to_photo_release: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MentorFields {
    pub organization: Option<String>,
    pub job_title: Option<String>,
    pub linkedin_url: Option<String>,
    pub expertise_areas: Option<String>,
    /// 1 to 10
    pub experience_level: Option<i32>,
    pub availability: Option<String>,
    /// Multi-select stored as a native list.
    pub dietary_restrictions: Vec<String>,
    pub tshirt_size: Option<String>,
    pub motivation: Option<String>,
    pub previous_mentoring: bool,
    pub agree_to_code_of_conduct: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct JudgeFields {
    pub organization: Option<String>,
    pub job_title: Option<String>,
    pub linkedin_url: Option<String>,
    pub expertise_areas: Option<String>,
    pub judging_experience: bool,
    /// 1 to 10
    pub domain_expertise_level: Option<i32>,
    pub availability: Option<String>,
    pub motivation: Option<String>,
    pub conflict_of_interest: Option<String>,
    pub agree_to_code_of_conduct: bool,
}

/// Role-specific part of an application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "application_type", rename_all = "lowercase")]
pub enum ApplicationDetails {
    Participant(ParticipantFields),
    Mentor(MentorFields),
    Judge(JudgeFields),
}

impl ApplicationDetails {
    /// Empty field set for a freshly provisioned application.
    pub fn empty(kind: ApplicationKind) -> Self {
        match kind {
            ApplicationKind::Participant => Self::Participant(ParticipantFields::default()),
            ApplicationKind::Mentor => Self::Mentor(MentorFields::default()),
            ApplicationKind::Judge => Self::Judge(JudgeFields::default()),
        }
    }

    pub fn kind(&self) -> ApplicationKind {
        match self {
            Self::Participant(_) => ApplicationKind::Participant,
            Self::Mentor(_) => ApplicationKind::Mentor,
            Self::Judge(_) => ApplicationKind::Judge,
        }
    }
}

/// An application: the shared envelope plus one role's field set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Application {
    pub id: Uuid,
    pub student_id: Uuid,
    pub status: ApplicationStatus,
    pub full_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub details: ApplicationDetails,
}

impl Application {
    /// Draft application with `full_name` seeded and every role field empty.
    pub fn draft(kind: ApplicationKind, student_id: Uuid, full_name: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            student_id,
            status: ApplicationStatus::Draft,
            full_name,
            created_at: now,
            updated_at: now,
            details: ApplicationDetails::empty(kind),
        }
    }

    pub fn kind(&self) -> ApplicationKind {
        self.details.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_and_submitted_share_bucket() {
        assert!(ApplicationStatus::Pending.is_awaiting_decision());
        assert!(ApplicationStatus::Submitted.is_awaiting_decision());
        assert!(!ApplicationStatus::Draft.is_awaiting_decision());
        assert!(!ApplicationStatus::Accepted.is_awaiting_decision());
    }

    #[test]
    fn test_only_draft_leaves_role_unlocked() {
        assert!(!ApplicationStatus::Draft.locks_role());
        assert!(ApplicationStatus::Submitted.locks_role());
        assert!(ApplicationStatus::Accepted.locks_role());
        assert!(ApplicationStatus::Rejected.locks_role());
    }

    #[test]
    fn test_draft_is_empty() {
        let student_id = Uuid::new_v4();
        let app = Application::draft(
            ApplicationKind::Mentor,
            student_id,
            Some("Ada Lovelace".to_string()),
        );

        assert_eq!(app.status, ApplicationStatus::Draft);
        assert_eq!(app.student_id, student_id);
        assert_eq!(app.full_name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(app.details, ApplicationDetails::Mentor(MentorFields::default()));
    }

    #[test]
    fn test_serialized_shape_is_flat_and_tagged() {
        let app = Application::draft(ApplicationKind::Judge, Uuid::new_v4(), None);
        let json = serde_json::to_value(&app).unwrap();

        assert_eq!(json["application_type"], "judge");
        assert_eq!(json["status"], "draft");
        assert_eq!(json["judging_experience"], false);
    }
}
