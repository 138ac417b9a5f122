mod application;
mod rating;
mod role;
mod student;
mod team;

pub use application::{
    Application, ApplicationDetails, ApplicationKind, ApplicationStatus, JudgeFields,
    MentorFields, ParticipantFields,
};
pub use rating::{NewRating, Rating};
pub use role::Role;
pub use student::{NewStudent, Student};
pub use team::Team;

/// Error returned when a stored or submitted literal does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}
