use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{Application, ApplicationStatus};

/// Per-type counters for the admin dashboard.
///
/// `submitted` covers both the `submitted` and the legacy `pending` literal.
/// Rows with a status outside the five known values are left out of every
/// counter, `total` included.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct RoleCounts {
    pub total: i64,
    pub submitted: i64,
    pub accepted: i64,
    pub rejected: i64,
}

impl RoleCounts {
    /// Builds counters from raw `(status literal, row count)` pairs.
    pub fn from_status_counts<S: AsRef<str>>(counts: &[(S, i64)]) -> Self {
        let mut result = Self::default();

        for (status, count) in counts {
            let Ok(status) = status.as_ref().parse::<ApplicationStatus>() else {
                continue;
            };

            result.total += count;
            match status {
                ApplicationStatus::Pending | ApplicationStatus::Submitted => {
                    result.submitted += count
                }
                ApplicationStatus::Accepted => result.accepted += count,
                ApplicationStatus::Rejected => result.rejected += count,
                ApplicationStatus::Draft => {}
            }
        }

        result
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct ApplicationStats {
    pub participant: RoleCounts,
    pub mentor: RoleCounts,
    pub judge: RoleCounts,
}

/// Applications of one type bucketed by review status.
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct GroupedApplications {
    pub draft: Vec<Application>,
    /// Both `submitted` and legacy `pending` rows.
    pub submitted: Vec<Application>,
    pub accepted: Vec<Application>,
    pub rejected: Vec<Application>,
}

impl GroupedApplications {
    pub fn group(applications: Vec<Application>) -> Self {
        let mut grouped = Self::default();

        for application in applications {
            match application.status {
                ApplicationStatus::Draft => grouped.draft.push(application),
                ApplicationStatus::Pending | ApplicationStatus::Submitted => {
                    grouped.submitted.push(application)
                }
                ApplicationStatus::Accepted => grouped.accepted.push(application),
                ApplicationStatus::Rejected => grouped.rejected.push(application),
            }
        }

        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ApplicationKind;
    use uuid::Uuid;

    #[test]
    fn test_unknown_statuses_are_excluded_from_total() {
        let counts = RoleCounts::from_status_counts(&[
            ("draft", 2),
            ("pending", 1),
            ("submitted", 3),
            ("accepted", 4),
            ("rejected", 5),
            ("withdrawn", 7),
            ("", 1),
        ]);

        assert_eq!(
            counts,
            RoleCounts {
                total: 15,
                submitted: 4,
                accepted: 4,
                rejected: 5,
            }
        );
    }

    #[test]
    fn test_buckets_equal_total_without_drafts() {
        let counts = RoleCounts::from_status_counts(&[("submitted", 1), ("accepted", 2)]);
        assert_eq!(counts.submitted + counts.accepted + counts.rejected, counts.total);

        let with_draft = RoleCounts::from_status_counts(&[("submitted", 1), ("draft", 2)]);
        assert!(with_draft.submitted + with_draft.accepted + with_draft.rejected < with_draft.total);
    }

    #[test]
    fn test_grouping_merges_pending_into_submitted() {
        let mut pending = Application::draft(ApplicationKind::Mentor, Uuid::new_v4(), None);
        pending.status = ApplicationStatus::Pending;
        let mut submitted = Application::draft(ApplicationKind::Mentor, Uuid::new_v4(), None);
        submitted.status = ApplicationStatus::Submitted;
        let draft = Application::draft(ApplicationKind::Mentor, Uuid::new_v4(), None);

        let grouped = GroupedApplications::group(vec![pending, submitted, draft]);

        assert_eq!(grouped.submitted.len(), 2);
        assert_eq!(grouped.draft.len(), 1);
        assert!(grouped.accepted.is_empty());
        assert!(grouped.rejected.is_empty());
    }
}
