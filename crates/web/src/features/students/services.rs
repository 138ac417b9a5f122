use storage::{
    dto::student::StudentProfile,
    models::{Application, Role, Student},
    repository::DatathonStore,
};
use uuid::Uuid;

use crate::error::{WebError, WebResult};
use crate::features::applications::services::{delete_applications, find_student_application};

/// Student profile with its team resolved through the weak `team_id`
pub async fn get_profile(store: &dyn DatathonStore, student: Student) -> WebResult<StudentProfile> {
    let team = match student.team_id {
        Some(team_id) => {
            let team = store.find_team(team_id).await?;
            if team.is_none() {
                tracing::warn!(
                    "Student {} references missing team {}",
                    student.id,
                    team_id
                );
            }
            team
        }
        None => None,
    };

    Ok(StudentProfile { student, team })
}

/// Write the role and, for roles with an application form, provision a
/// fresh draft application.
///
/// The role is written first. If the insert then fails the student keeps the
/// new role without an application and the error is returned as is. Calling
/// this twice with the same role provisions a second draft.
pub async fn set_role(store: &dyn DatathonStore, student_id: Uuid, role: Role) -> WebResult<Student> {
    let student = store
        .find_student(student_id)
        .await?
        .ok_or_else(|| WebError::NotFound("Student".to_string()))?;

    let student = store.set_student_role(student.id, Some(role)).await?;

    if let Some(kind) = role.application_kind() {
        let full_name = Some(student.display_name()).filter(|name| !name.is_empty());
        let draft = Application::draft(kind, student.id, full_name);

        if let Err(e) = store.insert_application(&draft).await {
            tracing::error!(
                "Student {} now has role {} but its application could not be created: {}",
                student.id,
                role,
                e
            );
            return Err(e.into());
        }

        tracing::info!(
            "Provisioned {} application {} for student {}",
            kind,
            draft.id,
            student.id
        );
    }

    Ok(student)
}

/// Switch roles: a no-op for the current role, refused once the existing
/// application has left draft, otherwise delete the draft and set the role.
///
/// Delete and set-role are separate writes; a failure in between leaves the
/// student with neither role nor application.
pub async fn change_role(
    store: &dyn DatathonStore,
    student: Student,
    new_role: Role,
) -> WebResult<Student> {
    if student.role == Some(new_role) {
        return Ok(student);
    }

    if let Some(application) = find_student_application(store, student.id).await? {
        if application.status.locks_role() {
            tracing::warn!(
                "Role change of student {} refused: application {} is {}",
                student.id,
                application.id,
                application.status
            );
            return Err(WebError::Forbidden(format!(
                "Role cannot change once an application is {}",
                application.status
            )));
        }

        delete_applications(store, student.id).await?;
    }

    set_role(store, student.id, new_role).await
}
