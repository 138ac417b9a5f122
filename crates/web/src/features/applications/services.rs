use storage::{
    models::{Application, ApplicationKind, ApplicationStatus},
    repository::DatathonStore,
    services::form_steps::{self, FormStep, StepFields},
};
use uuid::Uuid;

use crate::error::{WebError, WebResult};

/// Resolve an application id by checking participant, mentor, then judge.
///
/// A table that fails to answer is logged and skipped; the lookup only fails
/// with the store error when no table answered at all.
pub async fn find_application_by_id(
    store: &dyn DatathonStore,
    application_id: Uuid,
) -> WebResult<Application> {
    let mut answered = false;
    let mut last_error = None;

    for kind in ApplicationKind::ID_LOOKUP_ORDER {
        match store.find_application(kind, application_id).await {
            Ok(Some(application)) => return Ok(application),
            Ok(None) => answered = true,
            Err(e) => {
                tracing::warn!(
                    "Lookup of application {} in {} table failed: {}",
                    application_id,
                    kind,
                    e
                );
                last_error = Some(e);
            }
        }
    }

    match last_error {
        Some(e) if !answered => Err(e.into()),
        _ => Err(WebError::NotFound("Application".to_string())),
    }
}

/// First application owned by the student, checking participant, judge,
/// then mentor. Tables that fail are logged and skipped.
pub async fn find_student_application(
    store: &dyn DatathonStore,
    student_id: Uuid,
) -> WebResult<Option<Application>> {
    let mut answered = false;
    let mut last_error = None;

    for kind in ApplicationKind::OWNERSHIP_LOOKUP_ORDER {
        match store.find_application_for_student(kind, student_id).await {
            Ok(Some(application)) => return Ok(Some(application)),
            Ok(None) => answered = true,
            Err(e) => {
                tracing::warn!(
                    "Checking {} applications of student {} failed: {}",
                    kind,
                    student_id,
                    e
                );
                last_error = Some(e);
            }
        }
    }

    match last_error {
        Some(e) if !answered => Err(e.into()),
        _ => Ok(None),
    }
}

/// Merge one form step into an application owned by `owner_id`.
///
/// Only the step's own columns are written; the status and the other steps
/// stay as they are in the store at write time.
pub async fn update_application_data(
    store: &dyn DatathonStore,
    owner_id: Uuid,
    application_id: Uuid,
    step: &str,
    fields: &StepFields,
) -> WebResult<Application> {
    let application = find_application_by_id(store, application_id).await?;

    if application.student_id != owner_id {
        tracing::warn!(
            "Student {} tried to edit application {} owned by {}",
            owner_id,
            application_id,
            application.student_id
        );
        return Err(WebError::Forbidden(
            "Application belongs to another student".to_string(),
        ));
    }

    let step: FormStep = step.parse()?;
    form_steps::apply_step(&mut application.clone(), step, fields)?;

    Ok(store
        .update_application_step(application.kind(), application.id, step, fields)
        .await?)
}

/// Mark the application of the student's current role as submitted.
///
/// Whatever fields are filled at this point are accepted as they are.
pub async fn submit_application(
    store: &dyn DatathonStore,
    student_id: Uuid,
) -> WebResult<Application> {
    let student = store
        .find_student(student_id)
        .await?
        .ok_or_else(|| WebError::NotFound("Student".to_string()))?;

    let kind = student
        .role
        .and_then(|role| role.application_kind())
        .ok_or_else(|| {
            WebError::InvalidState(match student.role {
                Some(role) => format!("Role '{}' has no application to submit", role),
                None => "Select a role before submitting".to_string(),
            })
        })?;

    let application = store
        .find_application_for_student(kind, student_id)
        .await?
        .ok_or_else(|| WebError::NotFound("Application".to_string()))?;

    let submitted = store
        .set_application_status(kind, application.id, ApplicationStatus::Submitted)
        .await?;

    tracing::info!(
        "Student {} submitted {} application {}",
        student_id,
        kind,
        submitted.id
    );

    Ok(submitted)
}

/// Remove the student's rows from all three application tables and clear
/// the role. Succeeds when there is nothing to delete.
pub async fn delete_applications(store: &dyn DatathonStore, student_id: Uuid) -> WebResult<()> {
    for kind in ApplicationKind::ID_LOOKUP_ORDER {
        let removed = store.delete_applications_for_student(kind, student_id).await?;
        if removed > 0 {
            tracing::info!(
                "Deleted {} {} application(s) of student {}",
                removed,
                kind,
                student_id
            );
        }
    }

    store.set_student_role(student_id, None).await?;

    Ok(())
}

/// Withdrawal as offered to students: refused while any application row the
/// student owns, of any type, carries a rating.
pub async fn withdraw_application(store: &dyn DatathonStore, student_id: Uuid) -> WebResult<()> {
    let mut owned = Vec::new();
    for kind in ApplicationKind::ID_LOOKUP_ORDER {
        owned.extend(
            store
                .list_applications_for_student(kind, student_id)
                .await?
                .into_iter()
                .map(|application| application.id),
        );
    }

    if owned.is_empty() {
        return delete_applications(store, student_id).await;
    }

    if let Some(rating) = store.ratings_for(&owned).await?.first() {
        tracing::warn!(
            "Refusing withdrawal by student {}: application {} is rated",
            student_id,
            rating.application_id
        );
        return Err(WebError::Forbidden(
            "A rated application cannot be withdrawn".to_string(),
        ));
    }

    delete_applications(store, student_id).await
}
