use storage::{
    dto::admin::{ApplicationStats, GroupedApplications, RoleCounts},
    models::{Application, ApplicationKind, ApplicationStatus},
    repository::DatathonStore,
};
use uuid::Uuid;

use crate::error::WebResult;
use crate::features::applications::services::find_application_by_id;

/// Per-type dashboard counters. Not isolated from concurrent writes.
pub async fn application_stats(store: &dyn DatathonStore) -> WebResult<ApplicationStats> {
    Ok(ApplicationStats {
        participant: counts_for(store, ApplicationKind::Participant).await?,
        mentor: counts_for(store, ApplicationKind::Mentor).await?,
        judge: counts_for(store, ApplicationKind::Judge).await?,
    })
}

async fn counts_for(store: &dyn DatathonStore, kind: ApplicationKind) -> WebResult<RoleCounts> {
    let raw = store.count_by_status(kind).await?;
    Ok(RoleCounts::from_status_counts(&raw))
}

pub async fn list_by_status(
    store: &dyn DatathonStore,
    kind: ApplicationKind,
) -> WebResult<GroupedApplications> {
    let applications = store.list_applications(kind).await?;
    Ok(GroupedApplications::group(applications))
}

/// Record a review decision on an application of any type.
pub async fn set_status(
    store: &dyn DatathonStore,
    application_id: Uuid,
    status: ApplicationStatus,
) -> WebResult<Application> {
    let application = find_application_by_id(store, application_id).await?;

    let updated = store
        .set_application_status(application.kind(), application.id, status)
        .await?;

    tracing::info!(
        "Application {} moved from {} to {}",
        application.id,
        application.status,
        updated.status
    );

    Ok(updated)
}
