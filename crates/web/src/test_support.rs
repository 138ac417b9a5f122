use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use storage::{
    error::{Result, StorageError},
    models::{
        Application, ApplicationKind, ApplicationStatus, NewRating, NewStudent, Rating, Role,
        Student, Team,
    },
    repository::{DatathonStore, InMemoryStore},
    services::form_steps::{FormStep, FormValue, StepFields},
};
use uuid::Uuid;

pub async fn provision(store: &InMemoryStore, external: &str, first: &str, last: &str) -> Student {
    store
        .create_student(&NewStudent {
            external_user_id: external.to_string(),
            email: format!("{}@example.com", external),
            first_name: first.to_string(),
            last_name: last.to_string(),
        })
        .await
        .unwrap()
}

pub fn text(value: &str) -> FormValue {
    FormValue::Text(value.to_string())
}

/// In-memory store with switchable write and read failures.
#[derive(Default)]
pub struct FaultyStore {
    pub inner: InMemoryStore,
    application_inserts_fail: AtomicBool,
    rating_inserts_fail: AtomicBool,
    unreadable: Mutex<Vec<ApplicationKind>>,
    status_before_step_update: Mutex<Option<ApplicationStatus>>,
}

impl FaultyStore {
    pub fn fail_application_inserts(&self) {
        self.application_inserts_fail.store(true, Ordering::SeqCst);
    }

    pub fn fail_rating_inserts(&self) {
        self.rating_inserts_fail.store(true, Ordering::SeqCst);
    }

    /// Lookups in the table of `kind` fail from now on.
    pub fn fail_reads_of(&self, kind: ApplicationKind) {
        self.unreadable.lock().unwrap().push(kind);
    }

    /// Another writer sets `status` right before the next step update lands.
    pub fn change_status_before_step_update(&self, status: ApplicationStatus) {
        *self.status_before_step_update.lock().unwrap() = Some(status);
    }

    fn check_readable(&self, kind: ApplicationKind) -> Result<()> {
        if self.unreadable.lock().unwrap().contains(&kind) {
            return Err(injected(&format!("{} table unavailable", kind)));
        }
        Ok(())
    }
}

fn injected(what: &str) -> StorageError {
    StorageError::InvalidData(format!("injected failure: {}", what))
}

#[axum::async_trait]
impl DatathonStore for FaultyStore {
    async fn create_student(&self, student: &NewStudent) -> Result<Student> {
        self.inner.create_student(student).await
    }

    async fn find_student(&self, id: Uuid) -> Result<Option<Student>> {
        self.inner.find_student(id).await
    }

    async fn find_student_by_external_id(
        &self,
        external_user_id: &str,
    ) -> Result<Option<Student>> {
        self.inner.find_student_by_external_id(external_user_id).await
    }

    async fn set_student_role(&self, id: Uuid, role: Option<Role>) -> Result<Student> {
        self.inner.set_student_role(id, role).await
    }

    async fn find_team(&self, id: Uuid) -> Result<Option<Team>> {
        self.inner.find_team(id).await
    }

    async fn insert_application(&self, application: &Application) -> Result<Application> {
        if self.application_inserts_fail.load(Ordering::SeqCst) {
            return Err(injected("application insert"));
        }
        self.inner.insert_application(application).await
    }

    async fn find_application(
        &self,
        kind: ApplicationKind,
        id: Uuid,
    ) -> Result<Option<Application>> {
        self.check_readable(kind)?;
        self.inner.find_application(kind, id).await
    }

    async fn find_application_for_student(
        &self,
        kind: ApplicationKind,
        student_id: Uuid,
    ) -> Result<Option<Application>> {
        self.check_readable(kind)?;
        self.inner.find_application_for_student(kind, student_id).await
    }

    async fn list_applications_for_student(
        &self,
        kind: ApplicationKind,
        student_id: Uuid,
    ) -> Result<Vec<Application>> {
        self.check_readable(kind)?;
        self.inner
            .list_applications_for_student(kind, student_id)
            .await
    }

    async fn update_application_step(
        &self,
        kind: ApplicationKind,
        id: Uuid,
        step: FormStep,
        fields: &StepFields,
    ) -> Result<Application> {
        let status = self.status_before_step_update.lock().unwrap().take();
        if let Some(status) = status {
            self.inner.set_application_status(kind, id, status).await?;
        }
        self.inner
            .update_application_step(kind, id, step, fields)
            .await
    }

    async fn set_application_status(
        &self,
        kind: ApplicationKind,
        id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Application> {
        self.inner.set_application_status(kind, id, status).await
    }

    async fn delete_applications_for_student(
        &self,
        kind: ApplicationKind,
        student_id: Uuid,
    ) -> Result<u64> {
        self.inner
            .delete_applications_for_student(kind, student_id)
            .await
    }

    async fn list_applications(&self, kind: ApplicationKind) -> Result<Vec<Application>> {
        self.check_readable(kind)?;
        self.inner.list_applications(kind).await
    }

    async fn count_by_status(&self, kind: ApplicationKind) -> Result<Vec<(String, i64)>> {
        self.inner.count_by_status(kind).await
    }

    async fn latest_rating(&self, application_id: Uuid) -> Result<Option<Rating>> {
        self.inner.latest_rating(application_id).await
    }

    async fn ratings_for(&self, application_ids: &[Uuid]) -> Result<Vec<Rating>> {
        self.inner.ratings_for(application_ids).await
    }

    async fn delete_rating(&self, id: Uuid) -> Result<()> {
        self.inner.delete_rating(id).await
    }

    async fn insert_rating(&self, rating: &NewRating) -> Result<Rating> {
        if self.rating_inserts_fail.load(Ordering::SeqCst) {
            return Err(injected("rating insert"));
        }
        self.inner.insert_rating(rating).await
    }
}
