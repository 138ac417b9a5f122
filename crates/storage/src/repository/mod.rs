//! Persistence contract for students, applications and ratings.
//!
//! `DatathonStore` is the single interface the request handlers talk to.
//! `Database` implements it on PostgreSQL through the table repositories in
//! this module; `InMemoryStore` keeps everything in process memory.

pub mod application;
mod memory;
mod postgres;
pub mod rating;
pub mod student;
pub mod team;

pub use memory::InMemoryStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    Application, ApplicationKind, ApplicationStatus, NewRating, NewStudent, Rating, Role, Student,
    Team,
};
use crate::services::form_steps::{FormStep, StepFields};

#[async_trait]
pub trait DatathonStore: Send + Sync {
    async fn create_student(&self, student: &NewStudent) -> Result<Student>;

    async fn find_student(&self, id: Uuid) -> Result<Option<Student>>;

    async fn find_student_by_external_id(&self, external_user_id: &str)
    -> Result<Option<Student>>;

    /// Writes the role and stamps `updated_at`. Fails with `NotFound` for an
    /// unknown student.
    async fn set_student_role(&self, id: Uuid, role: Option<Role>) -> Result<Student>;

    async fn find_team(&self, id: Uuid) -> Result<Option<Team>>;

    /// Inserts the application as given, including its id and timestamps.
    async fn insert_application(&self, application: &Application) -> Result<Application>;

    async fn find_application(&self, kind: ApplicationKind, id: Uuid)
    -> Result<Option<Application>>;

    /// First row of `kind` owned by the student, oldest first. Several rows
    /// may exist; only the first one is ever returned.
    async fn find_application_for_student(
        &self,
        kind: ApplicationKind,
        student_id: Uuid,
    ) -> Result<Option<Application>>;

    /// Every row of `kind` owned by the student, oldest first, duplicates
    /// included.
    async fn list_applications_for_student(
        &self,
        kind: ApplicationKind,
        student_id: Uuid,
    ) -> Result<Vec<Application>>;

    /// Rewrites the columns owned by `step` from `fields` and stamps
    /// `updated_at`. The status and the other steps' columns are never
    /// written.
    async fn update_application_step(
        &self,
        kind: ApplicationKind,
        id: Uuid,
        step: FormStep,
        fields: &StepFields,
    ) -> Result<Application>;

    /// Writes only the status column.
    async fn set_application_status(
        &self,
        kind: ApplicationKind,
        id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Application>;

    /// Removes every row of `kind` owned by the student, returning how many went.
    async fn delete_applications_for_student(
        &self,
        kind: ApplicationKind,
        student_id: Uuid,
    ) -> Result<u64>;

    /// Rows of `kind` whose status is one of the known literals.
    async fn list_applications(&self, kind: ApplicationKind) -> Result<Vec<Application>>;

    /// Raw `(status, count)` pairs for `kind`, unknown literals included.
    async fn count_by_status(&self, kind: ApplicationKind) -> Result<Vec<(String, i64)>>;

    async fn latest_rating(&self, application_id: Uuid) -> Result<Option<Rating>>;

    /// Every rating attached to any of the given applications.
    async fn ratings_for(&self, application_ids: &[Uuid]) -> Result<Vec<Rating>>;

    async fn delete_rating(&self, id: Uuid) -> Result<()>;

    async fn insert_rating(&self, rating: &NewRating) -> Result<Rating>;
}
