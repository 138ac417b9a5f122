//! `DatathonStore` on PostgreSQL, delegating to the table repositories.

use async_trait::async_trait;
use uuid::Uuid;

use super::DatathonStore;
use super::application::ApplicationRepository;
use super::rating::RatingRepository;
use super::student::StudentRepository;
use super::team::TeamRepository;
use crate::Database;
use crate::error::Result;
use crate::models::{
    Application, ApplicationKind, ApplicationStatus, NewRating, NewStudent, Rating, Role, Student,
    Team,
};
use crate::services::form_steps::{FormStep, StepFields};

#[async_trait]
impl DatathonStore for Database {
    async fn create_student(&self, student: &NewStudent) -> Result<Student> {
        StudentRepository::new(self.pool()).create(student).await
    }

    async fn find_student(&self, id: Uuid) -> Result<Option<Student>> {
        StudentRepository::new(self.pool()).find_by_id(id).await
    }

    async fn find_student_by_external_id(
        &self,
        external_user_id: &str,
    ) -> Result<Option<Student>> {
        StudentRepository::new(self.pool())
            .find_by_external_id(external_user_id)
            .await
    }

    async fn set_student_role(&self, id: Uuid, role: Option<Role>) -> Result<Student> {
        StudentRepository::new(self.pool()).set_role(id, role).await
    }

    async fn find_team(&self, id: Uuid) -> Result<Option<Team>> {
        TeamRepository::new(self.pool()).find_by_id(id).await
    }

    async fn insert_application(&self, application: &Application) -> Result<Application> {
        ApplicationRepository::new(self.pool())
            .create(application)
            .await
    }

    async fn find_application(
        &self,
        kind: ApplicationKind,
        id: Uuid,
    ) -> Result<Option<Application>> {
        ApplicationRepository::new(self.pool())
            .find_by_id(kind, id)
            .await
    }

    async fn find_application_for_student(
        &self,
        kind: ApplicationKind,
        student_id: Uuid,
    ) -> Result<Option<Application>> {
        ApplicationRepository::new(self.pool())
            .find_first_for_student(kind, student_id)
            .await
    }

    async fn list_applications_for_student(
        &self,
        kind: ApplicationKind,
        student_id: Uuid,
    ) -> Result<Vec<Application>> {
        ApplicationRepository::new(self.pool())
            .list_for_student(kind, student_id)
            .await
    }

    async fn update_application_step(
        &self,
        kind: ApplicationKind,
        id: Uuid,
        step: FormStep,
        fields: &StepFields,
    ) -> Result<Application> {
        ApplicationRepository::new(self.pool())
            .update_step(kind, id, step, fields)
            .await
    }

    async fn set_application_status(
        &self,
        kind: ApplicationKind,
        id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Application> {
        ApplicationRepository::new(self.pool())
            .set_status(kind, id, status)
            .await
    }

    async fn delete_applications_for_student(
        &self,
        kind: ApplicationKind,
        student_id: Uuid,
    ) -> Result<u64> {
        ApplicationRepository::new(self.pool())
            .delete_for_student(kind, student_id)
            .await
    }

    async fn list_applications(&self, kind: ApplicationKind) -> Result<Vec<Application>> {
        ApplicationRepository::new(self.pool()).list(kind).await
    }

    async fn count_by_status(&self, kind: ApplicationKind) -> Result<Vec<(String, i64)>> {
        ApplicationRepository::new(self.pool())
            .count_by_status(kind)
            .await
    }

    async fn latest_rating(&self, application_id: Uuid) -> Result<Option<Rating>> {
        RatingRepository::new(self.pool())
            .find_latest(application_id)
            .await
    }

    async fn ratings_for(&self, application_ids: &[Uuid]) -> Result<Vec<Rating>> {
        RatingRepository::new(self.pool())
            .find_for_applications(application_ids)
            .await
    }

    async fn delete_rating(&self, id: Uuid) -> Result<()> {
        RatingRepository::new(self.pool()).delete(id).await
    }

    async fn insert_rating(&self, rating: &NewRating) -> Result<Rating> {
        RatingRepository::new(self.pool()).create(rating).await
    }
}
