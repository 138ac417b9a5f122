//! In-memory implementation of `DatathonStore`.
//!
//! Used by tests and by the server when no database is configured. All data
//! is lost on restart.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::DatathonStore;
use crate::error::{Result, StorageError};
use crate::models::{
    Application, ApplicationKind, ApplicationStatus, NewRating, NewStudent, Rating, Role, Student,
    Team,
};
use crate::services::form_steps::{self, FormStep, StepFields};

/// Collections guarded by `RwLock`s. Applications keep insertion order so
/// that "first matching row" lookups behave like the database's oldest-first
/// ordering.
#[derive(Default)]
pub struct InMemoryStore {
    students: RwLock<HashMap<Uuid, Student>>,
    teams: RwLock<HashMap<Uuid, Team>>,
    applications: RwLock<Vec<Application>>,
    ratings: RwLock<Vec<Rating>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_team(&self, team: Team) {
        self.teams.write().await.insert(team.id, team);
    }

    pub async fn assign_team(&self, student_id: Uuid, team_id: Option<Uuid>) -> Result<Student> {
        let mut students = self.students.write().await;
        let student = students
            .get_mut(&student_id)
            .ok_or(StorageError::NotFound)?;
        student.team_id = team_id;
        student.updated_at = Utc::now();
        Ok(student.clone())
    }

    pub async fn rating_count(&self, application_id: Uuid) -> usize {
        self.ratings
            .read()
            .await
            .iter()
            .filter(|r| r.application_id == application_id)
            .count()
    }
}

#[async_trait]
impl DatathonStore for InMemoryStore {
    async fn create_student(&self, new: &NewStudent) -> Result<Student> {
        let mut students = self.students.write().await;
        if students
            .values()
            .any(|s| s.external_user_id == new.external_user_id)
        {
            return Err(StorageError::ConstraintViolation(format!(
                "student for user '{}' already exists",
                new.external_user_id
            )));
        }

        let now = Utc::now();
        let student = Student {
            id: Uuid::new_v4(),
            external_user_id: new.external_user_id.clone(),
            email: new.email.clone(),
            first_name: new.first_name.clone(),
            last_name: new.last_name.clone(),
            role: None,
            team_id: None,
            created_at: now,
            updated_at: now,
        };
        students.insert(student.id, student.clone());
        Ok(student)
    }

    async fn find_student(&self, id: Uuid) -> Result<Option<Student>> {
        Ok(self.students.read().await.get(&id).cloned())
    }

    async fn find_student_by_external_id(
        &self,
        external_user_id: &str,
    ) -> Result<Option<Student>> {
        Ok(self
            .students
            .read()
            .await
            .values()
            .find(|s| s.external_user_id == external_user_id)
            .cloned())
    }

    async fn set_student_role(&self, id: Uuid, role: Option<Role>) -> Result<Student> {
        let mut students = self.students.write().await;
        let student = students.get_mut(&id).ok_or(StorageError::NotFound)?;
        student.role = role;
        student.updated_at = Utc::now();
        Ok(student.clone())
    }

    async fn find_team(&self, id: Uuid) -> Result<Option<Team>> {
        Ok(self.teams.read().await.get(&id).cloned())
    }

    async fn insert_application(&self, application: &Application) -> Result<Application> {
        self.applications.write().await.push(application.clone());
        Ok(application.clone())
    }

    async fn find_application(
        &self,
        kind: ApplicationKind,
        id: Uuid,
    ) -> Result<Option<Application>> {
        Ok(self
            .applications
            .read()
            .await
            .iter()
            .find(|a| a.kind() == kind && a.id == id)
            .cloned())
    }

    async fn find_application_for_student(
        &self,
        kind: ApplicationKind,
        student_id: Uuid,
    ) -> Result<Option<Application>> {
        Ok(self
            .applications
            .read()
            .await
            .iter()
            .find(|a| a.kind() == kind && a.student_id == student_id)
            .cloned())
    }

    async fn list_applications_for_student(
        &self,
        kind: ApplicationKind,
        student_id: Uuid,
    ) -> Result<Vec<Application>> {
        Ok(self
            .applications
            .read()
            .await
            .iter()
            .filter(|a| a.kind() == kind && a.student_id == student_id)
            .cloned()
            .collect())
    }

    async fn update_application_step(
        &self,
        kind: ApplicationKind,
        id: Uuid,
        step: FormStep,
        fields: &StepFields,
    ) -> Result<Application> {
        let mut applications = self.applications.write().await;
        let stored = applications
            .iter_mut()
            .find(|a| a.kind() == kind && a.id == id)
            .ok_or(StorageError::NotFound)?;

        let mut merged = stored.clone();
        form_steps::apply_step(&mut merged, step, fields)
            .map_err(|e| StorageError::InvalidData(e.to_string()))?;
        merged.updated_at = Utc::now();
        *stored = merged;
        Ok(stored.clone())
    }

    async fn set_application_status(
        &self,
        kind: ApplicationKind,
        id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Application> {
        let mut applications = self.applications.write().await;
        let stored = applications
            .iter_mut()
            .find(|a| a.kind() == kind && a.id == id)
            .ok_or(StorageError::NotFound)?;
        stored.status = status;
        Ok(stored.clone())
    }

    async fn delete_applications_for_student(
        &self,
        kind: ApplicationKind,
        student_id: Uuid,
    ) -> Result<u64> {
        let mut applications = self.applications.write().await;
        let before = applications.len();
        applications.retain(|a| !(a.kind() == kind && a.student_id == student_id));
        Ok((before - applications.len()) as u64)
    }

    async fn list_applications(&self, kind: ApplicationKind) -> Result<Vec<Application>> {
        Ok(self
            .applications
            .read()
            .await
            .iter()
            .filter(|a| a.kind() == kind)
            .cloned()
            .collect())
    }

    async fn count_by_status(&self, kind: ApplicationKind) -> Result<Vec<(String, i64)>> {
        let mut counts: HashMap<&'static str, i64> = HashMap::new();
        for application in self.applications.read().await.iter() {
            if application.kind() == kind {
                *counts.entry(application.status.as_str()).or_default() += 1;
            }
        }

        Ok(counts
            .into_iter()
            .map(|(status, count)| (status.to_string(), count))
            .collect())
    }

    async fn latest_rating(&self, application_id: Uuid) -> Result<Option<Rating>> {
        Ok(self
            .ratings
            .read()
            .await
            .iter()
            .filter(|r| r.application_id == application_id)
            .max_by_key(|r| (r.created_at, r.id))
            .cloned())
    }

    async fn ratings_for(&self, application_ids: &[Uuid]) -> Result<Vec<Rating>> {
        Ok(self
            .ratings
            .read()
            .await
            .iter()
            .filter(|r| application_ids.contains(&r.application_id))
            .cloned()
            .collect())
    }

    async fn delete_rating(&self, id: Uuid) -> Result<()> {
        let mut ratings = self.ratings.write().await;
        let before = ratings.len();
        ratings.retain(|r| r.id != id);

        if ratings.len() == before {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }

    async fn insert_rating(&self, new: &NewRating) -> Result<Rating> {
        let now = Utc::now();
        let rating = Rating {
            id: Uuid::new_v4(),
            application_id: new.application_id,
            score: new.score,
            feedback: new.feedback.clone(),
            rated_by: new.rated_by,
            created_at: now,
            updated_at: now,
        };
        self.ratings.write().await.push(rating.clone());
        Ok(rating)
    }
}
