use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{NewStudent, Role, Student};

const STUDENT_COLUMNS: &str =
    "id, external_user_id, email, first_name, last_name, role, team_id, created_at, updated_at";

#[derive(FromRow)]
struct StudentRow {
    id: Uuid,
    external_user_id: String,
    email: String,
    first_name: String,
    last_name: String,
    role: Option<String>,
    team_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<StudentRow> for Student {
    type Error = StorageError;

    fn try_from(row: StudentRow) -> Result<Self> {
        let role = row
            .role
            .as_deref()
            .map(str::parse::<Role>)
            .transpose()
            .map_err(|e| StorageError::InvalidData(e.to_string()))?;

        Ok(Student {
            id: row.id,
            external_user_id: row.external_user_id,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            role,
            team_id: row.team_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub struct StudentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StudentRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a student with no role
    pub async fn create(&self, new: &NewStudent) -> Result<Student> {
        let sql = format!(
            r#"
            INSERT INTO students (external_user_id, email, first_name, last_name)
            VALUES ($1, $2, $3, $4)
            RETURNING {STUDENT_COLUMNS}
            "#
        );

        let result = sqlx::query_as::<_, StudentRow>(&sql)
            .bind(&new.external_user_id)
            .bind(&new.email)
            .bind(&new.first_name)
            .bind(&new.last_name)
            .fetch_one(self.pool)
            .await;

        match result {
            Ok(row) => row.try_into(),
            Err(e) => {
                let err = StorageError::from(e);
                if err.is_unique_violation() {
                    Err(StorageError::ConstraintViolation(format!(
                        "student for user '{}' already exists",
                        new.external_user_id
                    )))
                } else {
                    Err(err)
                }
            }
        }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Student>> {
        let sql = format!("SELECT {STUDENT_COLUMNS} FROM students WHERE id = $1");

        sqlx::query_as::<_, StudentRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .map(Student::try_from)
            .transpose()
    }

    pub async fn find_by_external_id(&self, external_user_id: &str) -> Result<Option<Student>> {
        let sql = format!("SELECT {STUDENT_COLUMNS} FROM students WHERE external_user_id = $1");

        sqlx::query_as::<_, StudentRow>(&sql)
            .bind(external_user_id)
            .fetch_optional(self.pool)
            .await?
            .map(Student::try_from)
            .transpose()
    }

    /// Set or clear the role and stamp `updated_at`
    pub async fn set_role(&self, id: Uuid, role: Option<Role>) -> Result<Student> {
        let sql = format!(
            r#"
            UPDATE students
            SET role = $2, updated_at = now()
            WHERE id = $1
            RETURNING {STUDENT_COLUMNS}
            "#
        );

        sqlx::query_as::<_, StudentRow>(&sql)
            .bind(id)
            .bind(role.map(|r| r.as_str()))
            .fetch_optional(self.pool)
            .await?
            .ok_or(StorageError::NotFound)?
            .try_into()
    }
}
