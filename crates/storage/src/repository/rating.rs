use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{NewRating, Rating};

const RATING_COLUMNS: &str =
    "id, application_id, score, feedback, rated_by, created_at, updated_at";

pub struct RatingRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RatingRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Most recent rating for an application; equal timestamps fall back to
    /// the greater id
    pub async fn find_latest(&self, application_id: Uuid) -> Result<Option<Rating>> {
        let sql = format!(
            r#"
            SELECT {RATING_COLUMNS}
            FROM ratings
            WHERE application_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#
        );

        let rating = sqlx::query_as::<_, Rating>(&sql)
            .bind(application_id)
            .fetch_optional(self.pool)
            .await?;

        Ok(rating)
    }

    /// All ratings for a set of applications in one round trip
    pub async fn find_for_applications(&self, application_ids: &[Uuid]) -> Result<Vec<Rating>> {
        let sql = format!(
            r#"
            SELECT {RATING_COLUMNS}
            FROM ratings
            WHERE application_id = ANY($1)
            "#
        );

        let ratings = sqlx::query_as::<_, Rating>(&sql)
            .bind(application_ids)
            .fetch_all(self.pool)
            .await?;

        Ok(ratings)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM ratings WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }

    pub async fn create(&self, new: &NewRating) -> Result<Rating> {
        let sql = format!(
            r#"
            INSERT INTO ratings (application_id, score, feedback, rated_by)
            VALUES ($1, $2, $3, $4)
            RETURNING {RATING_COLUMNS}
            "#
        );

        let rating = sqlx::query_as::<_, Rating>(&sql)
            .bind(new.application_id)
            .bind(new.score)
            .bind(&new.feedback)
            .bind(new.rated_by)
            .fetch_one(self.pool)
            .await?;

        Ok(rating)
    }
}
