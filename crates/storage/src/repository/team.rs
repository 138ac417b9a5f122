use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::Team;

pub struct TeamRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TeamRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Team>> {
        let team = sqlx::query_as::<_, Team>("SELECT id, name, size FROM teams WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(team)
    }
}
