//! Recovery action repository implementation.

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Transaction};

use cansar_core::{ActionRepository, CreateActionRequest, Error, Result};

/// PostgreSQL implementation of ActionRepository.
#[derive(Clone)]
pub struct PgActionRepository {
    pool: Pool<Postgres>,
}

impl PgActionRepository {
    /// Create a new PgActionRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Insert an action within a caller-supplied transaction.
    pub async fn insert_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        assessment_id: i64,
        req: &CreateActionRequest,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO actions (assessment_id, action_type, action_subtype, notes)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(assessment_id)
        .bind(&req.action_type)
        .bind(&req.action_subtype)
        .bind(&req.notes)
        .execute(&mut **tx)
        .await
        .map_err(Error::Database)?;

        Ok(())
    }
}

#[async_trait]
impl ActionRepository for PgActionRepository {
    async fn insert(&self, assessment_id: i64, req: CreateActionRequest) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        self.insert_tx(&mut tx, assessment_id, &req).await?;
        tx.commit().await.map_err(Error::Database)?;
        Ok(())
    }

    async fn count(&self) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM actions")
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)
    }
}
