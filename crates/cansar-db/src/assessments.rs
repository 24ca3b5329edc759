//! Status assessment repository implementation.

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row, Transaction};

use cansar_core::{AssessmentRepository, CreateAssessmentRequest, Error, Result};

/// PostgreSQL implementation of AssessmentRepository.
#[derive(Clone)]
pub struct PgAssessmentRepository {
    pool: Pool<Postgres>,
}

impl PgAssessmentRepository {
    /// Create a new PgAssessmentRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Insert an assessment within a caller-supplied transaction, returning
    /// the database-assigned id for threat/action linkage.
    pub async fn insert_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        req: &CreateAssessmentRequest,
    ) -> Result<i64> {
        let row = sqlx::query(
            r#"
            INSERT INTO status_assessments (
                species_id, year, cosewic_status, sara_status, doc_type
            )
            VALUES ($1, $2, $3, $4, $5)
            RETURNING assessment_id
            "#,
        )
        .bind(req.species_id)
        .bind(req.year)
        .bind(&req.cosewic_status)
        .bind(&req.sara_status)
        .bind(&req.doc_type)
        .fetch_one(&mut **tx)
        .await
        .map_err(Error::Database)?;

        Ok(row.get("assessment_id"))
    }
}

#[async_trait]
impl AssessmentRepository for PgAssessmentRepository {
    async fn insert(&self, req: CreateAssessmentRequest) -> Result<i64> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        let id = self.insert_tx(&mut tx, &req).await?;
        tx.commit().await.map_err(Error::Database)?;
        Ok(id)
    }

    async fn count(&self) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM status_assessments")
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)
    }
}
