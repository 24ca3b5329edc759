//! Threat repository implementation.

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Transaction};

use cansar_core::{CreateThreatRequest, Error, Result, ThreatRepository};

/// PostgreSQL implementation of ThreatRepository.
#[derive(Clone)]
pub struct PgThreatRepository {
    pool: Pool<Postgres>,
}

impl PgThreatRepository {
    /// Create a new PgThreatRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Insert a threat within a caller-supplied transaction.
    pub async fn insert_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        assessment_id: i64,
        req: &CreateThreatRequest,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO threats (
                assessment_id, iucn_threat_code, impact, scope, severity, timing
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(assessment_id)
        .bind(req.code.code())
        .bind(&req.impact)
        .bind(&req.scope)
        .bind(&req.severity)
        .bind(&req.timing)
        .execute(&mut **tx)
        .await
        .map_err(Error::Database)?;

        Ok(())
    }
}

#[async_trait]
impl ThreatRepository for PgThreatRepository {
    async fn insert(&self, assessment_id: i64, req: CreateThreatRequest) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        self.insert_tx(&mut tx, assessment_id, &req).await?;
        tx.commit().await.map_err(Error::Database)?;
        Ok(())
    }

    async fn count(&self) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM threats")
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)
    }
}
