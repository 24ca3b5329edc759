//! Location repository implementation.

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Transaction};

use cansar_core::{CreateLocationRequest, Error, LocationRepository, Result};

/// PostgreSQL implementation of LocationRepository.
#[derive(Clone)]
pub struct PgLocationRepository {
    pool: Pool<Postgres>,
}

impl PgLocationRepository {
    /// Create a new PgLocationRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Insert a location within a caller-supplied transaction.
    pub async fn insert_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        req: &CreateLocationRequest,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO locations (species_id, province_territory, eoo, iao)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(req.species_id)
        .bind(&req.province_territory)
        .bind(req.eoo)
        .bind(req.iao)
        .execute(&mut **tx)
        .await
        .map_err(Error::Database)?;

        Ok(())
    }
}

#[async_trait]
impl LocationRepository for PgLocationRepository {
    async fn insert(&self, req: CreateLocationRequest) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        self.insert_tx(&mut tx, &req).await?;
        tx.commit().await.map_err(Error::Database)?;
        Ok(())
    }

    async fn count(&self) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM locations")
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)
    }
}
