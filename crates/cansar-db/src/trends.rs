//! CSI trend repository implementation.

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Transaction};

use cansar_core::{CsiTrend, CsiTrendRepository, Error, Result};

/// PostgreSQL implementation of CsiTrendRepository.
#[derive(Clone)]
pub struct PgCsiTrendRepository {
    pool: Pool<Postgres>,
}

impl PgCsiTrendRepository {
    /// Create a new PgCsiTrendRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Insert one trend year within a caller-supplied transaction.
    pub async fn insert_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        trend: &CsiTrend,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO csi_trends (
                year, national_index, birds_index, mammals_index, fish_index,
                number_species, number_bird_species, number_mammal_species,
                number_fish_species
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(trend.year)
        .bind(trend.national_index)
        .bind(trend.birds_index)
        .bind(trend.mammals_index)
        .bind(trend.fish_index)
        .bind(trend.number_species)
        .bind(trend.number_bird_species)
        .bind(trend.number_mammal_species)
        .bind(trend.number_fish_species)
        .execute(&mut **tx)
        .await
        .map_err(Error::Database)?;

        Ok(())
    }
}

#[async_trait]
impl CsiTrendRepository for PgCsiTrendRepository {
    async fn insert(&self, trend: CsiTrend) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        self.insert_tx(&mut tx, &trend).await?;
        tx.commit().await.map_err(Error::Database)?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<CsiTrend>> {
        let trends = sqlx::query_as::<_, CsiTrend>(
            r#"
            SELECT year, national_index, birds_index, mammals_index, fish_index,
                   number_species, number_bird_species, number_mammal_species,
                   number_fish_species
            FROM csi_trends
            ORDER BY year
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(trends)
    }

    async fn count(&self) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM csi_trends")
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)
    }
}
