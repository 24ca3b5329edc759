//! Species repository implementation.

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Transaction};

use cansar_core::{CreateSpeciesRequest, Error, Result, SpeciesRepository};

/// PostgreSQL implementation of SpeciesRepository.
#[derive(Clone)]
pub struct PgSpeciesRepository {
    pool: Pool<Postgres>,
}

impl PgSpeciesRepository {
    /// Create a new PgSpeciesRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Insert a species within a caller-supplied transaction.
    pub async fn insert_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        req: &CreateSpeciesRequest,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO species (
                species_id, common_name, scientific_name, taxonomic_group,
                endemic_na, endemic_canada
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(req.species_id)
        .bind(&req.common_name)
        .bind(&req.scientific_name)
        .bind(&req.taxonomic_group)
        .bind(req.endemic_na)
        .bind(req.endemic_canada)
        .execute(&mut **tx)
        .await
        .map_err(Error::Database)?;

        Ok(())
    }
}

#[async_trait]
impl SpeciesRepository for PgSpeciesRepository {
    async fn insert(&self, req: CreateSpeciesRequest) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        self.insert_tx(&mut tx, &req).await?;
        tx.commit().await.map_err(Error::Database)?;
        Ok(())
    }

    async fn exists(&self, species_id: i32) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM species WHERE species_id = $1)")
                .bind(species_id)
                .fetch_one(&self.pool)
                .await
                .map_err(Error::Database)?;

        Ok(exists)
    }

    async fn count(&self) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM species")
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)
    }
}
