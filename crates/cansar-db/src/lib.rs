//! # cansar-db
//!
//! PostgreSQL database layer for the CAN-SAR data pipeline.
//!
//! This crate provides:
//! - Connection pool management
//! - Repository implementations for the six conservation entities
//! - Transaction-scoped (`_tx`) insert variants so an ingestion batch
//!   commits as a unit
//! - Embedded schema migrations
//!
//! ## Example
//!
//! ```rust,ignore
//! use cansar_db::Database;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/cansar").await?;
//!     db.migrate().await?;
//!
//!     let species_total = db.species.count().await?;
//!     println!("{} species loaded", species_total);
//!     Ok(())
//! }
//! ```

pub mod actions;
pub mod assessments;
pub mod locations;
pub mod pool;
pub mod species;
pub mod threats;
pub mod trends;

// Re-export core types
pub use cansar_core::*;

// Re-export repository implementations
pub use actions::PgActionRepository;
pub use assessments::PgAssessmentRepository;
pub use locations::PgLocationRepository;
pub use pool::create_pool;
pub use species::PgSpeciesRepository;
pub use threats::PgThreatRepository;
pub use trends::PgCsiTrendRepository;

/// Combined database context with all repositories.
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Species repository.
    pub species: PgSpeciesRepository,
    /// Status assessment repository.
    pub assessments: PgAssessmentRepository,
    /// Threat repository.
    pub threats: PgThreatRepository,
    /// Recovery action repository.
    pub actions: PgActionRepository,
    /// Location repository.
    pub locations: PgLocationRepository,
    /// CSI trend repository.
    pub trends: PgCsiTrendRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            species: PgSpeciesRepository::new(pool.clone()),
            assessments: PgAssessmentRepository::new(pool.clone()),
            threats: PgThreatRepository::new(pool.clone()),
            actions: PgActionRepository::new(pool.clone()),
            locations: PgLocationRepository::new(pool.clone()),
            trends: PgCsiTrendRepository::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Internal(format!("Migration failed: {}", e)))?;
        Ok(())
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self::new(self.pool.clone())
    }
}
