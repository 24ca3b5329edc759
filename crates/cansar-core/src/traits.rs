//! Core traits for the cansar data access layer.
//!
//! These traits define the interfaces the concrete PostgreSQL repositories
//! satisfy. Transaction-scoped variants (`insert_tx`) are inherent methods
//! on the Pg types in `cansar-db`, since they are tied to a concrete
//! database transaction type.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::*;

/// Repository for species records.
#[async_trait]
pub trait SpeciesRepository: Send + Sync {
    /// Insert a new species.
    async fn insert(&self, req: CreateSpeciesRequest) -> Result<()>;

    /// Whether a species with this identifier already exists.
    async fn exists(&self, species_id: i32) -> Result<bool>;

    /// Total number of species rows.
    async fn count(&self) -> Result<i64>;
}

/// Repository for status assessment records.
#[async_trait]
pub trait AssessmentRepository: Send + Sync {
    /// Insert a new assessment, returning the database-assigned id.
    async fn insert(&self, req: CreateAssessmentRequest) -> Result<i64>;

    /// Total number of assessment rows.
    async fn count(&self) -> Result<i64>;
}

/// Repository for threat records.
#[async_trait]
pub trait ThreatRepository: Send + Sync {
    /// Insert a threat for the given assessment.
    async fn insert(&self, assessment_id: i64, req: CreateThreatRequest) -> Result<()>;

    /// Total number of threat rows.
    async fn count(&self) -> Result<i64>;
}

/// Repository for recovery action records.
#[async_trait]
pub trait ActionRepository: Send + Sync {
    /// Insert an action for the given assessment.
    async fn insert(&self, assessment_id: i64, req: CreateActionRequest) -> Result<()>;

    /// Total number of action rows.
    async fn count(&self) -> Result<i64>;
}

/// Repository for location records.
#[async_trait]
pub trait LocationRepository: Send + Sync {
    /// Insert a location occurrence.
    async fn insert(&self, req: CreateLocationRequest) -> Result<()>;

    /// Total number of location rows.
    async fn count(&self) -> Result<i64>;
}

/// Repository for the flat CSI trend table.
#[async_trait]
pub trait CsiTrendRepository: Send + Sync {
    /// Insert one year of the index.
    async fn insert(&self, trend: CsiTrend) -> Result<()>;

    /// Fetch the full series, ordered by year.
    async fn list(&self) -> Result<Vec<CsiTrend>>;

    /// Total number of trend rows.
    async fn count(&self) -> Result<i64>;
}
