//! The chunked CAN-SAR ingestion pipeline.
//!
//! Streams the source table in fixed-size batches, normalizes each row,
//! and commits each batch as one database transaction. Two error strata:
//! a malformed row becomes a logged skip and the run continues; a failure
//! while inserting or committing a batch discards that batch's work and
//! the run continues with the next batch. No error is retried.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, trace, warn};

use cansar_core::defaults::BATCH_SIZE;
use cansar_core::{Error, Result};
use cansar_db::Database;

use crate::normalize::{normalize_row, RowEntities, RowOutcome};
use crate::reader::ChunkedReader;

/// Configuration for one ingestion run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Rows per batch; each batch commits as one transaction.
    pub batch_size: usize,
    /// Optional cap on source rows read this run.
    pub max_rows: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_size: BATCH_SIZE,
            max_rows: None,
        }
    }
}

impl PipelineConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the batch size.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set the row cap.
    pub fn with_max_rows(mut self, max_rows: Option<u64>) -> Self {
        self.max_rows = max_rows;
        self
    }
}

/// Per-entity record counts created by one committed batch.
#[derive(Debug, Default, Clone, Copy)]
struct BatchDelta {
    species: u64,
    assessments: u64,
    locations: u64,
    threats: u64,
    actions: u64,
}

/// Outcome of one ingestion run.
#[derive(Debug, Default, Clone)]
pub struct IngestSummary {
    /// Species records created.
    pub species: u64,
    /// Status assessment records created.
    pub assessments: u64,
    /// Location records created.
    pub locations: u64,
    /// Threat records created.
    pub threats: u64,
    /// Action records created.
    pub actions: u64,
    /// Source rows read (including skipped rows).
    pub rows_read: u64,
    /// Rows skipped by normalization.
    pub rows_skipped: u64,
    /// Batches committed.
    pub batches_committed: u64,
    /// Batches discarded after a failure.
    pub batches_failed: u64,
    /// Total wall time of the run.
    pub elapsed: Duration,
}

impl IngestSummary {
    fn absorb(&mut self, delta: BatchDelta) {
        self.species += delta.species;
        self.assessments += delta.assessments;
        self.locations += delta.locations;
        self.threats += delta.threats;
        self.actions += delta.actions;
    }
}

impl fmt::Display for IngestSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Inserted records:")?;
        writeln!(f, "  Species: {}", self.species)?;
        writeln!(f, "  Status Assessments: {}", self.assessments)?;
        writeln!(f, "  Locations: {}", self.locations)?;
        writeln!(f, "  Threats: {}", self.threats)?;
        writeln!(f, "  Actions: {}", self.actions)?;
        write!(
            f,
            "Rows read: {} ({} skipped), elapsed: {:.2}s",
            self.rows_read,
            self.rows_skipped,
            self.elapsed.as_secs_f64()
        )
    }
}

/// Chunked, per-batch-transactional loader for the CAN-SAR source table.
pub struct IngestPipeline<'a> {
    db: &'a Database,
    config: PipelineConfig,
}

impl<'a> IngestPipeline<'a> {
    /// Create a pipeline over an explicitly provided database handle.
    pub fn new(db: &'a Database, config: PipelineConfig) -> Self {
        Self { db, config }
    }

    /// Run the full ingestion over the given source file.
    pub async fn run(&self, path: &Path) -> Result<IngestSummary> {
        let start = Instant::now();

        info!(
            subsystem = "ingest",
            component = "pipeline",
            op = "start",
            path = %path.display(),
            batch_size = self.config.batch_size,
            max_rows = self.config.max_rows,
            "Starting CAN-SAR ingestion"
        );

        let mut reader = ChunkedReader::open(path, self.config.batch_size, self.config.max_rows)?;
        let mut seen_species: HashSet<i32> = HashSet::new();
        let mut summary = IngestSummary::default();
        let mut batch_index: u64 = 0;

        while let Some(batch) = reader.next_batch()? {
            batch_index += 1;
            debug!(
                subsystem = "ingest",
                component = "pipeline",
                batch = batch_index,
                rows = batch.len(),
                "Processing chunk"
            );

            let mut entities: Vec<RowEntities> = Vec::with_capacity(batch.len());
            let mut batch_species: HashSet<i32> = HashSet::new();
            for row in &batch {
                match normalize_row(row, &seen_species, &mut batch_species) {
                    RowOutcome::Entities(row_entities) => entities.push(*row_entities),
                    RowOutcome::Skipped { position, reason } => {
                        summary.rows_skipped += 1;
                        warn!(
                            subsystem = "ingest",
                            component = "pipeline",
                            op = "row_skip",
                            row = position,
                            reason = %reason,
                            "Skipping row"
                        );
                    }
                }
            }

            match self.insert_batch(&entities).await {
                Ok(delta) => {
                    // Species ids join the run-level set only once their
                    // batch is committed.
                    seen_species.extend(batch_species);
                    summary.absorb(delta);
                    summary.batches_committed += 1;
                    info!(
                        subsystem = "ingest",
                        component = "pipeline",
                        op = "batch_commit",
                        batch = batch_index,
                        rows_read = reader.rows_read(),
                        "Chunk committed"
                    );
                }
                Err(e) => {
                    // The dropped transaction rolls the whole chunk back;
                    // its species ids never reach the run set, so later
                    // rows can re-emit them.
                    summary.batches_failed += 1;
                    error!(
                        subsystem = "ingest",
                        component = "pipeline",
                        op = "batch_discard",
                        batch = batch_index,
                        error = %e,
                        "Batch failed; discarding chunk and continuing"
                    );
                }
            }
        }

        summary.rows_read = reader.rows_read();
        summary.elapsed = start.elapsed();

        info!(
            subsystem = "ingest",
            component = "pipeline",
            op = "complete",
            rows_read = summary.rows_read,
            rows_skipped = summary.rows_skipped,
            record_count = summary.assessments,
            duration_ms = summary.elapsed.as_millis() as u64,
            "CAN-SAR ingestion complete"
        );

        Ok(summary)
    }

    /// Insert one batch of normalized rows inside a single transaction.
    ///
    /// Insert order per row is species, assessment, locations, threats,
    /// action; the assessment id returned by the insert links its threats
    /// and action.
    async fn insert_batch(&self, entities: &[RowEntities]) -> Result<BatchDelta> {
        let mut tx = self.db.pool.begin().await.map_err(Error::Database)?;
        let mut delta = BatchDelta::default();

        for row in entities {
            if let Some(species) = &row.species {
                self.db.species.insert_tx(&mut tx, species).await?;
                delta.species += 1;
            }

            let assessment_id = self.db.assessments.insert_tx(&mut tx, &row.assessment).await?;
            delta.assessments += 1;

            for location in &row.locations {
                self.db.locations.insert_tx(&mut tx, location).await?;
                delta.locations += 1;
            }

            for threat in &row.threats {
                self.db.threats.insert_tx(&mut tx, assessment_id, threat).await?;
                delta.threats += 1;
            }

            if let Some(action) = &row.action {
                self.db.actions.insert_tx(&mut tx, assessment_id, action).await?;
                delta.actions += 1;
            }

            trace!(
                subsystem = "ingest",
                component = "pipeline",
                row = row.position,
                "Row inserted"
            );
        }

        tx.commit().await.map_err(Error::Database)?;
        Ok(delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_config_builder() {
        let config = PipelineConfig::new()
            .with_batch_size(25)
            .with_max_rows(Some(1000));

        assert_eq!(config.batch_size, 25);
        assert_eq!(config.max_rows, Some(1000));
    }

    #[test]
    fn test_default_batch_size() {
        assert_eq!(PipelineConfig::default().batch_size, BATCH_SIZE);
    }

    #[test]
    fn test_summary_display_lists_every_entity() {
        let summary = IngestSummary {
            species: 3,
            assessments: 5,
            locations: 7,
            threats: 2,
            actions: 1,
            rows_read: 6,
            rows_skipped: 1,
            batches_committed: 1,
            batches_failed: 0,
            elapsed: Duration::from_millis(1500),
        };

        let text = summary.to_string();
        assert!(text.contains("Species: 3"));
        assert!(text.contains("Status Assessments: 5"));
        assert!(text.contains("Locations: 7"));
        assert!(text.contains("Threats: 2"));
        assert!(text.contains("Actions: 1"));
        assert!(text.contains("1 skipped"));
    }
}
