//! # cansar-ingest
//!
//! Chunked ingestion pipeline for the CAN-SAR source tables.
//!
//! This crate provides:
//! - A typed row schema over the tab-delimited species-assessment export
//! - A streaming batch reader with an optional run-level row cap
//! - Per-row normalization into the conservation entities, with explicit
//!   skip outcomes and run-level species deduplication
//! - A per-batch-transactional pipeline with per-entity count reporting
//! - The Canadian Species Index trend loader
//!
//! ## Example
//!
//! ```rust,ignore
//! use cansar_db::Database;
//! use cansar_ingest::{IngestPipeline, PipelineConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/cansar").await?;
//!     let pipeline = IngestPipeline::new(&db, PipelineConfig::new().with_max_rows(Some(1000)));
//!     let summary = pipeline.run("data/CAN-SAR_database.tsv".as_ref()).await?;
//!     println!("{summary}");
//!     Ok(())
//! }
//! ```

pub mod normalize;
pub mod pipeline;
pub mod reader;
pub mod source;
pub mod trends;

pub use normalize::{normalize_row, RowEntities, RowOutcome, SkipReason};
pub use pipeline::{IngestPipeline, IngestSummary, PipelineConfig};
pub use reader::ChunkedReader;
pub use source::{RawValue, RowSchema, SourceRow, ThreatCells};
pub use trends::{load_csi_trends, parse_csi_content};
