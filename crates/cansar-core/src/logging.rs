//! Structured logging schema and field name constants for the cansar crates.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation tools can query by standardized field names across
//! every subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Batch-level failures, unusable source files |
//! | WARN  | Skipped rows, recoverable per-row failures |
//! | INFO  | Run lifecycle, per-batch commits, final summaries |
//! | DEBUG | Decision points, config choices |
//! | TRACE | Per-row entity emission |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "db", "ingest", "loader"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "pool", "pipeline", "csi"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "batch_commit", "row_skip", "load"
pub const OPERATION: &str = "op";

// ─── Ingestion fields ──────────────────────────────────────────────────────

/// 1-based ordinal of a source row within the run.
pub const ROW_POSITION: &str = "row";

/// 1-based ordinal of a batch within the run.
pub const BATCH_INDEX: &str = "batch";

/// Number of source rows read so far.
pub const ROWS_READ: &str = "rows_read";

/// Number of records affected by an operation.
pub const RECORD_COUNT: &str = "record_count";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

// ─── Database fields ───────────────────────────────────────────────────────

/// Number of active connections in the pool.
pub const POOL_SIZE: &str = "pool_size";

/// Number of idle connections in the pool.
pub const POOL_IDLE: &str = "pool_idle";

/// Database table or entity affected.
pub const DB_TABLE: &str = "db_table";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
