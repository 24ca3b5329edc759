//! Centralized default constants for the cansar pipeline.
//!
//! **This module is the single source of truth** for shared default values.
//! All crates reference these constants instead of defining their own magic
//! numbers.

// =============================================================================
// INGESTION
// =============================================================================

/// Number of source rows processed and committed per batch.
pub const BATCH_SIZE: usize = 100;

/// Number of CSI trend rows inserted between commits.
pub const CSI_COMMIT_INTERVAL: usize = 10;

/// Trailing footnote lines at the end of the CSI source file.
pub const CSI_FOOTER_ROWS: usize = 3;

// =============================================================================
// SOURCE FORMAT
// =============================================================================

/// Field delimiter of the species-assessment source table.
pub const CANSAR_DELIMITER: char = '\t';

/// Field delimiter of the CSI trend source file.
pub const CSI_DELIMITER: char = ',';
