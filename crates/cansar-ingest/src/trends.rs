//! Loader for the yearly Canadian Species Index table.
//!
//! The CSI source is a small comma-delimited file with three trailing
//! footnote lines. Rows insert in sub-batches of 10 with a commit after
//! each sub-batch; a failing row rolls back alone (savepoint) and the load
//! continues.

use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

use sqlx::Acquire;
use tracing::{debug, info, warn};

use cansar_core::defaults::{CSI_COMMIT_INTERVAL, CSI_DELIMITER, CSI_FOOTER_ROWS};
use cansar_core::{CsiTrend, Error, Result};
use cansar_db::Database;

use crate::source::RawValue;

const YEAR: &str = "Year";
const NATIONAL_INDEX: &str = "National index (cumulative percentage change since 1970)";
const BIRDS_INDEX: &str = "Birds index (cumulative percentage change since 1970)";
const MAMMALS_INDEX: &str = "Mammals index (cumulative percentage change since 1970)";
const FISH_INDEX: &str = "Fish index (cumulative percentage change since 1970)";
const NUMBER_SPECIES: &str = "Number of species";
const NUMBER_BIRD_SPECIES: &str = "Number of bird species";
const NUMBER_MAMMAL_SPECIES: &str = "Number of mammal species";
const NUMBER_FISH_SPECIES: &str = "Number of fish species";

/// Parse the CSI file content into trend records.
///
/// Discards the trailing footnote lines and rows that are entirely empty.
/// Rows without a parseable year are logged and skipped.
pub fn parse_csi_content(content: &str) -> Result<Vec<CsiTrend>> {
    let lines: Vec<&str> = content.lines().collect();
    if lines.is_empty() {
        return Err(Error::Source("CSI file has no header line".to_string()));
    }

    let header: HashMap<&str, usize> = lines[0]
        .split(CSI_DELIMITER)
        .enumerate()
        .map(|(idx, name)| (name.trim(), idx))
        .collect();
    let column = |name: &str| -> Result<usize> {
        header
            .get(name)
            .copied()
            .ok_or_else(|| Error::Source(format!("CSI file missing column: {name}")))
    };

    let year_col = column(YEAR)?;
    let national_col = column(NATIONAL_INDEX)?;
    let birds_col = column(BIRDS_INDEX)?;
    let mammals_col = column(MAMMALS_INDEX)?;
    let fish_col = column(FISH_INDEX)?;
    let species_col = column(NUMBER_SPECIES)?;
    let bird_species_col = column(NUMBER_BIRD_SPECIES)?;
    let mammal_species_col = column(NUMBER_MAMMAL_SPECIES)?;
    let fish_species_col = column(NUMBER_FISH_SPECIES)?;

    let end = lines.len().saturating_sub(CSI_FOOTER_ROWS).max(1);
    let mut trends = Vec::new();

    for (offset, line) in lines[1..end].iter().enumerate() {
        let cells: Vec<RawValue> = line.split(CSI_DELIMITER).map(RawValue::parse).collect();
        if cells.iter().all(RawValue::is_missing) {
            continue;
        }

        let cell = |idx: usize| cells.get(idx).cloned().unwrap_or(RawValue::Missing);
        let year = match cell(year_col).as_i32() {
            Some(year) => year,
            None => {
                warn!(
                    subsystem = "ingest",
                    component = "csi",
                    row = offset + 1,
                    "CSI row has no parseable year; skipping"
                );
                continue;
            }
        };

        trends.push(CsiTrend {
            year,
            national_index: cell(national_col).as_f64(),
            birds_index: cell(birds_col).as_f64(),
            mammals_index: cell(mammals_col).as_f64(),
            fish_index: cell(fish_col).as_f64(),
            number_species: cell(species_col).as_i32(),
            number_bird_species: cell(bird_species_col).as_i32(),
            number_mammal_species: cell(mammal_species_col).as_i32(),
            number_fish_species: cell(fish_species_col).as_i32(),
        });
    }

    Ok(trends)
}

/// Load the CSI trend file into the csi_trends table.
///
/// Returns the number of records inserted.
pub async fn load_csi_trends(db: &Database, path: &Path) -> Result<u64> {
    let start = Instant::now();

    info!(
        subsystem = "ingest",
        component = "csi",
        op = "start",
        path = %path.display(),
        "Loading CSI trend data"
    );

    let content = std::fs::read_to_string(path)?;
    let trends = parse_csi_content(&content)?;

    info!(
        subsystem = "ingest",
        component = "csi",
        record_count = trends.len(),
        "Inserting CSI trend records"
    );

    let mut inserted: u64 = 0;
    let mut pending: usize = 0;
    let mut tx = db.pool.begin().await.map_err(Error::Database)?;

    for trend in &trends {
        let row_result = {
            let mut savepoint = tx.begin().await.map_err(Error::Database)?;
            match db.trends.insert_tx(&mut savepoint, trend).await {
                Ok(()) => savepoint.commit().await.map_err(Error::Database),
                Err(e) => {
                    let _ = savepoint.rollback().await;
                    Err(e)
                }
            }
        };

        match row_result {
            Ok(()) => {
                inserted += 1;
                pending += 1;
            }
            Err(e) => {
                warn!(
                    subsystem = "ingest",
                    component = "csi",
                    op = "row_rollback",
                    year = trend.year,
                    error = %e,
                    "Failed to insert CSI record; rolled back row"
                );
            }
        }

        if pending >= CSI_COMMIT_INTERVAL {
            tx.commit().await.map_err(Error::Database)?;
            debug!(
                subsystem = "ingest",
                component = "csi",
                record_count = inserted,
                "Committed CSI sub-batch"
            );
            tx = db.pool.begin().await.map_err(Error::Database)?;
            pending = 0;
        }
    }

    tx.commit().await.map_err(Error::Database)?;

    info!(
        subsystem = "ingest",
        component = "csi",
        op = "complete",
        record_count = inserted,
        duration_ms = start.elapsed().as_millis() as u64,
        "CSI trend load complete"
    );

    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Year,National index (cumulative percentage change since 1970),Birds index (cumulative percentage change since 1970),Mammals index (cumulative percentage change since 1970),Fish index (cumulative percentage change since 1970),Number of species,Number of bird species,Number of mammal species,Number of fish species";

    #[test]
    fn test_parse_discards_trailing_footnotes() {
        let content = format!(
            "{HEADER}\n1970,0,0,0,0,883,385,106,392\n1971,-0.3,0.4,-1.1,-0.2,883,385,106,392\nNote: indices are cumulative.\nSource: ECCC.\nRetrieved 2024.\n"
        );
        let trends = parse_csi_content(&content).unwrap();

        assert_eq!(trends.len(), 2);
        assert_eq!(trends[0].year, 1970);
        assert_eq!(trends[1].national_index, Some(-0.3));
        assert_eq!(trends[1].number_species, Some(883));
    }

    #[test]
    fn test_parse_skips_entirely_empty_rows() {
        let content = format!(
            "{HEADER}\n1970,0,0,0,0,883,385,106,392\n,,,,,,,,\nfoot\nfoot\nfoot\n"
        );
        let trends = parse_csi_content(&content).unwrap();
        assert_eq!(trends.len(), 1);
    }

    #[test]
    fn test_parse_skips_rows_without_year() {
        let content = format!(
            "{HEADER}\nTotal,1,1,1,1,,,,\n1980,2.5,,,,900,,,\nfoot\nfoot\nfoot\n"
        );
        let trends = parse_csi_content(&content).unwrap();

        assert_eq!(trends.len(), 1);
        assert_eq!(trends[0].year, 1980);
        assert_eq!(trends[0].birds_index, None);
    }

    #[test]
    fn test_parse_requires_named_columns() {
        let err = parse_csi_content("Year,Something\n1970,1\n").unwrap_err();
        assert!(err.to_string().contains("missing column"));
    }

    #[test]
    fn test_parse_empty_content_is_source_error() {
        assert!(parse_csi_content("").is_err());
    }

    #[test]
    fn test_missing_index_values_stay_null() {
        let content = format!("{HEADER}\n1990,NA,3.2,,N/A,910,390,110,410\nfoot\nfoot\nfoot\n");
        let trends = parse_csi_content(&content).unwrap();

        assert_eq!(trends[0].national_index, None);
        assert_eq!(trends[0].birds_index, Some(3.2));
        assert_eq!(trends[0].mammals_index, None);
        assert_eq!(trends[0].fish_index, None);
    }
}
