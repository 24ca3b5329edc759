//! Typed view over the CAN-SAR source table.
//!
//! The source is a tab-delimited export with a fixed, named column set.
//! `RowSchema` resolves column positions once from the header line, and
//! `SourceRow` carries every cell as a [`RawValue`] classified at parse
//! time. All interpretation of cells (missing-value mapping, numeric vs.
//! text) happens here, so downstream normalization never sees a raw
//! missing-value marker.

use cansar_core::{Error, Result, ThreatCategory};
use std::collections::HashMap;

/// Markers treated as a missing value, in addition to the empty cell.
const MISSING_TOKENS: [&str; 6] = ["NA", "N/A", "NaN", "nan", "null", "NULL"];

/// A source cell, classified at parse time.
///
/// Numeric classification is decided by the cell alone: a cell that lexes
/// as a finite number is `Number`, anything else non-missing is `Text`.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    /// Absent cell or a recognized missing-value marker.
    Missing,
    /// Cell that lexes as a finite number.
    Number(f64),
    /// Any other non-empty cell.
    Text(String),
}

impl RawValue {
    /// Classify one cell.
    pub fn parse(cell: &str) -> RawValue {
        let trimmed = cell.trim();
        if trimmed.is_empty() || MISSING_TOKENS.contains(&trimmed) {
            return RawValue::Missing;
        }
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => RawValue::Number(n),
            _ => RawValue::Text(trimmed.to_string()),
        }
    }

    /// Whether the cell is missing.
    pub fn is_missing(&self) -> bool {
        matches!(self, RawValue::Missing)
    }

    /// Strict identified-flag check: a numeric cell equal to 1.
    ///
    /// A text cell `"1"` does not match, nor does any other truthy value.
    pub fn is_numeric_one(&self) -> bool {
        matches!(self, RawValue::Number(n) if *n == 1.0)
    }

    /// Numeric value, if the cell is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RawValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric value truncated to an integer, if the cell is numeric.
    pub fn as_i32(&self) -> Option<i32> {
        self.as_f64().map(|n| n as i32)
    }

    /// Textual value: text cells verbatim, numeric cells rendered.
    pub fn as_text(&self) -> Option<String> {
        match self {
            RawValue::Missing => None,
            RawValue::Number(n) => Some(n.to_string()),
            RawValue::Text(s) => Some(s.clone()),
        }
    }

    /// Boolean flag with missing-defaults-to-false semantics: a nonzero
    /// numeric cell or the text `true` (case-insensitive).
    pub fn as_flag(&self) -> bool {
        match self {
            RawValue::Missing => false,
            RawValue::Number(n) => *n != 0.0,
            RawValue::Text(s) => s.eq_ignore_ascii_case("true"),
        }
    }
}

/// The five per-category threat cells of one source row.
#[derive(Debug, Clone)]
pub struct ThreatCells {
    pub identified: RawValue,
    pub impact: RawValue,
    pub scope: RawValue,
    pub severity: RawValue,
    pub timing: RawValue,
}

/// One source row with every field classified.
#[derive(Debug, Clone)]
pub struct SourceRow {
    /// 1-based ordinal among data rows in this run.
    pub position: u64,
    pub species_id: RawValue,
    pub common_name: RawValue,
    pub scientific_name: RawValue,
    pub taxonomic_group: RawValue,
    pub endemic_na: RawValue,
    pub endemic_canada: RawValue,
    pub year_published: RawValue,
    pub cosewic_status: RawValue,
    pub sara_status: RawValue,
    pub doc_type: RawValue,
    pub ranges: RawValue,
    pub eoo: RawValue,
    pub iao: RawValue,
    pub threats: [ThreatCells; 11],
    pub action_type: RawValue,
    pub action_subtype: RawValue,
    pub action_notes: RawValue,
}

/// Column positions per threat category; absent columns stay `None` and
/// read as missing for every row.
#[derive(Debug, Clone, Copy)]
struct ThreatColumns {
    identified: Option<usize>,
    impact: Option<usize>,
    scope: Option<usize>,
    severity: Option<usize>,
    timing: Option<usize>,
}

/// Header-resolved column layout of the source table.
///
/// Columns are located by name; column order is not significant. The core
/// species/assessment/location columns are required and header resolution
/// fails fast when any is absent. Threat and action columns are optional,
/// matching sources exported without them.
#[derive(Debug, Clone)]
pub struct RowSchema {
    delimiter: char,
    species_id: usize,
    common_name: usize,
    scientific_name: usize,
    taxonomic_group: usize,
    endemic_na: usize,
    endemic_canada: usize,
    year_published: usize,
    cosewic_status: usize,
    sara_status: usize,
    doc_type: usize,
    ranges: usize,
    eoo: usize,
    iao: usize,
    threats: [ThreatColumns; 11],
    action_type: Option<usize>,
    action_subtype: Option<usize>,
    action_notes: Option<usize>,
}

impl RowSchema {
    /// Resolve column positions from the header line.
    pub fn from_header(header: &str, delimiter: char) -> Result<RowSchema> {
        let mut columns: HashMap<&str, usize> = HashMap::new();
        for (idx, name) in header.split(delimiter).enumerate() {
            columns.entry(name.trim()).or_insert(idx);
        }

        let mut absent = Vec::new();
        let mut required = |name: &str| -> usize {
            match columns.get(name) {
                Some(idx) => *idx,
                None => {
                    absent.push(name.to_string());
                    usize::MAX
                }
            }
        };

        let schema = RowSchema {
            delimiter,
            species_id: required("speciesID"),
            common_name: required("common_name"),
            scientific_name: required("species"),
            taxonomic_group: required("taxonomic_group"),
            endemic_na: required("endemic_NA"),
            endemic_canada: required("endemic_canada"),
            year_published: required("year_published"),
            cosewic_status: required("cosewic_status"),
            sara_status: required("sara_status"),
            doc_type: required("doc_type"),
            ranges: required("ranges"),
            eoo: required("EOO"),
            iao: required("IAO"),
            threats: ThreatCategory::ALL.map(|category| {
                let code = category.code();
                ThreatColumns {
                    identified: columns.get(format!("{code}_threat_identified").as_str()).copied(),
                    impact: columns.get(format!("{code}_iucn_impact").as_str()).copied(),
                    scope: columns.get(format!("{code}_iucn_scope").as_str()).copied(),
                    severity: columns.get(format!("{code}_iucn_severity").as_str()).copied(),
                    timing: columns.get(format!("{code}_iucn_timing").as_str()).copied(),
                }
            }),
            action_type: columns.get("action_type").copied(),
            action_subtype: columns.get("action_subtype").copied(),
            action_notes: columns.get("notes_action_subtype").copied(),
        };

        if !absent.is_empty() {
            return Err(Error::Source(format!(
                "missing required columns: {}",
                absent.join(", ")
            )));
        }

        Ok(schema)
    }

    /// Parse one data line into a typed row.
    ///
    /// Short lines read as missing beyond their last cell; surplus cells
    /// are ignored.
    pub fn parse_row(&self, line: &str, position: u64) -> SourceRow {
        let cells: Vec<&str> = line.split(self.delimiter).collect();
        let cell = |idx: usize| -> RawValue {
            cells.get(idx).map(|c| RawValue::parse(c)).unwrap_or(RawValue::Missing)
        };
        let opt_cell = |idx: Option<usize>| -> RawValue {
            idx.map(&cell).unwrap_or(RawValue::Missing)
        };

        SourceRow {
            position,
            species_id: cell(self.species_id),
            common_name: cell(self.common_name),
            scientific_name: cell(self.scientific_name),
            taxonomic_group: cell(self.taxonomic_group),
            endemic_na: cell(self.endemic_na),
            endemic_canada: cell(self.endemic_canada),
            year_published: cell(self.year_published),
            cosewic_status: cell(self.cosewic_status),
            sara_status: cell(self.sara_status),
            doc_type: cell(self.doc_type),
            ranges: cell(self.ranges),
            eoo: cell(self.eoo),
            iao: cell(self.iao),
            threats: self.threats.map(|t| ThreatCells {
                identified: opt_cell(t.identified),
                impact: opt_cell(t.impact),
                scope: opt_cell(t.scope),
                severity: opt_cell(t.severity),
                timing: opt_cell(t.timing),
            }),
            action_type: opt_cell(self.action_type),
            action_subtype: opt_cell(self.action_subtype),
            action_notes: opt_cell(self.action_notes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_value_missing_markers() {
        assert_eq!(RawValue::parse(""), RawValue::Missing);
        assert_eq!(RawValue::parse("  "), RawValue::Missing);
        assert_eq!(RawValue::parse("NA"), RawValue::Missing);
        assert_eq!(RawValue::parse("N/A"), RawValue::Missing);
        assert_eq!(RawValue::parse("NaN"), RawValue::Missing);
        assert_eq!(RawValue::parse("null"), RawValue::Missing);
    }

    #[test]
    fn test_raw_value_numeric_classification() {
        assert_eq!(RawValue::parse("1"), RawValue::Number(1.0));
        assert_eq!(RawValue::parse("12.5"), RawValue::Number(12.5));
        assert_eq!(RawValue::parse("-3"), RawValue::Number(-3.0));
        assert_eq!(
            RawValue::parse("Endangered"),
            RawValue::Text("Endangered".to_string())
        );
    }

    #[test]
    fn test_is_numeric_one_is_strict() {
        assert!(RawValue::Number(1.0).is_numeric_one());
        assert!(RawValue::parse("1").is_numeric_one());
        assert!(RawValue::parse("1.0").is_numeric_one());

        assert!(!RawValue::Text("1".to_string()).is_numeric_one());
        assert!(!RawValue::Number(2.0).is_numeric_one());
        assert!(!RawValue::Text("true".to_string()).is_numeric_one());
        assert!(!RawValue::Missing.is_numeric_one());
    }

    #[test]
    fn test_as_flag() {
        assert!(RawValue::Number(1.0).as_flag());
        assert!(RawValue::Number(-1.0).as_flag());
        assert!(!RawValue::Number(0.0).as_flag());
        assert!(RawValue::Text("TRUE".to_string()).as_flag());
        assert!(!RawValue::Text("yes".to_string()).as_flag());
        assert!(!RawValue::Missing.as_flag());
    }

    #[test]
    fn test_as_i32_truncates() {
        assert_eq!(RawValue::Number(2018.0).as_i32(), Some(2018));
        assert_eq!(RawValue::Number(2018.7).as_i32(), Some(2018));
        assert_eq!(RawValue::Text("2018".to_string()).as_i32(), None);
        assert_eq!(RawValue::Missing.as_i32(), None);
    }

    fn minimal_header() -> String {
        [
            "speciesID",
            "common_name",
            "species",
            "taxonomic_group",
            "endemic_NA",
            "endemic_canada",
            "year_published",
            "cosewic_status",
            "sara_status",
            "doc_type",
            "ranges",
            "EOO",
            "IAO",
        ]
        .join("\t")
    }

    #[test]
    fn test_schema_requires_core_columns() {
        let err = RowSchema::from_header("speciesID\tcommon_name", '\t').unwrap_err();
        assert!(err.to_string().contains("missing required columns"));
    }

    #[test]
    fn test_schema_without_threat_or_action_columns() {
        let schema = RowSchema::from_header(&minimal_header(), '\t').unwrap();
        let row = schema.parse_row("17\tWood Thrush\tHylocichla mustelina\tBirds\t1\t0\t2012\tThreatened\tSchedule 1\tstatus report\tON QC\t125000\t820", 1);

        assert_eq!(row.species_id, RawValue::Number(17.0));
        assert!(row.threats.iter().all(|t| t.identified.is_missing()));
        assert!(row.action_type.is_missing());
    }

    #[test]
    fn test_schema_resolves_threat_columns_by_name() {
        let header = format!(
            "{}\tX3_threat_identified\tX3_iucn_impact",
            minimal_header()
        );
        let schema = RowSchema::from_header(&header, '\t').unwrap();
        let row = schema.parse_row(
            "17\tn\tn\tBirds\t0\t0\t2012\tEndangered\t\treport\t\t\t\t1\tHigh",
            1,
        );

        assert!(row.threats[2].identified.is_numeric_one());
        assert_eq!(row.threats[2].impact, RawValue::Text("High".to_string()));
        assert!(row.threats[0].identified.is_missing());
    }

    #[test]
    fn test_parse_row_pads_short_lines() {
        let schema = RowSchema::from_header(&minimal_header(), '\t').unwrap();
        let row = schema.parse_row("17\tWood Thrush", 3);

        assert_eq!(row.species_id, RawValue::Number(17.0));
        assert_eq!(row.common_name, RawValue::Text("Wood Thrush".to_string()));
        assert!(row.ranges.is_missing());
        assert!(row.iao.is_missing());
        assert_eq!(row.position, 3);
    }
}
