//! Per-row normalization of the CAN-SAR source table.
//!
//! One source row fans out into up to five kinds of records: a species (on
//! first sight of its identifier), always one status assessment, one
//! location per province token, one threat per identified category, and an
//! action when the action-type field is present. The outcome of a row is
//! explicit data — either the emitted entities or a skip with its reason —
//! so the pipeline can log and count skips without exception-style control
//! flow.

use std::collections::HashSet;
use std::fmt;

use cansar_core::{
    CreateActionRequest, CreateAssessmentRequest, CreateLocationRequest, CreateSpeciesRequest,
    CreateThreatRequest, ThreatCategory,
};

use crate::source::SourceRow;

/// Why a row was abandoned without emitting any entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The species identifier cell is absent or not numeric.
    MissingSpeciesId,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingSpeciesId => f.write_str("missing or unparseable species identifier"),
        }
    }
}

/// Everything one source row contributes to the data store.
#[derive(Debug, Clone)]
pub struct RowEntities {
    /// 1-based ordinal of the source row.
    pub position: u64,
    /// New species record; `None` when the identifier was already seen by
    /// a committed batch or earlier in the current batch.
    pub species: Option<CreateSpeciesRequest>,
    /// Exactly one assessment per source row.
    pub assessment: CreateAssessmentRequest,
    /// One location per province token in the ranges field.
    pub locations: Vec<CreateLocationRequest>,
    /// One threat per identified category.
    pub threats: Vec<CreateThreatRequest>,
    /// Action, when the action-type field is present.
    pub action: Option<CreateActionRequest>,
}

/// Result of normalizing one source row.
#[derive(Debug, Clone)]
pub enum RowOutcome {
    /// The row contributes the contained entities.
    Entities(Box<RowEntities>),
    /// The row contributes nothing.
    Skipped { position: u64, reason: SkipReason },
}

/// Normalize one source row.
///
/// Species deduplication spans the run but must not outlive a failed
/// batch: `seen_species` holds identifiers from committed batches only,
/// while `batch_species` collects identifiers first seen in the current
/// batch. The caller folds `batch_species` into `seen_species` once the
/// batch commits, so a rolled-back batch leaves its species eligible for
/// re-emission by a later row.
pub fn normalize_row(
    row: &SourceRow,
    seen_species: &HashSet<i32>,
    batch_species: &mut HashSet<i32>,
) -> RowOutcome {
    let species_id = match row.species_id.as_i32() {
        Some(id) => id,
        None => {
            return RowOutcome::Skipped {
                position: row.position,
                reason: SkipReason::MissingSpeciesId,
            }
        }
    };

    let species = if !seen_species.contains(&species_id) && batch_species.insert(species_id) {
        Some(CreateSpeciesRequest {
            species_id,
            common_name: row.common_name.as_text(),
            scientific_name: row.scientific_name.as_text(),
            taxonomic_group: row.taxonomic_group.as_text(),
            endemic_na: row.endemic_na.as_flag(),
            endemic_canada: row.endemic_canada.as_flag(),
        })
    } else {
        None
    };

    let assessment = CreateAssessmentRequest {
        species_id,
        year: row.year_published.as_i32(),
        cosewic_status: row.cosewic_status.as_text(),
        sara_status: row.sara_status.as_text(),
        doc_type: row.doc_type.as_text(),
    };

    let locations = match row.ranges.as_text() {
        Some(ranges) => ranges
            .split_whitespace()
            .map(|province| CreateLocationRequest {
                species_id,
                province_territory: province.to_string(),
                eoo: row.eoo.as_f64(),
                iao: row.iao.as_f64(),
            })
            .collect(),
        None => Vec::new(),
    };

    let threats = ThreatCategory::ALL
        .into_iter()
        .zip(&row.threats)
        .filter(|(_, cells)| cells.identified.is_numeric_one())
        .map(|(code, cells)| CreateThreatRequest {
            code,
            impact: cells.impact.as_text(),
            scope: cells.scope.as_text(),
            severity: cells.severity.as_text(),
            timing: cells.timing.as_text(),
        })
        .collect();

    let action = row.action_type.as_text().map(|action_type| CreateActionRequest {
        action_type,
        action_subtype: row.action_subtype.as_text(),
        notes: row.action_notes.as_text(),
    });

    RowOutcome::Entities(Box::new(RowEntities {
        position: row.position,
        species,
        assessment,
        locations,
        threats,
        action,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{RawValue, RowSchema};

    const FULL_HEADER_CORE: &str = "speciesID\tcommon_name\tspecies\ttaxonomic_group\tendemic_NA\tendemic_canada\tyear_published\tcosewic_status\tsara_status\tdoc_type\tranges\tEOO\tIAO";

    fn full_schema() -> RowSchema {
        let mut header = String::from(FULL_HEADER_CORE);
        for code in ThreatCategory::ALL.map(|c| c.code()) {
            header.push_str(&format!(
                "\t{code}_threat_identified\t{code}_iucn_impact\t{code}_iucn_scope\t{code}_iucn_severity\t{code}_iucn_timing"
            ));
        }
        header.push_str("\taction_type\taction_subtype\tnotes_action_subtype");
        RowSchema::from_header(&header, '\t').unwrap()
    }

    /// Build a full-width line: 13 core cells, 55 threat cells, 3 action cells.
    fn line(core: &[&str], threat_cells: &[(usize, [&str; 5])], action: [&str; 3]) -> String {
        let mut cells: Vec<String> = core.iter().map(|c| c.to_string()).collect();
        assert_eq!(cells.len(), 13);
        let mut threats = vec![String::new(); 55];
        for (category_index, values) in threat_cells {
            for (offset, value) in values.iter().enumerate() {
                threats[category_index * 5 + offset] = value.to_string();
            }
        }
        cells.extend(threats);
        cells.extend(action.iter().map(|c| c.to_string()));
        cells.join("\t")
    }

    fn parse(text: &str, position: u64) -> crate::source::SourceRow {
        full_schema().parse_row(text, position)
    }

    const CORE: [&str; 13] = [
        "17", "Wood Thrush", "Hylocichla mustelina", "Birds", "1", "0", "2012",
        "Threatened", "Schedule 1", "status report", "ON QC", "125000", "820",
    ];

    #[test]
    fn test_missing_species_id_skips_row_entirely() {
        let mut core = CORE;
        core[0] = "NA";
        let row = parse(&line(&core, &[], ["Outreach", "", ""]), 4);
        let seen = HashSet::new();
        let mut batch = HashSet::new();

        match normalize_row(&row, &seen, &mut batch) {
            RowOutcome::Skipped { position, reason } => {
                assert_eq!(position, 4);
                assert_eq!(reason, SkipReason::MissingSpeciesId);
            }
            RowOutcome::Entities(_) => panic!("row without species id must be skipped"),
        }
        assert!(batch.is_empty());
    }

    #[test]
    fn test_non_numeric_species_id_skips_row() {
        let mut core = CORE;
        core[0] = "unknown";
        let row = parse(&line(&core, &[], ["", "", ""]), 1);

        assert!(matches!(
            normalize_row(&row, &HashSet::new(), &mut HashSet::new()),
            RowOutcome::Skipped { .. }
        ));
    }

    #[test]
    fn test_first_occurrence_emits_species_with_fields() {
        let row = parse(&line(&CORE, &[], ["", "", ""]), 1);
        let seen = HashSet::new();
        let mut batch = HashSet::new();

        let entities = match normalize_row(&row, &seen, &mut batch) {
            RowOutcome::Entities(e) => e,
            RowOutcome::Skipped { .. } => panic!("expected entities"),
        };

        let species = entities.species.expect("first occurrence emits species");
        assert_eq!(species.species_id, 17);
        assert_eq!(species.common_name.as_deref(), Some("Wood Thrush"));
        assert_eq!(species.scientific_name.as_deref(), Some("Hylocichla mustelina"));
        assert!(species.endemic_na);
        assert!(!species.endemic_canada);
        assert!(batch.contains(&17));
    }

    #[test]
    fn test_duplicate_species_in_one_batch_emits_species_once() {
        let seen = HashSet::new();
        let mut batch = HashSet::new();

        let first = normalize_row(&parse(&line(&CORE, &[], ["", "", ""]), 1), &seen, &mut batch);
        let second = normalize_row(&parse(&line(&CORE, &[], ["", "", ""]), 2), &seen, &mut batch);

        let first = match first {
            RowOutcome::Entities(e) => e,
            _ => panic!(),
        };
        let second = match second {
            RowOutcome::Entities(e) => e,
            _ => panic!(),
        };

        assert!(first.species.is_some());
        assert!(second.species.is_none());
        assert_eq!(second.assessment.species_id, 17);
    }

    #[test]
    fn test_committed_species_not_reemitted_in_later_batch() {
        let mut seen = HashSet::new();
        seen.insert(17);
        let mut batch = HashSet::new();

        let outcome = normalize_row(&parse(&line(&CORE, &[], ["", "", ""]), 5), &seen, &mut batch);
        let entities = match outcome {
            RowOutcome::Entities(e) => e,
            _ => panic!(),
        };

        assert!(entities.species.is_none());
        assert!(batch.is_empty());
    }

    #[test]
    fn test_species_from_uncommitted_batch_is_eligible_again() {
        let seen = HashSet::new();

        // First batch sees the species but is never folded into the run
        // set (its transaction rolled back).
        let mut failed_batch = HashSet::new();
        let first = normalize_row(
            &parse(&line(&CORE, &[], ["", "", ""]), 1),
            &seen,
            &mut failed_batch,
        );
        assert!(matches!(first, RowOutcome::Entities(e) if e.species.is_some()));

        // A later batch starts fresh and must re-emit the species.
        let mut next_batch = HashSet::new();
        let second = normalize_row(
            &parse(&line(&CORE, &[], ["", "", ""]), 2),
            &seen,
            &mut next_batch,
        );
        assert!(matches!(second, RowOutcome::Entities(e) if e.species.is_some()));
    }

    #[test]
    fn test_every_row_emits_one_assessment() {
        let row = parse(&line(&CORE, &[], ["", "", ""]), 1);
        let entities = match normalize_row(&row, &HashSet::new(), &mut HashSet::new()) {
            RowOutcome::Entities(e) => e,
            _ => panic!(),
        };

        assert_eq!(entities.assessment.year, Some(2012));
        assert_eq!(entities.assessment.cosewic_status.as_deref(), Some("Threatened"));
        assert_eq!(entities.assessment.sara_status.as_deref(), Some("Schedule 1"));
    }

    #[test]
    fn test_ranges_fan_out_one_location_per_token() {
        let row = parse(&line(&CORE, &[], ["", "", ""]), 1);
        let entities = match normalize_row(&row, &HashSet::new(), &mut HashSet::new()) {
            RowOutcome::Entities(e) => e,
            _ => panic!(),
        };

        assert_eq!(entities.locations.len(), 2);
        assert_eq!(entities.locations[0].province_territory, "ON");
        assert_eq!(entities.locations[1].province_territory, "QC");
        for location in &entities.locations {
            assert_eq!(location.eoo, Some(125000.0));
            assert_eq!(location.iao, Some(820.0));
        }
    }

    #[test]
    fn test_missing_ranges_emits_no_locations() {
        let mut core = CORE;
        core[10] = "NA";
        let row = parse(&line(&core, &[], ["", "", ""]), 1);
        let entities = match normalize_row(&row, &HashSet::new(), &mut HashSet::new()) {
            RowOutcome::Entities(e) => e,
            _ => panic!(),
        };

        assert!(entities.locations.is_empty());
    }

    #[test]
    fn test_single_identified_category_emits_single_threat() {
        let row = parse(
            &line(
                &CORE,
                &[(2, ["1", "High", "Large", "Serious", "Ongoing"])],
                ["", "", ""],
            ),
            1,
        );
        let entities = match normalize_row(&row, &HashSet::new(), &mut HashSet::new()) {
            RowOutcome::Entities(e) => e,
            _ => panic!(),
        };

        assert_eq!(entities.threats.len(), 1);
        let threat = &entities.threats[0];
        assert_eq!(threat.code, ThreatCategory::X3);
        assert_eq!(threat.impact.as_deref(), Some("High"));
        assert_eq!(threat.scope.as_deref(), Some("Large"));
        assert_eq!(threat.severity.as_deref(), Some("Serious"));
        assert_eq!(threat.timing.as_deref(), Some("Ongoing"));
    }

    #[test]
    fn test_text_one_identified_flag_emits_no_threat() {
        // Strict-equality policy: only a numeric 1 marks a category.
        let row = parse(
            &line(&CORE, &[(2, ["1", "High", "", "", ""])], ["", "", ""]),
            1,
        );
        let mut forced = row.clone();
        forced.threats[2].identified = RawValue::Text("1".to_string());

        let entities = match normalize_row(&forced, &HashSet::new(), &mut HashSet::new()) {
            RowOutcome::Entities(e) => e,
            _ => panic!(),
        };
        assert!(entities.threats.is_empty());
    }

    #[test]
    fn test_nonunit_identified_values_emit_no_threat() {
        let row = parse(
            &line(
                &CORE,
                &[(0, ["2", "", "", "", ""]), (5, ["0", "", "", "", ""])],
                ["", "", ""],
            ),
            1,
        );
        let entities = match normalize_row(&row, &HashSet::new(), &mut HashSet::new()) {
            RowOutcome::Entities(e) => e,
            _ => panic!(),
        };
        assert!(entities.threats.is_empty());
    }

    #[test]
    fn test_action_emitted_when_type_present() {
        let row = parse(
            &line(&CORE, &[], ["Stewardship", "Outreach", "landowner program"]),
            1,
        );
        let entities = match normalize_row(&row, &HashSet::new(), &mut HashSet::new()) {
            RowOutcome::Entities(e) => e,
            _ => panic!(),
        };

        let action = entities.action.expect("action_type present");
        assert_eq!(action.action_type, "Stewardship");
        assert_eq!(action.action_subtype.as_deref(), Some("Outreach"));
        assert_eq!(action.notes.as_deref(), Some("landowner program"));
    }

    #[test]
    fn test_no_action_when_type_missing() {
        let row = parse(&line(&CORE, &[], ["", "Outreach", "notes"]), 1);
        let entities = match normalize_row(&row, &HashSet::new(), &mut HashSet::new()) {
            RowOutcome::Entities(e) => e,
            _ => panic!(),
        };
        assert!(entities.action.is_none());
    }
}
