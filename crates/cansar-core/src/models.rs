//! Core data models for the CAN-SAR pipeline.
//!
//! These types are shared across all cansar crates and represent the
//! conservation domain entities: species, status assessments, threats,
//! recovery actions, locations, and the yearly Canadian Species Index
//! trend table.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// SPECIES
// =============================================================================

/// A species tracked by the CAN-SAR database.
///
/// `species_id` is the natural key carried by the source table; it is never
/// assigned by the database.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Species {
    pub species_id: i32,
    pub common_name: Option<String>,
    pub scientific_name: Option<String>,
    pub taxonomic_group: Option<String>,
    pub endemic_na: bool,
    pub endemic_canada: bool,
}

/// Request for creating a species record.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateSpeciesRequest {
    pub species_id: i32,
    pub common_name: Option<String>,
    pub scientific_name: Option<String>,
    pub taxonomic_group: Option<String>,
    pub endemic_na: bool,
    pub endemic_canada: bool,
}

// =============================================================================
// STATUS ASSESSMENT
// =============================================================================

/// One conservation-status determination for a species in a given year.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct StatusAssessment {
    pub assessment_id: i64,
    pub species_id: i32,
    pub year: Option<i32>,
    pub cosewic_status: Option<String>,
    pub sara_status: Option<String>,
    pub doc_type: Option<String>,
}

/// Request for creating a status assessment record.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateAssessmentRequest {
    pub species_id: i32,
    pub year: Option<i32>,
    pub cosewic_status: Option<String>,
    pub sara_status: Option<String>,
    pub doc_type: Option<String>,
}

// =============================================================================
// THREATS
// =============================================================================

/// The eleven standardized IUCN major threat categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThreatCategory {
    X1,
    X2,
    X3,
    X4,
    X5,
    X6,
    X7,
    X8,
    X9,
    X10,
    X11,
}

impl ThreatCategory {
    /// All categories in source-column order.
    pub const ALL: [ThreatCategory; 11] = [
        ThreatCategory::X1,
        ThreatCategory::X2,
        ThreatCategory::X3,
        ThreatCategory::X4,
        ThreatCategory::X5,
        ThreatCategory::X6,
        ThreatCategory::X7,
        ThreatCategory::X8,
        ThreatCategory::X9,
        ThreatCategory::X10,
        ThreatCategory::X11,
    ];

    /// The code as it appears in source column names and the threats table.
    pub fn code(&self) -> &'static str {
        match self {
            ThreatCategory::X1 => "X1",
            ThreatCategory::X2 => "X2",
            ThreatCategory::X3 => "X3",
            ThreatCategory::X4 => "X4",
            ThreatCategory::X5 => "X5",
            ThreatCategory::X6 => "X6",
            ThreatCategory::X7 => "X7",
            ThreatCategory::X8 => "X8",
            ThreatCategory::X9 => "X9",
            ThreatCategory::X10 => "X10",
            ThreatCategory::X11 => "X11",
        }
    }
}

impl fmt::Display for ThreatCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for ThreatCategory {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ThreatCategory::ALL
            .into_iter()
            .find(|c| c.code() == s)
            .ok_or_else(|| crate::Error::InvalidInput(format!("unknown threat code: {}", s)))
    }
}

/// A threat identified by one assessment.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Threat {
    pub threat_id: i64,
    pub assessment_id: i64,
    pub iucn_threat_code: String,
    pub impact: Option<String>,
    pub scope: Option<String>,
    pub severity: Option<String>,
    pub timing: Option<String>,
}

/// Request for creating a threat record.
///
/// The owning assessment id is supplied at insert time; normalization
/// produces these before the assessment row exists.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateThreatRequest {
    pub code: ThreatCategory,
    pub impact: Option<String>,
    pub scope: Option<String>,
    pub severity: Option<String>,
    pub timing: Option<String>,
}

// =============================================================================
// ACTIONS
// =============================================================================

/// A recovery action recorded by one assessment.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Action {
    pub action_id: i64,
    pub assessment_id: i64,
    pub action_type: Option<String>,
    pub action_subtype: Option<String>,
    pub notes: Option<String>,
}

/// Request for creating an action record.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateActionRequest {
    pub action_type: String,
    pub action_subtype: Option<String>,
    pub notes: Option<String>,
}

// =============================================================================
// LOCATIONS
// =============================================================================

/// A province/territory occurrence for a species, with range-size measures.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Location {
    pub location_id: i64,
    pub species_id: i32,
    pub province_territory: String,
    pub eoo: Option<f64>,
    pub iao: Option<f64>,
}

/// Request for creating a location record.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateLocationRequest {
    pub species_id: i32,
    pub province_territory: String,
    pub eoo: Option<f64>,
    pub iao: Option<f64>,
}

// =============================================================================
// CSI TRENDS
// =============================================================================

/// One year of the Canadian Species Index, with per-taxon cumulative index
/// values and contributing species counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CsiTrend {
    pub year: i32,
    pub national_index: Option<f64>,
    pub birds_index: Option<f64>,
    pub mammals_index: Option<f64>,
    pub fish_index: Option<f64>,
    pub number_species: Option<i32>,
    pub number_bird_species: Option<i32>,
    pub number_mammal_species: Option<i32>,
    pub number_fish_species: Option<i32>,
}
