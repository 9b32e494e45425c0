//! Filename → destination schema classification.
//!
//! Classification is an exact-match, case-sensitive lookup over a rule table.
//! The built-in table covers the BDOT10k-style layer exports this loader was
//! written for; deployments with other layer sets replace it via the `rules`
//! section of the config file. No glob or normalization semantics apply here:
//! `classify` sees the base filename exactly as it sits on disk.

use serde::{Deserialize, Serialize};

/// One exact-match classification entry, as it appears in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifyRule {
    /// Base filename, matched verbatim (case-sensitive).
    pub file_name: String,
    /// Destination schema in the target database.
    pub schema: String,
}

/// Result of classifying a filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// The filename maps to a known destination schema.
    Schema(String),
    /// The filename is not in the table.
    Unrecognized,
}

impl Classification {
    pub fn as_schema(&self) -> Option<&str> {
        match self {
            Classification::Schema(schema) => Some(schema),
            Classification::Unrecognized => None,
        }
    }

    pub fn is_unrecognized(&self) -> bool {
        matches!(self, Classification::Unrecognized)
    }
}

/// Built-in classification table.
const BUILTIN_TABLE: &[(&str, &str)] = &[
    ("OT_BUIT_P.shp", "utility_poles"),
    ("OT_BUWT_P.shp", "utility_poles"),
    ("OT_OIMK_A.shp", "wet_areas"),
    ("OT_OISZ_A.shp", "rushes"),
    ("OT_SKJZ_L.shp", "roads"),
    ("OT_SULN_L.shp", "power_lines"),
    ("OT_TCON_A.shp", "protected_areas"),
    ("OT_TCPK_A.shp", "protected_areas"),
    ("OT_TCRZ_A.shp", "protected_areas"),
    ("budynki.shp", "buildings"),
    ("dzialki.shp", "parcels"),
];

/// Exact-match classification table.
#[derive(Debug, Clone)]
pub struct ClassifyTable {
    rules: Vec<ClassifyRule>,
}

impl Default for ClassifyTable {
    fn default() -> Self {
        Self {
            rules: BUILTIN_TABLE
                .iter()
                .map(|(file_name, schema)| ClassifyRule {
                    file_name: file_name.to_string(),
                    schema: schema.to_string(),
                })
                .collect(),
        }
    }
}

impl ClassifyTable {
    /// Build a table from config rules. An empty rule list means the
    /// built-in table.
    pub fn from_rules(rules: Vec<ClassifyRule>) -> Self {
        if rules.is_empty() {
            Self::default()
        } else {
            Self { rules }
        }
    }

    /// Classify a base filename. Pure and deterministic: the same input
    /// always yields the same answer.
    pub fn classify(&self, file_name: &str) -> Classification {
        self.rules
            .iter()
            .find(|rule| rule.file_name == file_name)
            .map(|rule| Classification::Schema(rule.schema.clone()))
            .unwrap_or(Classification::Unrecognized)
    }

    /// The active rule set.
    pub fn rules(&self) -> &[ClassifyRule] {
        &self.rules
    }
}
