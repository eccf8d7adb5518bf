//! Codebook of reverse mappings
//!
//! The codebook accumulates, per attribute, the metadata needed to undo a
//! transformation: category codes, pseudonym tables, standardization parameters
//! and band edges. It is required to reconstruct original values and is therefore
//! never bundled with a released dataset; [`Codebook::export`] is meant for a
//! separate, access-controlled channel.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Standard deviation estimator used by standardization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Deviation {
    /// Sample standard deviation (n - 1 denominator)
    #[default]
    Sample,
    /// Population standard deviation (n denominator)
    Population,
}

impl Deviation {
    /// Stable lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Deviation::Sample => "sample",
            Deviation::Population => "population",
        }
    }
}

/// Parameters of a z-score standardization
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Standardization {
    /// Column mean
    pub mean: f64,
    /// Column standard deviation
    pub standard_deviation: f64,
    /// Estimator used for the deviation
    pub deviation: Deviation,
}

impl Standardization {
    /// Recover an original value from its z-score
    pub fn restore(&self, z: f64) -> f64 {
        z * self.standard_deviation + self.mean
    }
}

/// Reverse-mapping metadata for one attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CodebookEntry {
    /// Explicit category coding, original → code
    Codes {
        /// Forward mapping
        codes: BTreeMap<String, String>,
    },
    /// Pseudonym table, original → token
    Pseudonyms {
        /// Forward mapping
        tokens: BTreeMap<String, String>,
    },
    /// Z-score parameters
    Standardization(Standardization),
    /// Band boundaries, one label per consecutive pair of edges
    Bands {
        /// Boundaries in ascending order
        edges: Vec<f64>,
        /// Label of each band
        labels: Vec<String>,
    },
}

impl CodebookEntry {
    /// Short name of the entry type
    pub fn kind(&self) -> &'static str {
        match self {
            CodebookEntry::Codes { .. } => "codes",
            CodebookEntry::Pseudonyms { .. } => "pseudonyms",
            CodebookEntry::Standardization(_) => "standardization",
            CodebookEntry::Bands { .. } => "bands",
        }
    }

    /// Reverse mapping as string pairs
    ///
    /// Codes and pseudonyms map token → original, standardization lists its
    /// parameters and bands map label → `lower..upper`.
    pub fn reverse_mapping(&self) -> BTreeMap<String, String> {
        match self {
            CodebookEntry::Codes { codes: forward }
            | CodebookEntry::Pseudonyms { tokens: forward } => forward
                .iter()
                .map(|(original, token)| (token.clone(), original.clone()))
                .collect(),
            CodebookEntry::Standardization(params) => BTreeMap::from([
                ("mean".to_string(), params.mean.to_string()),
                (
                    "standard_deviation".to_string(),
                    params.standard_deviation.to_string(),
                ),
                ("deviation".to_string(), params.deviation.as_str().to_string()),
            ]),
            CodebookEntry::Bands { edges, labels } => labels
                .iter()
                .zip(edges.windows(2))
                .map(|(label, pair)| (label.clone(), format!("{}..{}", pair[0], pair[1])))
                .collect(),
        }
    }
}

/// Accumulated codebook for one session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Codebook {
    entries: BTreeMap<String, CodebookEntry>,
}

impl Codebook {
    /// Create an empty codebook
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an entry; a later entry for the same attribute overwrites the earlier one
    pub fn insert(&mut self, attribute: impl Into<String>, entry: CodebookEntry) {
        let attribute = attribute.into();
        if let Some(previous) = self.entries.get(&attribute) {
            tracing::warn!(
                attribute = %attribute,
                previous = previous.kind(),
                replacement = entry.kind(),
                "Overwriting codebook entry"
            );
        }
        self.entries.insert(attribute, entry);
    }

    /// Merge another codebook into this one, its entries taking precedence
    pub fn merge(&mut self, other: Codebook) {
        for (attribute, entry) in other.entries {
            self.insert(attribute, entry);
        }
    }

    /// Entry for an attribute
    pub fn get(&self, attribute: &str) -> Option<&CodebookEntry> {
        self.entries.get(attribute)
    }

    /// Attribute names with entries
    pub fn attributes(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the codebook is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Mapping from attribute name to its reverse-mapping metadata
    pub fn export(&self) -> BTreeMap<String, BTreeMap<String, String>> {
        self.entries
            .iter()
            .map(|(attribute, entry)| (attribute.clone(), entry.reverse_mapping()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(pairs: &[(&str, &str)]) -> CodebookEntry {
        CodebookEntry::Codes {
            codes: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_export_reverses_codes() {
        let mut codebook = Codebook::new();
        codebook.insert("gender", codes(&[("M", "1"), ("F", "0")]));

        let export = codebook.export();
        assert_eq!(export["gender"]["1"], "M");
        assert_eq!(export["gender"]["0"], "F");
    }

    #[test]
    fn test_export_standardization_round_trips_parameters() {
        let params = Standardization {
            mean: 72.183_333_333_333_33,
            standard_deviation: 11.402_1,
            deviation: Deviation::Sample,
        };
        let mut codebook = Codebook::new();
        codebook.insert("weight", CodebookEntry::Standardization(params));

        let export = codebook.export();
        let mean: f64 = export["weight"]["mean"].parse().unwrap();
        assert_eq!(mean, params.mean);
        assert_eq!(export["weight"]["deviation"], "sample");
    }

    #[test]
    fn test_export_bands() {
        let mut codebook = Codebook::new();
        codebook.insert(
            "age",
            CodebookEntry::Bands {
                edges: vec![18.0, 33.0, 80.0],
                labels: vec!["young".to_string(), "old".to_string()],
            },
        );
        assert_eq!(codebook.export()["age"]["young"], "18..33");
    }

    #[test]
    fn test_later_entry_overwrites() {
        let mut codebook = Codebook::new();
        codebook.insert("blood_group", codes(&[("A+", "a")]));
        codebook.insert("blood_group", codes(&[("A+", "z")]));

        assert_eq!(codebook.len(), 1);
        assert_eq!(codebook.export()["blood_group"]["z"], "A+");
    }

    #[test]
    fn test_merge_prefers_incoming() {
        let mut first = Codebook::new();
        first.insert("gender", codes(&[("M", "1")]));
        first.insert("education_level", codes(&[("school", "b")]));

        let mut second = Codebook::new();
        second.insert("gender", codes(&[("M", "x")]));

        first.merge(second);
        assert_eq!(first.attributes(), vec!["education_level", "gender"]);
        assert_eq!(first.export()["gender"]["x"], "M");
    }

    #[test]
    fn test_restore_z_score() {
        let params = Standardization {
            mean: 170.0,
            standard_deviation: 10.0,
            deviation: Deviation::Population,
        };
        assert_eq!(params.restore(1.5), 185.0);
    }
}
