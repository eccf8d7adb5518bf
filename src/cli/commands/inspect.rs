//! Inspect command implementation
//!
//! This module implements the `inspect` command: report the k of the raw
//! input over a quasi-identifier tuple, with direct identifiers removed and
//! no generalization applied.

use super::{exit_code, load_input, EXIT_ANONYMIZATION_FAILURE, EXIT_CONFIG_ERROR, EXIT_SUCCESS};
use crate::anonymization::{EquivalenceClass, EquivalenceClassAnalyzer, Partition};
use crate::config::load_config;
use crate::domain::AttributeRole;
use clap::Args;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Number of classes listed before the output is truncated
const MAX_LISTED_CLASSES: usize = 10;

/// Arguments for the inspect command
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Quasi-identifier tuple (comma-separated attribute names)
    #[arg(long, value_delimiter = ',', required = true)]
    pub quasi_identifiers: Vec<String>,

    /// List the equivalence classes smaller than this size
    #[arg(long, value_name = "K")]
    pub threshold: Option<usize>,
}

impl InspectArgs {
    /// Execute the inspect command
    pub fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(quasi_identifiers = ?self.quasi_identifiers, "Inspecting raw input");

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG_ERROR);
            }
        };

        let records = match load_input(&config, &mut StdRng::from_entropy()) {
            Ok(r) => r.select_roles(&AttributeRole::releasable()),
            Err(e) => {
                println!("❌ Failed to load input");
                println!("   Error: {e}");
                return Ok(exit_code(&e));
            }
        };

        let analyzer = EquivalenceClassAnalyzer::new();
        let partition = match analyzer.partition(&records, &self.quasi_identifiers) {
            Ok(p) => p,
            Err(e) => {
                println!("❌ Equivalence analysis failed");
                println!("   Error: {e}");
                return Ok(EXIT_ANONYMIZATION_FAILURE);
            }
        };

        print!("{}", self.format(&partition, records.len()));
        Ok(EXIT_SUCCESS)
    }

    fn format(&self, partition: &Partition, records: usize) -> String {
        let mut output = String::new();
        output.push_str("📊 Raw Input Inspection\n\n");
        output.push_str(&format!(
            "  Quasi-identifiers:  {}\n",
            partition.qi_tuple().join(", ")
        ));
        output.push_str(&format!("  Records:            {records}\n"));
        output.push_str(&format!("  Classes:            {}\n", partition.classes().len()));
        output.push_str(&format!("  k:                  {}\n", partition.k()));
        output.push_str(&format!(
            "  Unique Records:     {}\n",
            partition.unique_classes()
        ));
        output.push('\n');

        output.push_str("  Class Sizes:\n");
        for (size, count) in partition.size_distribution() {
            output.push_str(&format!("    {size:>5}: {count} class(es)\n"));
        }

        if let Some(threshold) = self.threshold {
            let below = partition.below(threshold);
            output.push('\n');
            output.push_str(&format!(
                "  ⚠️  {} class(es) below k={threshold}:\n",
                below.len()
            ));
            for class in below.iter().take(MAX_LISTED_CLASSES) {
                output.push_str(&format!(
                    "    - {} ({} record(s))\n",
                    describe(class),
                    class.size()
                ));
            }
            if below.len() > MAX_LISTED_CLASSES {
                output.push_str(&format!(
                    "    ... and {} more\n",
                    below.len() - MAX_LISTED_CLASSES
                ));
            }
        }
        output.push('\n');

        output
    }
}

fn describe(class: &EquivalenceClass) -> String {
    let values: Vec<String> = class
        .key()
        .iter()
        .map(|value| {
            if value.is_missing() {
                "<missing>".to_string()
            } else {
                value.to_string()
            }
        })
        .collect();
    format!("({})", values.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Attribute, RecordSet, Schema, SubjectId, Value, ValueKind};

    fn partition() -> Partition {
        let schema = Schema::new(vec![
            Attribute::new("gender", AttributeRole::QuasiIdentifier, ValueKind::Categorical),
            Attribute::new("band", AttributeRole::QuasiIdentifier, ValueKind::Categorical),
        ])
        .unwrap();
        let mut records = RecordSet::new(schema);
        let rows = [("F", "A"), ("F", "A"), ("M", "B"), ("F", "")];
        for (i, (gender, band)) in rows.iter().enumerate() {
            let band = if band.is_empty() { Value::Missing } else { Value::from(*band) };
            records
                .push(SubjectId::new(format!("s{i}")).unwrap(), vec![Value::from(*gender), band])
                .unwrap();
        }
        EquivalenceClassAnalyzer::new()
            .partition(&records, &["gender".to_string(), "band".to_string()])
            .unwrap()
    }

    #[test]
    fn test_format_without_threshold() {
        let args = InspectArgs {
            quasi_identifiers: vec!["gender".to_string(), "band".to_string()],
            threshold: None,
        };
        let output = args.format(&partition(), 4);
        assert!(output.contains("k:                  1"));
        assert!(output.contains("Unique Records:     2"));
        assert!(!output.contains("below k="));
    }

    #[test]
    fn test_format_lists_classes_below_threshold() {
        let args = InspectArgs {
            quasi_identifiers: vec!["gender".to_string(), "band".to_string()],
            threshold: Some(2),
        };
        let output = args.format(&partition(), 4);
        assert!(output.contains("2 class(es) below k=2"));
        assert!(output.contains("(M, B) (1 record(s))"));
        assert!(output.contains("(F, <missing>)"));
    }
}
