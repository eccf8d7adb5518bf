//! Release reporting
//!
//! A [`ReleaseReport`] summarizes one recipient view for manual privacy review
//! before the dataset leaves the building: k before and after suppression, how
//! many records were removed, the class size distribution and the output
//! distribution of every transformation step.

use crate::anonymization::pipeline::{OutputSummary, StepSummary};
use serde::Serialize;
use std::collections::BTreeMap;

/// Per-view release diagnostics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReleaseReport {
    /// Recipient view name
    pub view: String,

    /// Quasi-identifier tuple used for verification
    pub qi_tuple: Vec<String>,

    /// Records entering the pipeline
    pub input_records: usize,

    /// Records in the released dataset
    pub released_records: usize,

    /// Records removed by suppression
    pub suppressed: usize,

    /// Required k
    pub k_target: usize,

    /// k after transformation, before suppression
    pub k_before: usize,

    /// k of the released dataset
    pub k_after: usize,

    /// Number of equivalence classes per class size, after suppression
    pub class_sizes: BTreeMap<usize, usize>,

    /// Output distribution of every transformation step
    pub transformations: Vec<StepSummary>,

    /// Attributes with codebook entries
    pub codebook_attributes: Vec<String>,

    /// Conditions a reviewer should look at
    pub warnings: Vec<String>,

    /// Wall-clock time of the release (ms)
    pub duration_ms: u64,
}

impl ReleaseReport {
    /// Create a report for a view before any processing
    pub fn new(
        view: impl Into<String>,
        qi_tuple: Vec<String>,
        k_target: usize,
        input_records: usize,
    ) -> Self {
        Self {
            view: view.into(),
            qi_tuple,
            input_records,
            released_records: input_records,
            suppressed: 0,
            k_target,
            k_before: 0,
            k_after: 0,
            class_sizes: BTreeMap::new(),
            transformations: Vec::new(),
            codebook_attributes: Vec::new(),
            warnings: Vec::new(),
            duration_ms: 0,
        }
    }

    /// Fraction of input records removed by suppression
    pub fn suppression_rate(&self) -> f64 {
        if self.input_records == 0 {
            0.0
        } else {
            self.suppressed as f64 / self.input_records as f64
        }
    }

    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    /// Format report for console output
    pub fn format_console(&self) -> String {
        let mut output = String::new();

        output.push('\n');
        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output.push_str(&format!("  RELEASE REPORT: {}\n", self.view));
        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output.push('\n');

        output.push_str("📊 SUMMARY\n");
        output.push_str("───────────────────────────────────────────────────────────────\n");
        output.push_str(&format!("  Quasi-identifiers:   {}\n", self.qi_tuple.join(", ")));
        output.push_str(&format!("  Input Records:       {}\n", self.input_records));
        output.push_str(&format!("  Released Records:    {}\n", self.released_records));
        output.push_str(&format!(
            "  Suppressed Records:  {} ({:.1}%)\n",
            self.suppressed,
            self.suppression_rate() * 100.0
        ));
        output.push_str(&format!("  k Target:            {}\n", self.k_target));
        output.push_str(&format!("  k Before:            {}\n", self.k_before));
        output.push_str(&format!("  k Released:          {}\n", self.k_after));
        output.push_str(&format!("  Duration:            {} ms\n", self.duration_ms));
        output.push('\n');

        if !self.class_sizes.is_empty() {
            output.push_str("👥 EQUIVALENCE CLASS SIZES\n");
            output.push_str("───────────────────────────────────────────────────────────────\n");
            for (size, classes) in &self.class_sizes {
                output.push_str(&format!("  size {:>6}  {:>6} classes\n", size, classes));
            }
            output.push('\n');
        }

        if !self.transformations.is_empty() {
            output.push_str("🔧 TRANSFORMATIONS\n");
            output.push_str("───────────────────────────────────────────────────────────────\n");
            for step in &self.transformations {
                let target = if step.attribute == step.output {
                    step.attribute.clone()
                } else {
                    format!("{} → {}", step.attribute, step.output)
                };
                output.push_str(&format!("  {:30} {}\n", target, step.operation));
                match &step.summary {
                    OutputSummary::Categories { counts } => {
                        for (category, count) in counts.iter().take(12) {
                            output.push_str(&format!("      {:26} {:>6}\n", category, count));
                        }
                        if counts.len() > 12 {
                            output.push_str(&format!("      … {} more\n", counts.len() - 12));
                        }
                    }
                    OutputSummary::Numeric { count, min, max } => {
                        output.push_str(&format!(
                            "      {} values in [{:.3}, {:.3}]\n",
                            count, min, max
                        ));
                    }
                    OutputSummary::Dropped => output.push_str("      dropped\n"),
                }
            }
            output.push('\n');
        }

        if !self.codebook_attributes.is_empty() {
            output.push_str("🔑 CODEBOOK\n");
            output.push_str("───────────────────────────────────────────────────────────────\n");
            output.push_str(&format!("  {}\n", self.codebook_attributes.join(", ")));
            output.push('\n');
        }

        if !self.warnings.is_empty() {
            output.push_str("⚠️  WARNINGS\n");
            output.push_str("───────────────────────────────────────────────────────────────\n");
            for warning in &self.warnings {
                output.push_str(&format!("  • {}\n", warning));
            }
            output.push('\n');
        }

        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output.push('\n');

        output
    }

    /// Format report as JSON
    pub fn format_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write report to file as JSON
    pub fn write_to_file(&self, path: &std::path::Path) -> std::io::Result<()> {
        let json = self.format_json().map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }
}
