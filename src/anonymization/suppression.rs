//! Record suppression
//!
//! Enforces `k >= k_target` by removing every record whose equivalence class
//! has fewer than `k_target` members. Whole records are removed, never single
//! values, and the engine makes exactly one pass.

use crate::anonymization::equivalence::EquivalenceClassAnalyzer;
use crate::domain::{AnonResult, AnonymizationError, RecordSet, SubjectId};
use std::collections::HashSet;

/// Result of a suppression pass
#[derive(Debug, Clone, PartialEq)]
pub struct SuppressionOutcome {
    /// Remaining records, in input order
    pub records: RecordSet,
    /// Number of records removed
    pub suppressed: usize,
    /// Removed subjects, in input order
    pub suppressed_ids: Vec<SubjectId>,
    /// k of the remaining records
    pub realized_k: usize,
}

/// Removes records in equivalence classes smaller than a target k
#[derive(Debug, Clone, Copy)]
pub struct SuppressionEngine {
    k_target: usize,
    analyzer: EquivalenceClassAnalyzer,
}

impl SuppressionEngine {
    /// Create an engine for a target k
    ///
    /// # Errors
    ///
    /// `InvalidParameter` for a target of zero.
    pub fn new(k_target: usize) -> AnonResult<Self> {
        if k_target == 0 {
            return Err(AnonymizationError::InvalidParameter(
                "k target must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            k_target,
            analyzer: EquivalenceClassAnalyzer::new(),
        })
    }

    pub fn k_target(&self) -> usize {
        self.k_target
    }

    /// Remove offending records and recompute k on the remainder
    ///
    /// The input is left untouched.
    ///
    /// # Errors
    ///
    /// `EmptyDataset` if the input is empty or every record would be suppressed.
    pub fn apply(
        &self,
        records: &RecordSet,
        qi_tuple: &[String],
    ) -> AnonResult<SuppressionOutcome> {
        let offending = self
            .analyzer
            .classes_below(records, qi_tuple, self.k_target)?;

        let excluded: HashSet<SubjectId> = offending
            .iter()
            .flat_map(|class| class.members().iter().cloned())
            .collect();
        let suppressed_ids: Vec<SubjectId> = records
            .records()
            .iter()
            .map(|record| record.subject_id())
            .filter(|id| excluded.contains(*id))
            .cloned()
            .collect();

        let remaining = records.without_subjects(&excluded);
        if remaining.is_empty() {
            tracing::warn!(
                k_target = self.k_target,
                records = records.len(),
                "Suppression would remove every record"
            );
            return Err(AnonymizationError::EmptyDataset);
        }

        let realized_k = self.analyzer.compute_k(&remaining, qi_tuple)?;
        tracing::debug!(
            k_target = self.k_target,
            classes = offending.len(),
            suppressed = suppressed_ids.len(),
            realized_k,
            "Suppression pass complete"
        );

        Ok(SuppressionOutcome {
            records: remaining,
            suppressed: suppressed_ids.len(),
            suppressed_ids,
            realized_k,
        })
    }
}
