//! Equivalence class analysis
//!
//! Partitions a record set by the values of a quasi-identifier tuple. The k of a
//! release is the size of its smallest class.
//!
//! Classes are reported in first-occurrence order of their key in the input, so
//! repeated analyses of the same data enumerate classes identically.

use crate::domain::{AnonResult, AnonymizationError, RecordSet, SubjectId, Value};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Records sharing identical quasi-identifier values
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EquivalenceClass {
    key: Vec<Value>,
    members: Vec<SubjectId>,
}

impl EquivalenceClass {
    /// Quasi-identifier values shared by the members, in tuple order
    pub fn key(&self) -> &[Value] {
        &self.key
    }

    /// Member subject ids, in input order
    pub fn members(&self) -> &[SubjectId] {
        &self.members
    }

    pub fn size(&self) -> usize {
        self.members.len()
    }
}

/// All equivalence classes of a record set under one quasi-identifier tuple
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Partition {
    qi_tuple: Vec<String>,
    classes: Vec<EquivalenceClass>,
}

impl Partition {
    pub fn qi_tuple(&self) -> &[String] {
        &self.qi_tuple
    }

    pub fn classes(&self) -> &[EquivalenceClass] {
        &self.classes
    }

    /// Smallest class size
    pub fn k(&self) -> usize {
        self.classes
            .iter()
            .map(EquivalenceClass::size)
            .min()
            .unwrap_or(0)
    }

    /// Classes with fewer than `threshold` members
    pub fn below(&self, threshold: usize) -> Vec<&EquivalenceClass> {
        self.classes
            .iter()
            .filter(|class| class.size() < threshold)
            .collect()
    }

    /// Number of classes per class size
    pub fn size_distribution(&self) -> BTreeMap<usize, usize> {
        let mut distribution = BTreeMap::new();
        for class in &self.classes {
            *distribution.entry(class.size()).or_insert(0) += 1;
        }
        distribution
    }

    /// Number of classes holding a single record
    pub fn unique_classes(&self) -> usize {
        self.classes.iter().filter(|class| class.size() == 1).count()
    }
}

/// Computes equivalence classes and k over a chosen quasi-identifier tuple
#[derive(Debug, Clone, Copy, Default)]
pub struct EquivalenceClassAnalyzer;

impl EquivalenceClassAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Partition `records` by equal values over `qi_tuple`
    ///
    /// # Errors
    ///
    /// - `EmptyDataset` when there are no records
    /// - `InvalidParameter` for an empty tuple
    /// - `UnknownAttribute` for a tuple attribute missing from the schema
    pub fn partition(&self, records: &RecordSet, qi_tuple: &[String]) -> AnonResult<Partition> {
        if qi_tuple.is_empty() {
            return Err(AnonymizationError::InvalidParameter(
                "quasi-identifier tuple is empty".to_string(),
            ));
        }
        let indices = qi_tuple
            .iter()
            .map(|name| records.column_index(name))
            .collect::<AnonResult<Vec<_>>>()?;
        if records.is_empty() {
            return Err(AnonymizationError::EmptyDataset);
        }

        let mut positions: HashMap<Vec<Value>, usize> = HashMap::new();
        let mut classes: Vec<EquivalenceClass> = Vec::new();
        for record in records.records() {
            let key: Vec<Value> = indices
                .iter()
                .map(|&i| record.values()[i].clone())
                .collect();
            match positions.get(&key) {
                Some(&position) => classes[position].members.push(record.subject_id().clone()),
                None => {
                    positions.insert(key.clone(), classes.len());
                    classes.push(EquivalenceClass {
                        key,
                        members: vec![record.subject_id().clone()],
                    });
                }
            }
        }

        Ok(Partition {
            qi_tuple: qi_tuple.to_vec(),
            classes,
        })
    }

    /// Minimum equivalence class size
    pub fn compute_k(&self, records: &RecordSet, qi_tuple: &[String]) -> AnonResult<usize> {
        Ok(self.partition(records, qi_tuple)?.k())
    }

    /// Classes smaller than `threshold`, in first-occurrence order
    pub fn classes_below(
        &self,
        records: &RecordSet,
        qi_tuple: &[String],
        threshold: usize,
    ) -> AnonResult<Vec<EquivalenceClass>> {
        let partition = self.partition(records, qi_tuple)?;
        Ok(partition.below(threshold).into_iter().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Attribute, AttributeRole, Schema, ValueKind};

    fn qi() -> Vec<String> {
        vec!["gender".to_string(), "age_band".to_string()]
    }

    fn records(rows: &[(&str, &str)]) -> RecordSet {
        let schema = Schema::new(vec![
            Attribute::new("gender", AttributeRole::QuasiIdentifier, ValueKind::Categorical),
            Attribute::new("age_band", AttributeRole::QuasiIdentifier, ValueKind::Categorical),
        ])
        .unwrap();
        let mut set = RecordSet::new(schema);
        for (i, (gender, band)) in rows.iter().enumerate() {
            set.push(
                SubjectId::new(format!("s{i}")).unwrap(),
                vec![Value::from(*gender), Value::from(*band)],
            )
            .unwrap();
        }
        set
    }

    #[test]
    fn test_classes_in_first_occurrence_order() {
        let set = records(&[("F", "B"), ("M", "A"), ("F", "B"), ("M", "B")]);
        let partition = EquivalenceClassAnalyzer::new().partition(&set, &qi()).unwrap();

        let keys: Vec<String> = partition
            .classes()
            .iter()
            .map(|c| format!("{}/{}", c.key()[0], c.key()[1]))
            .collect();
        assert_eq!(keys, vec!["F/B", "M/A", "M/B"]);
        assert_eq!(partition.classes()[0].members()[1].as_str(), "s2");
        assert_eq!(partition.unique_classes(), 2);
        assert_eq!(partition.size_distribution(), BTreeMap::from([(1, 2), (2, 1)]));
    }

    #[test]
    fn test_compute_k_is_min_class_size() {
        let set = records(&[
            ("M", "A"),
            ("M", "A"),
            ("M", "A"),
            ("F", "A"),
            ("F", "A"),
        ]);
        assert_eq!(EquivalenceClassAnalyzer::new().compute_k(&set, &qi()).unwrap(), 2);
    }

    #[test]
    fn test_classes_below_threshold() {
        let set = records(&[("M", "A"), ("M", "A"), ("F", "B")]);
        let below = EquivalenceClassAnalyzer::new()
            .classes_below(&set, &qi(), 2)
            .unwrap();
        assert_eq!(below.len(), 1);
        assert_eq!(below[0].members()[0].as_str(), "s2");
    }

    #[test]
    fn test_empty_dataset() {
        let set = records(&[]);
        assert_eq!(
            EquivalenceClassAnalyzer::new().compute_k(&set, &qi()),
            Err(AnonymizationError::EmptyDataset)
        );
    }

    #[test]
    fn test_unknown_and_empty_tuple() {
        let set = records(&[("M", "A")]);
        let analyzer = EquivalenceClassAnalyzer::new();
        assert!(matches!(
            analyzer.compute_k(&set, &["postcode".to_string()]),
            Err(AnonymizationError::UnknownAttribute { .. })
        ));
        assert!(matches!(
            analyzer.compute_k(&set, &[]),
            Err(AnonymizationError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_missing_values_form_their_own_class() {
        let schema = Schema::new(vec![Attribute::new(
            "region",
            AttributeRole::QuasiIdentifier,
            ValueKind::Categorical,
        )])
        .unwrap();
        let mut set = RecordSet::new(schema);
        for (i, value) in [Value::Missing, Value::from("North"), Value::Missing]
            .into_iter()
            .enumerate()
        {
            set.push(SubjectId::new(format!("s{i}")).unwrap(), vec![value])
                .unwrap();
        }
        let k = EquivalenceClassAnalyzer::new()
            .compute_k(&set, &["region".to_string()])
            .unwrap();
        assert_eq!(k, 1);
    }
}
