//! Transformation pipeline
//!
//! Applies an ordered list of [`TransformationSpec`] steps to a record set. Each
//! step reads one attribute, runs one generalization over it and writes the
//! result back (in place, or under a new name at the same column position), or
//! drops the attribute entirely. Reverse-mapping metadata is routed to a
//! [`Codebook`] instead of the released table.
//!
//! The pipeline is all-or-nothing: the input is never modified and any failing
//! step aborts the run, so a partially transformed table can never escape.

use crate::anonymization::codebook::{Codebook, Deviation};
use crate::anonymization::generalize::{self, GeoLookup, Generalized, PseudonymScheme};
use crate::domain::{
    AnonResult, AnonymizationError, Attribute, AttributeRole, RecordSet, Value, ValueKind,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Generalization operation and its parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Generalization {
    /// Equal-frequency bands
    QuantileBin {
        q: usize,
        #[serde(default)]
        labels: Option<Vec<String>>,
    },
    /// Caller-defined bands
    FixedBin {
        edges: Vec<f64>,
        labels: Vec<String>,
        #[serde(default)]
        catch_all: Option<String>,
    },
    /// Many-to-few categorical rollup
    CollapseCategories { mapping: BTreeMap<String, String> },
    /// Geographic rollup through a named lookup table
    GeoRollup { lookup: String },
    /// Opaque per-value tokens
    Pseudonymize {
        #[serde(default)]
        scheme: PseudonymScheme,
    },
    /// Z-scores
    Standardize {
        #[serde(default)]
        deviation: Deviation,
    },
    /// One-to-one category coding
    EncodeCategories { codes: BTreeMap<String, String> },
    /// Date of birth to age in years
    DeriveAge { reference_year: i32 },
    /// Postcode to postcode area
    PostcodeArea,
    /// Pool infrequent categories under one label
    PoolRare { min_count: usize, label: String },
    /// Remove the attribute from the released table
    Drop,
}

impl Generalization {
    /// Operation name as written in configuration
    pub fn name(&self) -> &'static str {
        match self {
            Generalization::QuantileBin { .. } => "quantile_bin",
            Generalization::FixedBin { .. } => "fixed_bin",
            Generalization::CollapseCategories { .. } => "collapse_categories",
            Generalization::GeoRollup { .. } => "geo_rollup",
            Generalization::Pseudonymize { .. } => "pseudonymize",
            Generalization::Standardize { .. } => "standardize",
            Generalization::EncodeCategories { .. } => "encode_categories",
            Generalization::DeriveAge { .. } => "derive_age",
            Generalization::PostcodeArea => "postcode_area",
            Generalization::PoolRare { .. } => "pool_rare",
            Generalization::Drop => "drop",
        }
    }

    /// Kind of the values the operation produces
    fn output_kind(&self) -> ValueKind {
        match self {
            Generalization::Standardize { .. } | Generalization::DeriveAge { .. } => {
                ValueKind::Numeric
            }
            _ => ValueKind::Categorical,
        }
    }
}

/// One pipeline step: which attribute, which operation, where the result goes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformationSpec {
    /// Source attribute
    pub attribute: String,
    /// Output attribute name; defaults to the source name
    #[serde(default)]
    pub output: Option<String>,
    /// Role of the output attribute; defaults to the source role
    #[serde(default)]
    pub role: Option<AttributeRole>,
    /// Operation to apply
    #[serde(flatten)]
    pub op: Generalization,
}

impl TransformationSpec {
    pub fn new(attribute: impl Into<String>, op: Generalization) -> Self {
        Self {
            attribute: attribute.into(),
            output: None,
            role: None,
            op,
        }
    }

    /// Write the result under a different attribute name
    pub fn output(mut self, name: impl Into<String>) -> Self {
        self.output = Some(name.into());
        self
    }

    /// Override the role of the output attribute
    pub fn role(mut self, role: AttributeRole) -> Self {
        self.role = Some(role);
        self
    }

    /// Name the step writes to
    pub fn output_name(&self) -> &str {
        self.output.as_deref().unwrap_or(&self.attribute)
    }
}

/// Distribution of a step's output, for manual review before release
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputSummary {
    /// Record count per output category or band
    Categories { counts: BTreeMap<String, usize> },
    /// Range of a numeric output
    Numeric { count: usize, min: f64, max: f64 },
    /// Attribute removed
    Dropped,
}

/// Diagnostics for one executed step
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepSummary {
    pub attribute: String,
    pub output: String,
    pub operation: String,
    pub summary: OutputSummary,
}

/// Result of a pipeline run
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Transformed records
    pub records: RecordSet,
    /// Reverse mappings produced by the steps
    pub codebook: Codebook,
    /// Per-step diagnostics, in step order
    pub summaries: Vec<StepSummary>,
}

/// Ordered list of transformation steps with their injected collaborators
#[derive(Debug, Clone, Default)]
pub struct TransformationPipeline {
    steps: Vec<TransformationSpec>,
    lookups: BTreeMap<String, GeoLookup>,
    seed: Option<u64>,
}

impl TransformationPipeline {
    pub fn new(steps: Vec<TransformationSpec>) -> Self {
        Self {
            steps,
            ..Self::default()
        }
    }

    /// Register the geographic lookup tables steps may reference by name
    pub fn with_lookups(mut self, lookups: impl IntoIterator<Item = GeoLookup>) -> Self {
        self.lookups = lookups
            .into_iter()
            .map(|lookup| (lookup.name().to_string(), lookup))
            .collect();
        self
    }

    /// Fix the random source used by pseudonymization
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn steps(&self) -> &[TransformationSpec] {
        &self.steps
    }

    /// Run every step, seeding a fresh random source for this run
    pub fn run(&self, records: &RecordSet) -> AnonResult<PipelineOutput> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.run_with_rng(records, &mut rng)
    }

    /// Run every step with a caller-supplied random source
    ///
    /// # Errors
    ///
    /// `DirectIdentifierLeak` if the input still carries direct identifiers;
    /// otherwise the first failing step's error.
    pub fn run_with_rng<R>(&self, records: &RecordSet, rng: &mut R) -> AnonResult<PipelineOutput>
    where
        R: Rng + ?Sized,
    {
        let leaked: Vec<String> = records
            .schema()
            .with_role(AttributeRole::DirectIdentifier)
            .into_iter()
            .map(str::to_string)
            .collect();
        if !leaked.is_empty() {
            return Err(AnonymizationError::DirectIdentifierLeak { attributes: leaked });
        }

        let mut working = records.clone();
        let mut codebook = Codebook::new();
        let mut summaries = Vec::with_capacity(self.steps.len());

        for step in &self.steps {
            let summary = self.apply_step(step, &mut working, &mut codebook, rng)?;
            tracing::debug!(
                attribute = %step.attribute,
                output = %step.output_name(),
                operation = step.op.name(),
                "Applied transformation step"
            );
            summaries.push(summary);
        }

        Ok(PipelineOutput {
            records: working,
            codebook,
            summaries,
        })
    }

    fn apply_step<R>(
        &self,
        step: &TransformationSpec,
        working: &mut RecordSet,
        codebook: &mut Codebook,
        rng: &mut R,
    ) -> AnonResult<StepSummary>
    where
        R: Rng + ?Sized,
    {
        let name = step.attribute.as_str();
        let source = working
            .schema()
            .get(name)
            .cloned()
            .ok_or_else(|| AnonymizationError::UnknownAttribute {
                attribute: name.to_string(),
            })?;

        let describe = |summary: OutputSummary| StepSummary {
            attribute: step.attribute.clone(),
            output: step.output_name().to_string(),
            operation: step.op.name().to_string(),
            summary,
        };

        if matches!(step.op, Generalization::Drop) {
            working.drop_column(name)?;
            return Ok(describe(OutputSummary::Dropped));
        }

        let role = step.role.unwrap_or(source.role);
        if role == AttributeRole::DirectIdentifier {
            return Err(AnonymizationError::InvalidParameter(format!(
                "step on '{name}' cannot produce a direct identifier"
            )));
        }

        let values = working.column(name)?;
        let Generalized { values, entry } = self.generalize(name, &values, &step.op, rng)?;
        let output = step.output_name();
        let distribution = summarize(&values);

        working.replace_column(name, Attribute::new(output, role, step.op.output_kind()), values)?;
        if let Some(entry) = entry {
            codebook.insert(output, entry);
        }
        Ok(describe(distribution))
    }

    fn generalize<R>(
        &self,
        attribute: &str,
        values: &[Value],
        op: &Generalization,
        rng: &mut R,
    ) -> AnonResult<Generalized>
    where
        R: Rng + ?Sized,
    {
        match op {
            Generalization::QuantileBin { q, labels } => {
                generalize::quantile_bin(attribute, values, *q, labels.as_deref())
            }
            Generalization::FixedBin {
                edges,
                labels,
                catch_all,
            } => generalize::fixed_bin(attribute, values, edges, labels, catch_all.as_deref()),
            Generalization::CollapseCategories { mapping } => {
                generalize::collapse_categories(attribute, values, mapping)
            }
            Generalization::GeoRollup { lookup } => {
                let table = self.lookups.get(lookup).ok_or_else(|| {
                    AnonymizationError::InvalidParameter(format!(
                        "lookup table '{lookup}' is not loaded"
                    ))
                })?;
                generalize::geo_rollup(attribute, values, table)
            }
            Generalization::Pseudonymize { scheme } => {
                generalize::pseudonymize(attribute, values, scheme, rng)
            }
            Generalization::Standardize { deviation } => {
                generalize::standardize(attribute, values, *deviation)
            }
            Generalization::EncodeCategories { codes } => {
                generalize::encode_categories(attribute, values, codes)
            }
            Generalization::DeriveAge { reference_year } => {
                generalize::derive_age(attribute, values, *reference_year)
            }
            Generalization::PostcodeArea => generalize::postcode_area(attribute, values),
            Generalization::PoolRare { min_count, label } => {
                generalize::pool_rare(attribute, values, *min_count, label)
            }
            Generalization::Drop => Err(AnonymizationError::InvalidParameter(
                "drop is not a value transformation".to_string(),
            )),
        }
    }
}

fn summarize(values: &[Value]) -> OutputSummary {
    let numbers: Option<Vec<f64>> = values.iter().map(Value::as_f64).collect();
    match numbers {
        Some(numbers) if !numbers.is_empty() => OutputSummary::Numeric {
            count: numbers.len(),
            min: numbers.iter().copied().fold(f64::INFINITY, f64::min),
            max: numbers.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        },
        _ => {
            let mut counts = BTreeMap::new();
            for value in values {
                *counts.entry(value.to_string()).or_insert(0) += 1;
            }
            OutputSummary::Categories { counts }
        }
    }
}
