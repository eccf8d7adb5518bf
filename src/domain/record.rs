//! Record model
//!
//! A [`RecordSet`] holds one [`Schema`] and a list of [`Record`] rows whose values
//! are aligned to it by position, so every record in a working set shares the
//! same attribute schema by construction.

use crate::domain::errors::AnonymizationError;
use crate::domain::ids::SubjectId;
use crate::domain::result::AnonResult;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Date formats accepted when parsing raw date values
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];

/// Typed attribute value
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Value {
    /// No value recorded
    Missing,
    /// Categorical label
    Categorical(String),
    /// Numeric measurement
    Numeric(f64),
    /// Free text
    Text(String),
    /// Calendar date
    Date(NaiveDate),
}

impl Value {
    /// Parse a raw string into a value of the requested kind
    ///
    /// Empty input becomes [`Value::Missing`] regardless of kind.
    pub fn parse(kind: ValueKind, raw: &str) -> Result<Self, String> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(Value::Missing);
        }

        match kind {
            ValueKind::Categorical => Ok(Value::Categorical(raw.to_string())),
            ValueKind::Text => Ok(Value::Text(raw.to_string())),
            ValueKind::Numeric => match raw.parse::<f64>() {
                Ok(n) if n.is_finite() => Ok(Value::Numeric(n)),
                Ok(_) => Err(format!("'{raw}' is not a finite number")),
                Err(_) => Err(format!("'{raw}' is not numeric")),
            },
            ValueKind::Date => DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                .map(Value::Date)
                .ok_or_else(|| format!("'{raw}' is not a date")),
        }
    }

    /// Name of the value's kind, used in error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Missing => "missing",
            Value::Categorical(_) => "categorical",
            Value::Numeric(_) => "numeric",
            Value::Text(_) => "text",
            Value::Date(_) => "date",
        }
    }

    /// Numeric payload, if any
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Numeric(n) => Some(*n),
            _ => None,
        }
    }

    /// Label of a categorical or text value
    pub fn as_category(&self) -> Option<&str> {
        match self {
            Value::Categorical(s) | Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Date payload, if any
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Check whether the value is missing
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// Bit pattern used for numeric equality and hashing
    ///
    /// `-0.0` folds onto `0.0` and every NaN onto one canonical NaN.
    fn numeric_bits(n: f64) -> u64 {
        if n == 0.0 {
            0.0_f64.to_bits()
        } else if n.is_nan() {
            f64::NAN.to_bits()
        } else {
            n.to_bits()
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Missing, Value::Missing) => true,
            (Value::Categorical(a), Value::Categorical(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Numeric(a), Value::Numeric(b)) => {
                Self::numeric_bits(*a) == Self::numeric_bits(*b)
            }
            (Value::Date(a), Value::Date(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Missing => {}
            Value::Categorical(s) | Value::Text(s) => s.hash(state),
            Value::Numeric(n) => Self::numeric_bits(*n).hash(state),
            Value::Date(d) => d.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Missing => Ok(()),
            Value::Categorical(s) | Value::Text(s) => write!(f, "{s}"),
            Value::Numeric(n) => write!(f, "{n}"),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Categorical(s.to_string())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Numeric(n)
    }
}

/// Declared kind of an attribute's values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// Categorical labels
    Categorical,
    /// Numeric measurements
    Numeric,
    /// Free text
    Text,
    /// Calendar dates
    Date,
}

/// Privacy role of an attribute
///
/// Drives which transformations are legal or required. Direct identifiers must
/// never appear in a released record set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeRole {
    /// Uniquely identifies a person on its own (name, phone, account number)
    DirectIdentifier,
    /// Identifying in combination with other attributes (age, gender, postcode)
    QuasiIdentifier,
    /// Attribute under study that must stay private
    SensitiveAttribute,
    /// Exposure variable of the study
    ExposureVariable,
}

impl AttributeRole {
    /// Roles released by default when a view does not list its columns
    pub fn releasable() -> Vec<AttributeRole> {
        vec![
            AttributeRole::QuasiIdentifier,
            AttributeRole::SensitiveAttribute,
            AttributeRole::ExposureVariable,
        ]
    }
}

impl fmt::Display for AttributeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AttributeRole::DirectIdentifier => "direct_identifier",
            AttributeRole::QuasiIdentifier => "quasi_identifier",
            AttributeRole::SensitiveAttribute => "sensitive_attribute",
            AttributeRole::ExposureVariable => "exposure_variable",
        };
        write!(f, "{label}")
    }
}

/// A named, typed attribute with its privacy role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Column name
    pub name: String,
    /// Privacy role
    pub role: AttributeRole,
    /// Declared value kind
    pub kind: ValueKind,
}

impl Attribute {
    /// Create a new attribute
    pub fn new(name: impl Into<String>, role: AttributeRole, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            role,
            kind,
        }
    }
}

/// Ordered attribute schema shared by every record of a set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    attributes: Vec<Attribute>,
}

impl Schema {
    /// Build a schema, rejecting duplicate attribute names
    pub fn new(attributes: Vec<Attribute>) -> AnonResult<Self> {
        let mut seen = HashSet::new();
        for attribute in &attributes {
            if !seen.insert(attribute.name.as_str()) {
                return Err(AnonymizationError::InvalidParameter(format!(
                    "duplicate attribute '{}' in schema",
                    attribute.name
                )));
            }
        }
        Ok(Self { attributes })
    }

    /// Attributes in column order
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Number of attributes
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Check whether the schema has no attributes
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Column position of an attribute
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.attributes.iter().position(|a| a.name == name)
    }

    /// Look up an attribute by name
    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Attribute names in column order
    pub fn names(&self) -> Vec<&str> {
        self.attributes.iter().map(|a| a.name.as_str()).collect()
    }

    /// Names of the attributes carrying a role
    pub fn with_role(&self, role: AttributeRole) -> Vec<&str> {
        self.attributes
            .iter()
            .filter(|a| a.role == role)
            .map(|a| a.name.as_str())
            .collect()
    }
}

/// One subject's values, aligned to the owning set's schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    subject_id: SubjectId,
    values: Vec<Value>,
}

impl Record {
    /// Synthetic subject identifier
    pub fn subject_id(&self) -> &SubjectId {
        &self.subject_id
    }

    /// Values in schema order
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Value at a column position
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }
}

/// A homogeneous set of records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSet {
    schema: Schema,
    records: Vec<Record>,
}

impl RecordSet {
    /// Create an empty record set over a schema
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            records: Vec::new(),
        }
    }

    /// Append a record; the value count must match the schema
    pub fn push(&mut self, subject_id: SubjectId, values: Vec<Value>) -> AnonResult<()> {
        if values.len() != self.schema.len() {
            return Err(AnonymizationError::InvalidParameter(format!(
                "record {} has {} values, schema has {} attributes",
                subject_id,
                values.len(),
                self.schema.len()
            )));
        }
        self.records.push(Record { subject_id, values });
        Ok(())
    }

    /// The shared schema
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Records in input order
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check whether the set has no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Column position of an attribute, failing for unknown names
    pub fn column_index(&self, name: &str) -> AnonResult<usize> {
        self.schema
            .index_of(name)
            .ok_or_else(|| AnonymizationError::UnknownAttribute {
                attribute: name.to_string(),
            })
    }

    /// Copy of one column's values in record order
    pub fn column(&self, name: &str) -> AnonResult<Vec<Value>> {
        let index = self.column_index(name)?;
        Ok(self
            .records
            .iter()
            .map(|r| r.values[index].clone())
            .collect())
    }

    /// Replace a column with transformed values under a (possibly new) attribute
    ///
    /// The replacement takes the source column's position.
    pub fn replace_column(
        &mut self,
        name: &str,
        attribute: Attribute,
        values: Vec<Value>,
    ) -> AnonResult<()> {
        let index = self.column_index(name)?;
        if values.len() != self.records.len() {
            return Err(AnonymizationError::InvalidParameter(format!(
                "replacement for '{}' has {} values, record set has {}",
                name,
                values.len(),
                self.records.len()
            )));
        }
        if attribute.name != name && self.schema.index_of(&attribute.name).is_some() {
            return Err(AnonymizationError::InvalidParameter(format!(
                "output attribute '{}' already exists",
                attribute.name
            )));
        }

        self.schema.attributes[index] = attribute;
        for (record, value) in self.records.iter_mut().zip(values) {
            record.values[index] = value;
        }
        Ok(())
    }

    /// Remove a column
    pub fn drop_column(&mut self, name: &str) -> AnonResult<()> {
        let index = self.column_index(name)?;
        self.schema.attributes.remove(index);
        for record in &mut self.records {
            record.values.remove(index);
        }
        Ok(())
    }

    /// Project onto the named columns, in the given order
    pub fn select(&self, names: &[String]) -> AnonResult<RecordSet> {
        let indices = names
            .iter()
            .map(|n| self.column_index(n))
            .collect::<AnonResult<Vec<_>>>()?;
        Ok(self.project(&indices))
    }

    /// Project onto the columns whose role is listed, keeping schema order
    pub fn select_roles(&self, roles: &[AttributeRole]) -> RecordSet {
        let indices: Vec<usize> = self
            .schema
            .attributes
            .iter()
            .enumerate()
            .filter(|(_, a)| roles.contains(&a.role))
            .map(|(i, _)| i)
            .collect();
        self.project(&indices)
    }

    /// Copy of the set without the listed subjects
    pub fn without_subjects(&self, excluded: &HashSet<SubjectId>) -> RecordSet {
        RecordSet {
            schema: self.schema.clone(),
            records: self
                .records
                .iter()
                .filter(|r| !excluded.contains(&r.subject_id))
                .cloned()
                .collect(),
        }
    }

    fn project(&self, indices: &[usize]) -> RecordSet {
        let attributes = indices
            .iter()
            .map(|&i| self.schema.attributes[i].clone())
            .collect();
        let records = self
            .records
            .iter()
            .map(|r| Record {
                subject_id: r.subject_id.clone(),
                values: indices.iter().map(|&i| r.values[i].clone()).collect(),
            })
            .collect();

        RecordSet {
            schema: Schema { attributes },
            records,
        }
    }
}
