//! Categorical generalizations: hierarchy collapse, coding, geographic rollup

use super::{category_column, Generalized};
use crate::anonymization::codebook::CodebookEntry;
use crate::domain::{AnonResult, AnonymizationError, Value};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Many-to-few rollup through an explicit mapping
///
/// # Errors
///
/// Any input category missing from `mapping` fails with `UnmappedCategory`.
pub fn collapse_categories(
    attribute: &str,
    values: &[Value],
    mapping: &BTreeMap<String, String>,
) -> AnonResult<Generalized> {
    let collapsed = map_all(attribute, values, |category| mapping.get(category))?;
    Ok(Generalized::new(collapsed))
}

/// One-to-one coding of a categorical attribute
///
/// Records a `Codes` codebook entry restricted to the categories actually seen.
///
/// # Errors
///
/// - `InvalidParameter` if two categories share a code
/// - `UnmappedCategory` for a category without a code
pub fn encode_categories(
    attribute: &str,
    values: &[Value],
    codes: &BTreeMap<String, String>,
) -> AnonResult<Generalized> {
    let mut seen_codes = HashSet::new();
    for code in codes.values() {
        if !seen_codes.insert(code) {
            return Err(AnonymizationError::InvalidParameter(format!(
                "code '{code}' for '{attribute}' is assigned to more than one category"
            )));
        }
    }

    let encoded = map_all(attribute, values, |category| codes.get(category))?;
    let used: BTreeMap<String, String> = category_column(attribute, values)?
        .into_iter()
        .filter_map(|category| {
            codes
                .get(category)
                .map(|code| (category.to_string(), code.clone()))
        })
        .collect();

    Ok(Generalized::with_entry(
        encoded,
        CodebookEntry::Codes { codes: used },
    ))
}

/// Geographic lookup table: fine-grained code to coarser region
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeoLookup {
    name: String,
    regions: BTreeMap<String, String>,
}

impl GeoLookup {
    /// Build a named lookup from `(code, region)` pairs
    pub fn new(
        name: impl Into<String>,
        regions: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        Self {
            name: name.into(),
            regions: regions.into_iter().collect(),
        }
    }

    /// Lookup name, as referenced from configuration
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Region for a code
    pub fn region(&self, code: &str) -> Option<&String> {
        self.regions.get(code)
    }

    /// Number of mapped codes
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Check whether the lookup maps no codes
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

/// Replace each geographic code with its region from `lookup`
///
/// # Errors
///
/// Codes absent from the lookup fail with `UnmappedCategory`.
pub fn geo_rollup(
    attribute: &str,
    values: &[Value],
    lookup: &GeoLookup,
) -> AnonResult<Generalized> {
    let rolled = map_all(attribute, values, |code| lookup.region(code))?;
    Ok(Generalized::new(rolled))
}

/// Reduce a postcode to its area: the letters before the first digit
///
/// `"SW1A 1AA"` becomes `"SW"`, `"b15 2tt"` becomes `"B"`.
///
/// # Errors
///
/// `Malformed` if the value does not start with letters followed by a digit.
pub fn postcode_area(attribute: &str, values: &[Value]) -> AnonResult<Generalized> {
    let areas = category_column(attribute, values)?
        .into_iter()
        .map(|postcode| {
            let trimmed = postcode.trim();
            let malformed = || AnonymizationError::Malformed {
                attribute: attribute.to_string(),
                value: postcode.to_string(),
            };
            let digit = trimmed.find(|c: char| c.is_ascii_digit()).ok_or_else(&malformed)?;
            let area = &trimmed[..digit];
            if area.is_empty() || !area.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(malformed());
            }
            Ok(Value::Categorical(area.to_ascii_uppercase()))
        })
        .collect::<AnonResult<Vec<_>>>()?;
    Ok(Generalized::new(areas))
}

/// Replace categories seen fewer than `min_count` times with `label`
pub fn pool_rare(
    attribute: &str,
    values: &[Value],
    min_count: usize,
    label: &str,
) -> AnonResult<Generalized> {
    let categories = category_column(attribute, values)?;
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for category in &categories {
        *counts.entry(*category).or_insert(0) += 1;
    }

    let pooled = categories
        .iter()
        .map(|category| {
            if counts[category] < min_count {
                Value::Categorical(label.to_string())
            } else {
                Value::Categorical(category.to_string())
            }
        })
        .collect();
    Ok(Generalized::new(pooled))
}

fn map_all<'m, F>(attribute: &str, values: &[Value], lookup: F) -> AnonResult<Vec<Value>>
where
    F: Fn(&str) -> Option<&'m String>,
{
    category_column(attribute, values)?
        .into_iter()
        .map(|category| {
            lookup(category)
                .map(|mapped| Value::Categorical(mapped.clone()))
                .ok_or_else(|| AnonymizationError::UnmappedCategory {
                    attribute: attribute.to_string(),
                    value: category.to_string(),
                })
        })
        .collect()
}
