//! Numeric banding: equal-frequency (quantile) and caller-defined (fixed) bands

use super::{numeric_column, Generalized};
use crate::anonymization::codebook::CodebookEntry;
use crate::domain::{AnonResult, AnonymizationError, Value};
use std::collections::HashSet;

/// Partition a numeric column into `q` equal-frequency bands
///
/// Band edges are the linearly interpolated `i/q` quantiles of the column. The
/// first band is closed (`[e0, e1]`), the others half-open (`(e(i-1), e(i)]`).
/// Unless `labels` are supplied (exactly `q` of them), each value is replaced by
/// its band's interval description.
///
/// # Errors
///
/// - `InsufficientData` if the column has fewer than `q` distinct values, or if
///   ties leave any band empty
/// - `TypeMismatch` for non-numeric values
/// - `Malformed` for NaN or infinite values
/// - `InvalidParameter` for `q == 0` or a wrong label count
pub fn quantile_bin(
    attribute: &str,
    values: &[Value],
    q: usize,
    labels: Option<&[String]>,
) -> AnonResult<Generalized> {
    if q == 0 {
        return Err(AnonymizationError::InvalidParameter(format!(
            "quantile count for '{attribute}' must be at least 1"
        )));
    }
    if let Some(labels) = labels {
        if labels.len() != q {
            return Err(AnonymizationError::InvalidParameter(format!(
                "'{attribute}' has {} labels for {q} quantile bands",
                labels.len()
            )));
        }
    }

    let numbers = numeric_column(attribute, values)?;
    let distinct = values.iter().collect::<HashSet<&Value>>().len();
    if distinct < q {
        return Err(AnonymizationError::InsufficientData {
            attribute: attribute.to_string(),
            distinct,
            required: q,
        });
    }

    let mut sorted = numbers.clone();
    sorted.sort_by(f64::total_cmp);
    let edges: Vec<f64> = (0..=q)
        .map(|i| interpolated_quantile(&sorted, i as f64 / q as f64))
        .collect();

    let bands: Vec<usize> = numbers.iter().map(|&n| quantile_band(&edges, n)).collect();
    let mut counts = vec![0usize; q];
    for &band in &bands {
        counts[band] += 1;
    }
    if counts.contains(&0) {
        return Err(AnonymizationError::InsufficientData {
            attribute: attribute.to_string(),
            distinct,
            required: q,
        });
    }

    let labels: Vec<String> = match labels {
        Some(labels) => labels.to_vec(),
        None => interval_labels(&edges),
    };
    let binned = bands
        .iter()
        .map(|&band| Value::Categorical(labels[band].clone()))
        .collect();

    Ok(Generalized::with_entry(
        binned,
        CodebookEntry::Bands { edges, labels },
    ))
}

/// Partition a numeric column using caller-supplied boundaries
///
/// Bands are `[e(i), e(i+1))`, with the last band closed at the top. Values
/// outside `[e0, e_last]` are replaced by `catch_all` when one is configured.
///
/// # Errors
///
/// - `OutOfRange` for a value outside the boundaries without a catch-all label
/// - `TypeMismatch` for non-numeric values
/// - `Malformed` for NaN or infinite values, even with a catch-all label
/// - `InvalidParameter` if edges are not strictly increasing or the label count
///   is not one less than the edge count
pub fn fixed_bin(
    attribute: &str,
    values: &[Value],
    edges: &[f64],
    labels: &[String],
    catch_all: Option<&str>,
) -> AnonResult<Generalized> {
    if edges.len() < 2 {
        return Err(AnonymizationError::InvalidParameter(format!(
            "'{attribute}' needs at least two band edges"
        )));
    }
    if !edges.windows(2).all(|pair| pair[0] < pair[1]) {
        return Err(AnonymizationError::InvalidParameter(format!(
            "band edges for '{attribute}' must be strictly increasing"
        )));
    }
    if labels.len() != edges.len() - 1 {
        return Err(AnonymizationError::InvalidParameter(format!(
            "'{attribute}' has {} labels for {} bands",
            labels.len(),
            edges.len() - 1
        )));
    }

    let numbers = numeric_column(attribute, values)?;
    let lower = edges[0];
    let upper = edges[edges.len() - 1];

    let binned = numbers
        .iter()
        .map(|&n| {
            if n >= lower && n <= upper {
                let band = (edges.partition_point(|&e| e <= n) - 1).min(labels.len() - 1);
                return Ok(Value::Categorical(labels[band].clone()));
            }
            match catch_all {
                Some(label) => Ok(Value::Categorical(label.to_string())),
                None => Err(AnonymizationError::OutOfRange {
                    attribute: attribute.to_string(),
                    value: n.to_string(),
                    reason: format!("outside [{lower}, {upper}]"),
                }),
            }
        })
        .collect::<AnonResult<Vec<_>>>()?;

    Ok(Generalized::with_entry(
        binned,
        CodebookEntry::Bands {
            edges: edges.to_vec(),
            labels: labels.to_vec(),
        },
    ))
}

/// Linearly interpolated quantile of a sorted, non-empty slice
fn interpolated_quantile(sorted: &[f64], p: f64) -> f64 {
    let position = p * (sorted.len() - 1) as f64;
    let lo = position.floor() as usize;
    let hi = position.ceil() as usize;
    let fraction = position - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * fraction
}

/// Band of a value given quantile edges; values equal to an edge fall left
fn quantile_band(edges: &[f64], n: f64) -> usize {
    let bands = edges.len() - 1;
    edges[1..].partition_point(|&e| e < n).min(bands - 1)
}

fn interval_labels(edges: &[f64]) -> Vec<String> {
    edges
        .windows(2)
        .enumerate()
        .map(|(i, pair)| {
            let open = if i == 0 { '[' } else { '(' };
            format!("{open}{}, {}]", format_edge(pair[0]), format_edge(pair[1]))
        })
        .collect()
}

fn format_edge(edge: f64) -> String {
    let text = format!("{edge:.3}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}
