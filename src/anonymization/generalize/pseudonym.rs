//! Pseudonymization with an injected random source

use super::Generalized;
use crate::anonymization::codebook::CodebookEntry;
use crate::domain::{AnonResult, AnonymizationError, Value};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

fn default_alphabet() -> String {
    "abcdefghijklmnopqrstuvwxyz".to_string()
}

fn default_digits() -> u32 {
    4
}

/// How pseudonym tokens are produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PseudonymScheme {
    /// Spreadsheet-style letter tokens (`a`, `b`, ..., `z`, `aa`, `ab`, ...)
    /// handed out to distinct values in shuffled order
    Alphabet {
        #[serde(default = "default_alphabet")]
        alphabet: String,
    },
    /// `prefix` followed by fixed-width random digits
    Random {
        #[serde(default)]
        prefix: String,
        #[serde(default = "default_digits")]
        digits: u32,
    },
}

impl Default for PseudonymScheme {
    fn default() -> Self {
        PseudonymScheme::Alphabet {
            alphabet: default_alphabet(),
        }
    }
}

/// Assign one opaque token per distinct value
///
/// The same value always receives the same token within one call. Token order
/// carries no information about the original values.
///
/// # Errors
///
/// - `TypeMismatch` for missing values
/// - `InvalidParameter` for an empty alphabet, duplicate alphabet characters, or
///   a digit width too small for the number of distinct values
pub fn pseudonymize<R>(
    attribute: &str,
    values: &[Value],
    scheme: &PseudonymScheme,
    rng: &mut R,
) -> AnonResult<Generalized>
where
    R: Rng + ?Sized,
{
    let mut distinct: Vec<&Value> = Vec::new();
    let mut slots: HashMap<&Value, usize> = HashMap::new();
    let mut positions = Vec::with_capacity(values.len());
    for value in values {
        if value.is_missing() {
            return Err(super::type_mismatch(attribute, "non-missing", value));
        }
        let slot = *slots.entry(value).or_insert_with(|| {
            distinct.push(value);
            distinct.len() - 1
        });
        positions.push(slot);
    }

    let tokens = match scheme {
        PseudonymScheme::Alphabet { alphabet } => {
            alphabet_tokens(attribute, alphabet, distinct.len(), rng)?
        }
        PseudonymScheme::Random { prefix, digits } => {
            random_tokens(attribute, prefix, *digits, distinct.len(), rng)?
        }
    };

    let pseudonyms = positions
        .iter()
        .map(|&slot| Value::Categorical(tokens[slot].clone()))
        .collect();
    let table: BTreeMap<String, String> = distinct
        .iter()
        .map(|value| value.to_string())
        .zip(tokens)
        .collect();

    Ok(Generalized::with_entry(
        pseudonyms,
        CodebookEntry::Pseudonyms { tokens: table },
    ))
}

fn alphabet_tokens<R: Rng + ?Sized>(
    attribute: &str,
    alphabet: &str,
    count: usize,
    rng: &mut R,
) -> AnonResult<Vec<String>> {
    let symbols: Vec<char> = alphabet.chars().collect();
    let unique: HashSet<&char> = symbols.iter().collect();
    if symbols.is_empty() || unique.len() != symbols.len() {
        return Err(AnonymizationError::InvalidParameter(format!(
            "pseudonym alphabet for '{attribute}' must be non-empty without repeated characters"
        )));
    }

    let mut tokens: Vec<String> = (0..count).map(|i| bijective_token(&symbols, i)).collect();
    tokens.shuffle(rng);
    Ok(tokens)
}

/// `i`-th token in bijective base-k numbering over `symbols`
fn bijective_token(symbols: &[char], index: usize) -> String {
    let base = symbols.len();
    let mut n = index + 1;
    let mut out = Vec::new();
    while n > 0 {
        n -= 1;
        out.push(symbols[n % base]);
        n /= base;
    }
    out.iter().rev().collect()
}

fn random_tokens<R: Rng + ?Sized>(
    attribute: &str,
    prefix: &str,
    digits: u32,
    count: usize,
    rng: &mut R,
) -> AnonResult<Vec<String>> {
    if !(1..=18).contains(&digits) {
        return Err(AnonymizationError::InvalidParameter(format!(
            "pseudonym width for '{attribute}' must be between 1 and 18 digits"
        )));
    }
    let space = 10u64.pow(digits);
    if (count as u64) > space {
        return Err(AnonymizationError::InvalidParameter(format!(
            "{digits} digits cannot give {count} distinct pseudonyms for '{attribute}'"
        )));
    }

    let width = digits as usize;
    let mut issued = HashSet::with_capacity(count);
    let mut tokens = Vec::with_capacity(count);
    while tokens.len() < count {
        let n = rng.gen_range(0..space);
        if issued.insert(n) {
            tokens.push(format!("{prefix}{n:0width$}"));
        }
    }
    Ok(tokens)
}
