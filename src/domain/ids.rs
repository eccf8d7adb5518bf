//! Subject identifier types
//!
//! Every record carries a synthetic [`SubjectId`] that is generated once when the
//! record enters the system. It is never derived from identifying attributes, so
//! it can travel with both the released dataset and the separately held key file.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Synthetic subject identifier newtype wrapper
///
/// # Examples
///
/// ```
/// use kanon::domain::ids::SubjectId;
/// use std::str::FromStr;
///
/// let id = SubjectId::from_str("3f1c2a9e-5d7b-4c1a-9e2f-0a1b2c3d4e5f").unwrap();
/// assert_eq!(id.as_str(), "3f1c2a9e-5d7b-4c1a-9e2f-0a1b2c3d4e5f");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubjectId(String);

impl SubjectId {
    /// Creates a new SubjectId from a string
    ///
    /// Returns `Err` if the identifier is blank.
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Subject ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the subject ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SubjectId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for SubjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Generator of collision-free subject identifiers
///
/// Identifiers are random UUIDs built from bytes drawn from the caller's RNG, so a
/// seeded RNG yields a reproducible id sequence. Issued ids are remembered and a
/// colliding draw is discarded.
#[derive(Debug, Default)]
pub struct SubjectIdGenerator {
    issued: HashSet<Uuid>,
}

impl SubjectIdGenerator {
    /// Create a generator with no issued ids
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw the next unused identifier
    pub fn next_id<R: Rng + ?Sized>(&mut self, rng: &mut R) -> SubjectId {
        loop {
            let bytes: [u8; 16] = rng.gen();
            let uuid = uuid::Builder::from_random_bytes(bytes).into_uuid();
            if self.issued.insert(uuid) {
                return SubjectId(uuid.to_string());
            }
        }
    }

    /// Number of identifiers issued so far
    pub fn issued(&self) -> usize {
        self.issued.len()
    }
}
