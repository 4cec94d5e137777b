//! Domain identifier types with validation

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Patient record identifier newtype wrapper
///
/// Wraps the row id assigned by the record store. Ids are always positive.
///
/// # Examples
///
/// ```
/// use medmask::domain::ids::PatientId;
/// use std::str::FromStr;
///
/// let id = PatientId::from_str("42").unwrap();
/// assert_eq!(id.get(), 42);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatientId(i64);

impl PatientId {
    /// Creates a new PatientId, rejecting zero and negative values
    pub fn new(id: i64) -> Result<Self, String> {
        if id <= 0 {
            return Err(format!("Patient ID must be positive, got {id}"));
        }
        Ok(Self(id))
    }

    /// Returns the raw row id
    pub fn get(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PatientId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw: i64 = s
            .trim()
            .parse()
            .map_err(|_| format!("Invalid patient ID: '{s}'"))?;
        Self::new(raw)
    }
}
