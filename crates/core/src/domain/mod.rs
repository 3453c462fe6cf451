//! Typed rows for every table the studio reads or writes.

pub mod gallery;
pub mod lead;
pub mod portfolio;
pub mod social;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RowId(pub String);

impl RowId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A row schema bound to one gateway table.
///
/// `validate` runs before any insert or update leaves the process.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const TABLE: &'static str;

    fn id(&self) -> Option<&RowId>;

    fn validate(&self) -> Result<(), DomainError> {
        Ok(())
    }
}

pub(crate) fn require_non_empty(value: &str, message: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::InvariantViolation(message.to_owned()));
    }
    Ok(())
}
