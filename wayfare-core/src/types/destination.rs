use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};

/// Destination key used to scope catalog records ("bali", "dubai", ...).
///
/// Route parameters are normalized to trimmed lowercase so `/Bali/` and
/// `/bali/` address the same records. The set of destinations is open; no
/// enum is enforced.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Destination(String);

impl Destination {
    pub fn parse(raw: &str) -> Result<Self> {
        let normalized = raw.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(CatalogError::invalid("destination must not be empty"));
        }
        if normalized.chars().any(|c| c.is_control() || c == '/') {
            return Err(CatalogError::invalid(format!(
                "destination '{}' contains unsupported characters",
                raw.trim()
            )));
        }
        Ok(Self(normalized))
    }

    /// Wrap a value that was normalized before it was persisted.
    #[cfg_attr(not(feature = "database"), allow(dead_code))]
    pub(crate) fn from_trusted(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Destination {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
