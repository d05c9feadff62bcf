//! Shared identity and amount types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Amounts are denominated in gwei so that every configured constant fits a
/// TOML integer.
pub type Gwei = u64;

pub const GWEI_PER_ETHER: Gwei = 1_000_000_000;

/// Convert whole ether to gwei.
pub const fn ether(amount: u64) -> Gwei {
    amount * GWEI_PER_ETHER
}

/// Opaque identity of a protocol participant (airline, oracle node, authority).
///
/// Sender authentication happens before a call reaches the core, so a
/// principal is just a stable identifier here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Principal {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for Principal {
    fn from(id: String) -> Self {
        Self(id)
    }
}
