//! Network identifier.

use serde::{Deserialize, Serialize};

/// Identifies which network a deployment targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkId {
    /// The production network.
    Live,
    /// The public test network.
    Test,
    /// Local development network.
    Dev,
}

impl NetworkId {
    /// Human-readable name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Test => "test",
            Self::Dev => "dev",
        }
    }

    /// Parse a network name; anything unrecognised is the dev network.
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "live" => Self::Live,
            "test" => Self::Test,
            _ => Self::Dev,
        }
    }

    /// Whether a zero timelock delay is acceptable on this network.
    pub fn allows_zero_delay(&self) -> bool {
        !matches!(self, Self::Live)
    }
}
