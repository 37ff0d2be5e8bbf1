//! Account identifiers.

use blake2::digest::consts::U20;
use blake2::{Blake2b, Digest};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

type Blake2b160 = Blake2b<U20>;

/// A 20-byte account identifier.
///
/// Accounts hold token balances, cast votes, submit proposals and hold
/// timelock roles. Contracts in the pipeline (token, timelock, governor,
/// targets) are addressed by an `Account` as well.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Account([u8; 20]);

impl Account {
    /// The all-zero account. Granting a role to it opens that role to anyone.
    pub const ZERO: Self = Self([0u8; 20]);

    pub fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Derive a deterministic account from a human-readable label.
    ///
    /// Used for deployment fixtures ("deployer", "timelock", ...) and tests.
    pub fn from_label(label: &str) -> Self {
        let mut hasher = Blake2b160::new();
        hasher.update(b"quorum-account:");
        hasher.update(label.as_bytes());
        let mut out = [0u8; 20];
        out.copy_from_slice(&hasher.finalize());
        Self(out)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Account(0x{})", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(&self.0))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseAccountError {
    #[error("account must start with 0x")]
    MissingPrefix,

    #[error("account must be 40 hex characters, got {0}")]
    BadLength(usize),

    #[error("invalid hex digit in account")]
    BadDigit,
}

impl FromStr for Account {
    type Err = ParseAccountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").ok_or(ParseAccountError::MissingPrefix)?;
        if digits.len() != 40 {
            return Err(ParseAccountError::BadLength(digits.len()));
        }
        let mut out = [0u8; 20];
        hex::decode_to_slice(digits, &mut out).map_err(|_| ParseAccountError::BadDigit)?;
        Ok(Self(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_deterministic_and_distinct() {
        assert_eq!(Account::from_label("alice"), Account::from_label("alice"));
        assert_ne!(Account::from_label("alice"), Account::from_label("bob"));
        assert!(!Account::from_label("alice").is_zero());
    }

    #[test]
    fn display_parses_back() {
        let a = Account::from_label("timelock");
        let parsed: Account = a.to_string().parse().unwrap();
        assert_eq!(parsed, a);
    }

    #[test]
    fn parse_rejects_malformed() {
        assert_eq!(
            "1234".parse::<Account>(),
            Err(ParseAccountError::MissingPrefix)
        );
        assert_eq!(
            "0x1234".parse::<Account>(),
            Err(ParseAccountError::BadLength(4))
        );
        let bad = format!("0x{}", "zz".repeat(20));
        assert_eq!(bad.parse::<Account>(), Err(ParseAccountError::BadDigit));
    }
}
