//! Error taxonomy shared across crates.
//!
//! Each crate keeps its own error enum; `kind()` on every one of them maps a
//! failure onto one of these classes. None of them is retried by the system.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Bad input (empty batch, parameter out of range). Caller must correct it.
    Validation,
    /// Wrong lifecycle state, duplicate, already voted, not ready. Caller must wait or choose another action.
    StateConflict,
    /// Missing role or not the owner.
    Authorization,
    /// A call inside a batch reverted; nothing was committed.
    ExecutionFailure,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::StateConflict => "state_conflict",
            Self::Authorization => "authorization",
            Self::ExecutionFailure => "execution_failure",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
