//! Calls a batch can make against the timelock itself.
//!
//! After the deployer renounces `Admin`, the only way to change roles or the
//! minimum delay is a governed batch targeting the timelock's own account.

use crate::roles::Role;
use quorum_types::{Account, Call, CallError};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimelockCall {
    UpdateDelay(u64),
    GrantRole(Role, Account),
    RevokeRole(Role, Account),
}

impl TimelockCall {
    pub fn encode(&self) -> Vec<u8> {
        bincode::serialize(self).unwrap_or_default()
    }

    pub fn decode(data: &[u8]) -> Result<Self, CallError> {
        bincode::deserialize(data)
            .map_err(|e| CallError::Reverted(format!("malformed timelock call: {e}")))
    }

    /// A zero-value call addressed to the timelock at `timelock`.
    pub fn to_call(&self, timelock: Account) -> Call {
        Call::new(timelock, 0, self.encode())
    }
}
