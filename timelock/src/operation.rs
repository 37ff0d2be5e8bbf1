//! Timelock operations and their lifecycle records.

use quorum_types::{Call, OperationId, Salt, Timestamp};
use serde::{Deserialize, Serialize};

/// A batch of calls scheduled as one unit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    /// Executed in order; all succeed or none are applied.
    pub calls: Vec<Call>,
    /// Operation that must be `Done` before this one may execute.
    pub predecessor: Option<OperationId>,
    pub salt: Salt,
}

impl Operation {
    pub fn new(calls: Vec<Call>, predecessor: Option<OperationId>, salt: Salt) -> Self {
        Self {
            calls,
            predecessor,
            salt,
        }
    }

    pub fn id(&self) -> OperationId {
        quorum_crypto::hash_operation(&self.calls, self.predecessor.as_ref(), &self.salt)
    }
}

/// Unset → Pending (schedule), Pending → Done (execute), Pending → Unset (cancel).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationState {
    Unset,
    Pending,
    Done,
}

impl OperationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unset => "unset",
            Self::Pending => "pending",
            Self::Done => "done",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationRecord {
    pub state: OperationState,
    pub scheduled_at: Timestamp,
    pub ready_at: Timestamp,
}
