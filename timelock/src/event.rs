//! Events recorded by the timelock.

use crate::roles::Role;
use quorum_types::{Account, OperationId, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimelockEvent {
    CallScheduled {
        id: OperationId,
        index: usize,
        target: Account,
        ready_at: Timestamp,
    },
    CallExecuted {
        id: OperationId,
        index: usize,
        target: Account,
    },
    Cancelled {
        id: OperationId,
    },
    RoleGranted {
        role: Role,
        account: Account,
        sender: Account,
    },
    RoleRevoked {
        role: Role,
        account: Account,
        sender: Account,
    },
    MinDelayChanged {
        old: u64,
        new: u64,
    },
}
