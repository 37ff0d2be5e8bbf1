use crate::roles::Role;
use quorum_types::{Account, ErrorKind, OperationId, Timestamp};
use std::fmt;
use thiserror::Error;

/// Why an operation cannot be executed yet (or any more).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotReadyReason {
    /// Never scheduled, or cancelled.
    Unscheduled,
    /// Pending, but the delay has not elapsed.
    Waiting { ready_at: Timestamp },
    /// Already executed.
    AlreadyDone,
    /// Still pending, but the grace period after `ready_at` has run out.
    Expired { expired_at: Timestamp },
    /// The declared predecessor has not been executed.
    PredecessorPending(OperationId),
}

impl fmt::Display for NotReadyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unscheduled => write!(f, "operation is not scheduled"),
            Self::Waiting { ready_at } => write!(f, "operation is ready at {ready_at}"),
            Self::AlreadyDone => write!(f, "operation was already executed"),
            Self::Expired { expired_at } => write!(f, "operation expired at {expired_at}"),
            Self::PredecessorPending(id) => write!(f, "predecessor {id} is not done"),
        }
    }
}

#[derive(Debug, Error)]
pub enum TimelockError {
    #[error("account {account} is missing role {role}")]
    MissingRole { account: Account, role: Role },

    #[error("only the timelock itself may call this, not {0}")]
    OnlySelf(Account),

    #[error("insufficient delay: {delay}s < minimum {min_delay}s")]
    InsufficientDelay { delay: u64, min_delay: u64 },

    #[error("operation has no calls")]
    EmptyBatch,

    #[error("operation {0} is already scheduled")]
    AlreadyScheduled(OperationId),

    #[error("operation {id} is not ready: {reason}")]
    NotReady { id: OperationId, reason: NotReadyReason },

    #[error("operation {0} is done and cannot be cancelled")]
    CannotCancelDone(OperationId),

    #[error("operation {0} is not pending")]
    NotPending(OperationId),

    #[error("call {index} in batch failed: {reason}")]
    BatchExecution { index: usize, reason: String },
}

impl TimelockError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingRole { .. } | Self::OnlySelf(_) => ErrorKind::Authorization,
            Self::InsufficientDelay { .. } | Self::EmptyBatch => ErrorKind::Validation,
            Self::AlreadyScheduled(_)
            | Self::NotReady { .. }
            | Self::CannotCancelDone(_)
            | Self::NotPending(_) => ErrorKind::StateConflict,
            Self::BatchExecution { .. } => ErrorKind::ExecutionFailure,
        }
    }
}
