use crate::proposal::ProposalState;
use quorum_timelock::{NotReadyReason, TimelockError};
use quorum_token::TokenError;
use quorum_types::{Account, ErrorKind, ProposalId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GovernorError {
    #[error("proposal has no calls")]
    EmptyBatch,

    #[error("proposal {0} already exists")]
    DuplicateProposal(ProposalId),

    #[error("unknown proposal {0}")]
    UnknownProposal(ProposalId),

    #[error("proposal {id} is {state}, voting is closed")]
    ProposalNotActive { id: ProposalId, state: ProposalState },

    #[error("{voter} already voted on proposal {id}")]
    AlreadyVoted { id: ProposalId, voter: Account },

    #[error("proposal {id} is {state}, expected {expected}")]
    UnexpectedState {
        id: ProposalId,
        state: ProposalState,
        expected: &'static str,
    },

    #[error("{0} is neither the proposer nor the guardian")]
    NotProposer(Account),

    #[error("proposer votes {votes} below threshold {threshold}")]
    BelowProposalThreshold { votes: u128, threshold: u128 },

    #[error("timelock {actual} is not this governor's timelock {expected}")]
    ForeignTimelock { expected: Account, actual: Account },

    #[error("proposal {id} is not ready in the timelock: {reason}")]
    TimelockNotReady { id: ProposalId, reason: NotReadyReason },

    #[error("call {index} in proposal batch failed: {reason}")]
    BatchExecution { index: usize, reason: String },

    #[error("vote tally overflow")]
    TallyOverflow,

    #[error("invalid governor settings: {0}")]
    InvalidSettings(String),

    #[error("timelock error: {0}")]
    Timelock(#[from] TimelockError),

    #[error("token error: {0}")]
    Token(#[from] TokenError),

    #[error("snapshot error: {0}")]
    Snapshot(String),
}

impl GovernorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyBatch
            | Self::TallyOverflow
            | Self::InvalidSettings(_)
            | Self::ForeignTimelock { .. }
            | Self::Snapshot(_) => ErrorKind::Validation,
            Self::DuplicateProposal(_)
            | Self::UnknownProposal(_)
            | Self::ProposalNotActive { .. }
            | Self::AlreadyVoted { .. }
            | Self::UnexpectedState { .. }
            | Self::TimelockNotReady { .. } => ErrorKind::StateConflict,
            Self::NotProposer(_) | Self::BelowProposalThreshold { .. } => {
                ErrorKind::Authorization
            }
            Self::BatchExecution { .. } => ErrorKind::ExecutionFailure,
            Self::Timelock(e) => e.kind(),
            Self::Token(e) => e.kind(),
        }
    }
}
