use quorum_types::{BlockHeight, ErrorKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: u128, available: u128 },

    #[error("cannot mint or transfer to the zero account")]
    InvalidReceiver,

    #[error("arithmetic overflow in voting power")]
    Overflow,

    #[error("lookup at block {requested} is not in the past (current block {current})")]
    FutureQuery {
        requested: BlockHeight,
        current: BlockHeight,
    },

    #[error("block {incoming} precedes last recorded block {last}")]
    StaleContext {
        incoming: BlockHeight,
        last: BlockHeight,
    },

    #[error("snapshot error: {0}")]
    Snapshot(String),
}

impl TokenError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InsufficientBalance { .. }
            | Self::InvalidReceiver
            | Self::Overflow
            | Self::Snapshot(_) => ErrorKind::Validation,
            Self::FutureQuery { .. } | Self::StaleContext { .. } => ErrorKind::StateConflict,
        }
    }
}
