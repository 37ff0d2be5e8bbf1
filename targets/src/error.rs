use quorum_types::{Account, ErrorKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TargetError {
    #[error("caller {caller} is not the owner")]
    Unauthorized { caller: Account },

    #[error("cannot transfer ownership to the zero account")]
    InvalidOwner,

    #[error("entry point is not payable (value {0})")]
    NotPayable(u128),

    #[error("malformed call data: {0}")]
    Decode(String),
}

impl TargetError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized { .. } => ErrorKind::Authorization,
            Self::InvalidOwner | Self::NotPayable(_) | Self::Decode(_) => ErrorKind::Validation,
        }
    }
}
