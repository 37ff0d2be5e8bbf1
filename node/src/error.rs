use quorum_types::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("token error: {0}")]
    Token(#[from] quorum_token::TokenError),

    #[error("timelock error: {0}")]
    Timelock(#[from] quorum_timelock::TimelockError),

    #[error("governor error: {0}")]
    Governor(#[from] quorum_governor::GovernorError),

    #[error("target error: {0}")]
    Target(#[from] quorum_targets::TargetError),

    #[error("call error: {0}")]
    Call(#[from] quorum_types::CallError),

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl NodeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Token(e) => e.kind(),
            Self::Timelock(e) => e.kind(),
            Self::Governor(e) => e.kind(),
            Self::Target(e) => e.kind(),
            Self::Call(_) => ErrorKind::ExecutionFailure,
            Self::Config(_) | Self::Io(_) => ErrorKind::Validation,
        }
    }
}
