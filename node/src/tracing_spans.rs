//! Pre-built [`tracing::Span`] constructors for pipeline operations.
//!
//! Consistent span names and fields make a single proposal easy to follow
//! through propose, vote, queue and execute in the logs.

use tracing::{info_span, Span};

/// Span covering the whole deployment bootstrap.
pub fn bootstrap_span(network: &str) -> Span {
    info_span!("bootstrap", network = %network)
}

pub fn propose_span(proposer: &str, calls: usize) -> Span {
    info_span!("propose", proposer = %proposer, calls = %calls)
}

pub fn vote_span(proposal: &str, voter: &str) -> Span {
    info_span!("vote", proposal = %proposal, voter = %voter)
}

pub fn queue_span(proposal: &str) -> Span {
    info_span!("queue", proposal = %proposal)
}

/// Span covering execution of a queued batch through the timelock.
pub fn execute_span(proposal: &str, executor: &str) -> Span {
    info_span!("execute", proposal = %proposal, executor = %executor)
}

pub fn cancel_span(proposal: &str, caller: &str) -> Span {
    info_span!("cancel", proposal = %proposal, caller = %caller)
}
