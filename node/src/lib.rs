//! Deployment and orchestration of the quorum governance pipeline.
//!
//! [`Deployment::bootstrap`] wires a vote token, a timelock, a governor and
//! an ownable value store together on a [`LocalChain`], then hands the
//! value store to the timelock so that only governed batches can change
//! it. The deployment exposes one method per pipeline step (propose, vote,
//! queue, execute, cancel) plus chain control (mine, warp).

pub mod chain;
pub mod config;
pub mod deployment;
pub mod error;
pub mod event;
pub mod tracing_spans;

pub use chain::LocalChain;
pub use config::DeployConfig;
pub use deployment::Deployment;
pub use error::NodeError;
pub use event::{EventBus, GovernanceEvent};
