//! Target systems governed by the quorum pipeline.
//!
//! A target exposes owner-gated entry points. Ownership is handed to the
//! timelock, so the only way to mutate a target is a batch that passed a
//! vote and waited out the delay. [`TargetRegistry`] routes encoded calls to
//! the deployed targets and is the [`quorum_types::Dispatcher`] the timelock
//! executes batches against.

pub mod error;
pub mod ownable;
pub mod registry;
pub mod value_store;

pub use error::TargetError;
pub use ownable::Ownable;
pub use registry::{Target, TargetRegistry};
pub use value_store::{ValueStore, ValueStoreCall, ValueStoreEvent};
