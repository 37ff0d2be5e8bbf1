//! Timelock gate for the quorum pipeline.
//!
//! A role-gated scheduler: holders of `Proposer` schedule a batch of calls,
//! which may only run once a minimum delay has elapsed, exactly once, and
//! only while still pending. `Canceller` holders can drop a pending batch.
//! `Admin` administers the roles; once the deployer renounces it, only the
//! timelock itself (via an executed batch) can change roles or the delay.

pub mod error;
pub mod event;
pub mod gate;
pub mod operation;
pub mod roles;
pub mod self_call;

pub use error::{NotReadyReason, TimelockError};
pub use event::TimelockEvent;
pub use gate::TimelockGate;
pub use operation::{Operation, OperationRecord, OperationState};
pub use roles::{Role, RoleRegistry};
pub use self_call::TimelockCall;
