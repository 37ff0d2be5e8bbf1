//! Fundamental types for the quorum governance pipeline.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! accounts, proposal and operation identifiers, block heights and timestamps,
//! call batches, and the error taxonomy.

pub mod account;
pub mod call;
pub mod error;
pub mod hash;
pub mod network;
pub mod time;

pub use account::{Account, ParseAccountError};
pub use call::{Call, CallError, Dispatcher};
pub use error::ErrorKind;
pub use hash::{OperationId, ProposalId, Salt};
pub use network::NetworkId;
pub use time::{BlockContext, BlockHeight, Timestamp};
