//! Vote-weight token for the quorum pipeline.
//!
//! Voting power equals token balance and follows delegation: every holder's
//! balance counts towards exactly one delegate (the holder itself unless it
//! delegated elsewhere). Each change to a delegate's power, and to total
//! supply, is appended to a per-block checkpoint history so that governance
//! can read the power held at any past block.

pub mod checkpoint;
pub mod error;
pub mod token;

pub use checkpoint::{Checkpoint, CheckpointHistory};
pub use error::TokenError;
pub use token::{TokenSnapshot, VoteToken};
