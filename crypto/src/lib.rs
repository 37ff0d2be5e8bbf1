//! Hashing primitives for the quorum pipeline.
//!
//! - **Blake2b-256** for proposal ids, timelock operation ids and description hashes
//! - Length-prefixed, domain-separated encoding so that distinct batches never
//!   share a preimage

pub mod hash;

pub use hash::{blake2b_256, hash_description, hash_operation, hash_proposal};
