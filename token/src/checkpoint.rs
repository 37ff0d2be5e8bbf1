//! Append-only history of a value keyed by block height.

use crate::error::TokenError;
use quorum_types::BlockHeight;
use serde::{Deserialize, Serialize};

/// The value recorded for a stream as of `height`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub height: BlockHeight,
    pub value: u128,
}

/// Checkpoints in strictly increasing height order.
///
/// Only the entry for the block currently being built may be updated (several
/// balance changes inside one block coalesce into it); entries for earlier
/// blocks are never modified. Point-in-time reads are a binary search.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CheckpointHistory {
    entries: Vec<Checkpoint>,
}

impl CheckpointHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `value` at `height`. Returns `(previous latest, new latest)`.
    pub fn push(&mut self, height: BlockHeight, value: u128) -> Result<(u128, u128), TokenError> {
        let previous = self.latest();
        match self.entries.last_mut() {
            Some(last) if height < last.height => {
                return Err(TokenError::StaleContext {
                    incoming: height,
                    last: last.height,
                });
            }
            Some(last) if height == last.height => last.value = value,
            _ => self.entries.push(Checkpoint { height, value }),
        }
        Ok((previous, value))
    }

    /// The most recent value, or zero for an empty history.
    pub fn latest(&self) -> u128 {
        self.entries.last().map(|c| c.value).unwrap_or(0)
    }

    /// Value of the checkpoint with the greatest height `<= height`, or zero.
    pub fn upper_lookup(&self, height: BlockHeight) -> u128 {
        let idx = self.entries.partition_point(|c| c.height <= height);
        if idx == 0 {
            0
        } else {
            self.entries[idx - 1].value
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Checkpoint> {
        self.entries.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Checkpoint> {
        self.entries.iter()
    }
}
