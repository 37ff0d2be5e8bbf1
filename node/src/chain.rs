//! Deterministic local chain position.

use quorum_types::{BlockContext, BlockHeight, Timestamp};
use std::cell::Cell;

/// A local chain whose blocks are only produced when told to.
///
/// Each mined block advances the height by one and the time by the
/// configured block time. Time can also be warped forward on its own.
pub struct LocalChain {
    height: Cell<u64>,
    timestamp: Cell<u64>,
    block_time_secs: u64,
}

impl LocalChain {
    pub fn new(genesis: Timestamp, block_time_secs: u64) -> Self {
        Self {
            height: Cell::new(0),
            timestamp: Cell::new(genesis.as_secs()),
            block_time_secs,
        }
    }

    /// The position the next operation is applied at.
    pub fn context(&self) -> BlockContext {
        BlockContext {
            height: self.height(),
            timestamp: self.now(),
        }
    }

    pub fn height(&self) -> BlockHeight {
        BlockHeight::new(self.height.get())
    }

    pub fn now(&self) -> Timestamp {
        Timestamp::new(self.timestamp.get())
    }

    pub fn block_time_secs(&self) -> u64 {
        self.block_time_secs
    }

    /// Produce `blocks` empty blocks.
    pub fn mine(&self, blocks: u64) -> BlockContext {
        self.height.set(self.height.get().saturating_add(blocks));
        let elapsed = blocks.saturating_mul(self.block_time_secs);
        self.timestamp.set(self.timestamp.get().saturating_add(elapsed));
        self.context()
    }

    /// Move time forward by `secs` and mine one block at the new time.
    pub fn warp(&self, secs: u64) -> BlockContext {
        self.timestamp.set(self.timestamp.get().saturating_add(secs));
        self.height.set(self.height.get().saturating_add(1));
        self.context()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_genesis() {
        let chain = LocalChain::new(Timestamp::new(1_000), 12);
        assert_eq!(chain.height(), BlockHeight::GENESIS);
        assert_eq!(chain.now(), Timestamp::new(1_000));
    }

    #[test]
    fn mine_advances_height_and_time() {
        let chain = LocalChain::new(Timestamp::EPOCH, 12);
        let ctx = chain.mine(5);
        assert_eq!(ctx.height, BlockHeight::new(5));
        assert_eq!(ctx.timestamp, Timestamp::new(60));
    }

    #[test]
    fn warp_moves_time_with_one_block() {
        let chain = LocalChain::new(Timestamp::EPOCH, 12);
        chain.mine(1);
        let ctx = chain.warp(3_600);
        assert_eq!(ctx.height, BlockHeight::new(2));
        assert_eq!(ctx.timestamp, Timestamp::new(3_612));
    }
}
