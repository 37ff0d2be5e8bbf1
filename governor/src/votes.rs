//! Source of historical voting power.

use quorum_token::{TokenError, VoteToken};
use quorum_types::{Account, BlockContext, BlockHeight};

/// Read-only view of voting power at past blocks.
pub trait VotingPower {
    fn past_votes(
        &self,
        account: &Account,
        height: BlockHeight,
        ctx: &BlockContext,
    ) -> Result<u128, TokenError>;

    fn past_total_supply(&self, height: BlockHeight, ctx: &BlockContext)
        -> Result<u128, TokenError>;
}

impl VotingPower for VoteToken {
    fn past_votes(
        &self,
        account: &Account,
        height: BlockHeight,
        ctx: &BlockContext,
    ) -> Result<u128, TokenError> {
        self.get_past_votes(account, height, ctx)
    }

    fn past_total_supply(
        &self,
        height: BlockHeight,
        ctx: &BlockContext,
    ) -> Result<u128, TokenError> {
        self.get_past_total_supply(height, ctx)
    }
}
