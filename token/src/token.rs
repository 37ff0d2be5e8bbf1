//! The vote-weight token: balances, delegation and voting power history.

use crate::checkpoint::{Checkpoint, CheckpointHistory};
use crate::error::TokenError;
use quorum_types::{Account, BlockContext, BlockHeight};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Balances, delegations and voting power checkpoints for one token.
///
/// Voting power of an account is the sum of the balances of every holder
/// whose delegate it is. A holder that never delegated is its own delegate.
#[derive(Clone, Debug)]
pub struct VoteToken {
    address: Account,
    name: String,
    symbol: String,
    decimals: u8,
    balances: HashMap<Account, u128>,
    /// Explicit delegations only; absent means self-delegated.
    delegates: HashMap<Account, Account>,
    checkpoints: HashMap<Account, CheckpointHistory>,
    total_supply: CheckpointHistory,
    /// Highest block any mutation was applied at.
    last_height: BlockHeight,
}

/// Serializable snapshot of the token state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenSnapshot {
    pub address: Account,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub balances: HashMap<Account, u128>,
    pub delegates: HashMap<Account, Account>,
    pub checkpoints: HashMap<Account, CheckpointHistory>,
    pub total_supply: CheckpointHistory,
    pub last_height: BlockHeight,
}

impl VoteToken {
    pub fn new(address: Account, name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            address,
            name: name.into(),
            symbol: symbol.into(),
            decimals: 18,
            balances: HashMap::new(),
            delegates: HashMap::new(),
            checkpoints: HashMap::new(),
            total_supply: CheckpointHistory::new(),
            last_height: BlockHeight::GENESIS,
        }
    }

    pub fn address(&self) -> Account {
        self.address
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn balance_of(&self, account: &Account) -> u128 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    pub fn total_supply(&self) -> u128 {
        self.total_supply.latest()
    }

    /// The account `holder`'s voting power currently counts towards.
    pub fn delegates(&self, holder: &Account) -> Account {
        self.delegates.get(holder).copied().unwrap_or(*holder)
    }

    /// Current voting power of `account`.
    pub fn get_votes(&self, account: &Account) -> u128 {
        self.checkpoints
            .get(account)
            .map(CheckpointHistory::latest)
            .unwrap_or(0)
    }

    /// Voting power of `account` at the end of block `height`.
    ///
    /// Fails with [`TokenError::FutureQuery`] unless `height` is strictly
    /// before the current block: the current block's value can still change.
    pub fn get_past_votes(
        &self,
        account: &Account,
        height: BlockHeight,
        ctx: &BlockContext,
    ) -> Result<u128, TokenError> {
        ensure_past(height, ctx)?;
        Ok(self
            .checkpoints
            .get(account)
            .map(|h| h.upper_lookup(height))
            .unwrap_or(0))
    }

    /// Total supply at the end of block `height`. Same rules as [`Self::get_past_votes`].
    pub fn get_past_total_supply(
        &self,
        height: BlockHeight,
        ctx: &BlockContext,
    ) -> Result<u128, TokenError> {
        ensure_past(height, ctx)?;
        Ok(self.total_supply.upper_lookup(height))
    }

    pub fn num_checkpoints(&self, account: &Account) -> usize {
        self.checkpoints.get(account).map(CheckpointHistory::len).unwrap_or(0)
    }

    pub fn checkpoint_at(&self, account: &Account, index: usize) -> Option<Checkpoint> {
        self.checkpoints.get(account).and_then(|h| h.get(index))
    }

    /// Create `amount` new tokens owned by `to`.
    pub fn mint(&mut self, to: &Account, amount: u128, ctx: &BlockContext) -> Result<(), TokenError> {
        if to.is_zero() {
            return Err(TokenError::InvalidReceiver);
        }
        self.ensure_current(ctx)?;
        let supply = self
            .total_supply
            .latest()
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        let balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;

        self.total_supply.push(ctx.height, supply)?;
        self.balances.insert(*to, balance);
        let delegate = self.delegates(to);
        self.move_voting_power(None, Some(delegate), amount, ctx.height)?;
        self.last_height = ctx.height;

        tracing::info!(to = %to, amount, total_supply = supply, height = %ctx.height, "minted");
        Ok(())
    }

    /// Destroy `amount` tokens owned by `from`.
    pub fn burn(&mut self, from: &Account, amount: u128, ctx: &BlockContext) -> Result<(), TokenError> {
        self.ensure_current(ctx)?;
        let available = self.balance_of(from);
        let balance = available
            .checked_sub(amount)
            .ok_or(TokenError::InsufficientBalance {
                needed: amount,
                available,
            })?;
        let supply = self
            .total_supply
            .latest()
            .checked_sub(amount)
            .ok_or(TokenError::Overflow)?;

        self.total_supply.push(ctx.height, supply)?;
        self.balances.insert(*from, balance);
        let delegate = self.delegates(from);
        self.move_voting_power(Some(delegate), None, amount, ctx.height)?;
        self.last_height = ctx.height;

        tracing::info!(from = %from, amount, total_supply = supply, height = %ctx.height, "burned");
        Ok(())
    }

    /// Move `amount` from `from` to `to`, carrying the voting power between their delegates.
    pub fn transfer(
        &mut self,
        from: &Account,
        to: &Account,
        amount: u128,
        ctx: &BlockContext,
    ) -> Result<(), TokenError> {
        if to.is_zero() {
            return Err(TokenError::InvalidReceiver);
        }
        self.ensure_current(ctx)?;
        let available = self.balance_of(from);
        if available < amount {
            return Err(TokenError::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        if from != to {
            let to_balance = self
                .balance_of(to)
                .checked_add(amount)
                .ok_or(TokenError::Overflow)?;
            self.balances.insert(*from, available - amount);
            self.balances.insert(*to, to_balance);
        }
        let src = self.delegates(from);
        let dst = self.delegates(to);
        self.move_voting_power(Some(src), Some(dst), amount, ctx.height)?;
        self.last_height = ctx.height;

        tracing::debug!(from = %from, to = %to, amount, height = %ctx.height, "transferred");
        Ok(())
    }

    /// Point `holder`'s voting power at `delegatee`.
    ///
    /// The holder's whole current balance moves from the old delegate's
    /// history to the new one's within the same block.
    pub fn delegate(
        &mut self,
        holder: &Account,
        delegatee: &Account,
        ctx: &BlockContext,
    ) -> Result<(), TokenError> {
        self.ensure_current(ctx)?;
        let old = self.delegates(holder);
        let weight = self.balance_of(holder);
        self.move_voting_power(Some(old), Some(*delegatee), weight, ctx.height)?;
        if delegatee == holder {
            self.delegates.remove(holder);
        } else {
            self.delegates.insert(*holder, *delegatee);
        }
        self.last_height = ctx.height;

        tracing::info!(
            holder = %holder,
            from = %old,
            to = %delegatee,
            weight,
            height = %ctx.height,
            "delegate changed"
        );
        Ok(())
    }

    /// Return `holder`'s voting power to itself.
    pub fn undelegate(&mut self, holder: &Account, ctx: &BlockContext) -> Result<(), TokenError> {
        self.delegate(holder, holder, ctx)
    }

    fn ensure_current(&self, ctx: &BlockContext) -> Result<(), TokenError> {
        if ctx.height < self.last_height {
            return Err(TokenError::StaleContext {
                incoming: ctx.height,
                last: self.last_height,
            });
        }
        Ok(())
    }

    /// Both sides are computed before either history is written.
    fn move_voting_power(
        &mut self,
        src: Option<Account>,
        dst: Option<Account>,
        amount: u128,
        height: BlockHeight,
    ) -> Result<(), TokenError> {
        if src == dst || amount == 0 {
            return Ok(());
        }
        let src_value = match src {
            Some(ref a) => Some(
                self.get_votes(a)
                    .checked_sub(amount)
                    .ok_or(TokenError::Overflow)?,
            ),
            None => None,
        };
        let dst_value = match dst {
            Some(ref a) => Some(
                self.get_votes(a)
                    .checked_add(amount)
                    .ok_or(TokenError::Overflow)?,
            ),
            None => None,
        };

        if let (Some(account), Some(value)) = (src, src_value) {
            let (old, new) = self.checkpoints.entry(account).or_default().push(height, value)?;
            tracing::debug!(delegate = %account, old, new, "votes changed");
        }
        if let (Some(account), Some(value)) = (dst, dst_value) {
            let (old, new) = self.checkpoints.entry(account).or_default().push(height, value)?;
            tracing::debug!(delegate = %account, old, new, "votes changed");
        }
        Ok(())
    }

    /// Serialize the token state for persistence.
    pub fn save_state(&self) -> Result<Vec<u8>, TokenError> {
        let snapshot = TokenSnapshot {
            address: self.address,
            name: self.name.clone(),
            symbol: self.symbol.clone(),
            decimals: self.decimals,
            balances: self.balances.clone(),
            delegates: self.delegates.clone(),
            checkpoints: self.checkpoints.clone(),
            total_supply: self.total_supply.clone(),
            last_height: self.last_height,
        };
        bincode::serialize(&snapshot).map_err(|e| TokenError::Snapshot(e.to_string()))
    }

    /// Restore token state from [`Self::save_state`] output.
    pub fn load_state(data: &[u8]) -> Result<Self, TokenError> {
        let snapshot: TokenSnapshot =
            bincode::deserialize(data).map_err(|e| TokenError::Snapshot(e.to_string()))?;
        Ok(Self {
            address: snapshot.address,
            name: snapshot.name,
            symbol: snapshot.symbol,
            decimals: snapshot.decimals,
            balances: snapshot.balances,
            delegates: snapshot.delegates,
            checkpoints: snapshot.checkpoints,
            total_supply: snapshot.total_supply,
            last_height: snapshot.last_height,
        })
    }
}

fn ensure_past(height: BlockHeight, ctx: &BlockContext) -> Result<(), TokenError> {
    if height >= ctx.height {
        return Err(TokenError::FutureQuery {
            requested: height,
            current: ctx.height,
        });
    }
    Ok(())
}
