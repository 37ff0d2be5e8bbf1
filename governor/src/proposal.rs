//! Proposal records and their lifecycle states.

use crate::counting::{Ballot, Tally};
use quorum_timelock::Operation;
use quorum_types::{Account, BlockHeight, Call, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Lifecycle of a proposal.
///
/// ```text
/// Pending → Active → Canceled | Defeated | Succeeded
/// Succeeded → Queued → Executed
/// Succeeded | Queued → Expired
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProposalState {
    /// Created, the snapshot block has not passed yet.
    Pending,
    /// Open for votes.
    Active,
    Canceled,
    /// Voting closed without quorum or without a strict majority.
    Defeated,
    /// Voting closed with quorum and a strict majority. Awaiting queue.
    Succeeded,
    /// Scheduled in the timelock.
    Queued,
    /// Not queued or not executed in time.
    Expired,
    Executed,
}

impl ProposalState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Canceled => "canceled",
            Self::Defeated => "defeated",
            Self::Succeeded => "succeeded",
            Self::Queued => "queued",
            Self::Expired => "expired",
            Self::Executed => "executed",
        }
    }

    /// No further transition is possible.
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            Self::Canceled | Self::Defeated | Self::Expired | Self::Executed
        )
    }

    /// Whether the same batch and description may be proposed again.
    pub fn allows_repropose(&self) -> bool {
        matches!(self, Self::Canceled | Self::Defeated)
    }
}

impl fmt::Display for ProposalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The stored facts of a proposal. State is derived from these.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Proposal {
    pub proposer: Account,
    pub calls: Vec<Call>,
    pub description: String,
    pub description_hash: [u8; 32],
    pub snapshot: BlockHeight,
    pub deadline: BlockHeight,
    pub tally: Tally,
    pub ballots: HashMap<Account, Ballot>,
    /// Timelock ready time, set when queued.
    pub eta: Option<Timestamp>,
    pub executed: bool,
    pub canceled: bool,
}

impl Proposal {
    /// The timelock operation this proposal queues as. The description hash
    /// is the salt, so identical batches with different descriptions do not
    /// collide in the timelock.
    pub fn operation(&self) -> Operation {
        Operation::new(self.calls.clone(), None, self.description_hash)
    }

    pub fn has_voted(&self, account: &Account) -> bool {
        self.ballots.contains_key(account)
    }
}
