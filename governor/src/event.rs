use crate::counting::VoteChoice;
use quorum_types::{Account, BlockHeight, ProposalId, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GovernorEvent {
    ProposalCreated {
        id: ProposalId,
        proposer: Account,
        calls: usize,
        snapshot: BlockHeight,
        deadline: BlockHeight,
        description: String,
    },
    VoteCast {
        id: ProposalId,
        voter: Account,
        choice: VoteChoice,
        weight: u128,
        reason: Option<String>,
    },
    ProposalQueued {
        id: ProposalId,
        eta: Timestamp,
    },
    ProposalExecuted {
        id: ProposalId,
    },
    ProposalCanceled {
        id: ProposalId,
    },
}
