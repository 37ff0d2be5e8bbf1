//! Governor for the quorum pipeline.
//!
//! Proposals are call batches with a description. A proposal opens for
//! voting `voting_delay` blocks after creation and stays open for
//! `voting_period` blocks. Votes are weighted by each voter's power at the
//! snapshot block. A proposal that met quorum with strictly more `for` than
//! `against` weight is queued in the timelock and, once the delay has
//! elapsed, executed through it.
//!
//! Only facts are stored (snapshot, deadline, tally, eta, flags); the
//! lifecycle state is derived from them and the current block on every
//! query.

pub mod counting;
pub mod error;
pub mod event;
pub mod governor;
pub mod proposal;
pub mod settings;
pub mod votes;

pub use counting::{Ballot, Tally, VoteChoice};
pub use error::GovernorError;
pub use event::GovernorEvent;
pub use governor::{Governor, GovernorSnapshot};
pub use proposal::{Proposal, ProposalState};
pub use settings::GovernorSettings;
pub use votes::VotingPower;
