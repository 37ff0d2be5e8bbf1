//! Simple for/against/abstain counting.

use crate::error::GovernorError;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoteChoice {
    Against,
    For,
    /// Counts towards quorum but not towards the outcome.
    Abstain,
}

impl VoteChoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Against => "against",
            Self::For => "for",
            Self::Abstain => "abstain",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "against" | "0" => Some(Self::Against),
            "for" | "1" => Some(Self::For),
            "abstain" | "2" => Some(Self::Abstain),
            _ => None,
        }
    }
}

impl fmt::Display for VoteChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recorded vote.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ballot {
    pub choice: VoteChoice,
    pub weight: u128,
    pub reason: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub against: u128,
    pub for_votes: u128,
    pub abstain: u128,
}

impl Tally {
    pub fn add(&mut self, choice: VoteChoice, weight: u128) -> Result<(), GovernorError> {
        let slot = match choice {
            VoteChoice::Against => &mut self.against,
            VoteChoice::For => &mut self.for_votes,
            VoteChoice::Abstain => &mut self.abstain,
        };
        *slot = slot.checked_add(weight).ok_or(GovernorError::TallyOverflow)?;
        Ok(())
    }

    /// All participating weight, abstentions included.
    pub fn turnout(&self) -> u128 {
        self.against
            .saturating_add(self.for_votes)
            .saturating_add(self.abstain)
    }

    pub fn quorum_reached(&self, quorum: u128) -> bool {
        self.turnout() >= quorum
    }

    /// Strict majority; a tie fails.
    pub fn vote_succeeded(&self) -> bool {
        self.for_votes > self.against
    }

    pub fn succeeded(&self, quorum: u128) -> bool {
        self.quorum_reached(quorum) && self.vote_succeeded()
    }
}

/// `percentage`% of `supply`, rounded down, without overflowing.
pub fn quorum_of(supply: u128, percentage: u8) -> u128 {
    let pct = u128::from(percentage);
    (supply / 100) * pct + (supply % 100) * pct / 100
}
