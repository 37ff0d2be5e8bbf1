//! Governor parameters.

use crate::error::GovernorError;
use quorum_types::Account;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernorSettings {
    /// Blocks between proposal creation and the snapshot.
    pub voting_delay: u64,
    /// Blocks voting stays open after the snapshot. Must be non-zero.
    pub voting_period: u64,
    /// Share of total supply at the snapshot that must turn out (0-100).
    pub quorum_percentage: u8,
    /// Votes a proposer needs at the previous block to propose.
    pub proposal_threshold: u128,
    /// Blocks after the deadline a succeeded proposal may still be queued. 0 = no limit.
    pub queue_window: u64,
    /// Account allowed to cancel any proposal that is not final.
    pub guardian: Option<Account>,
}

impl Default for GovernorSettings {
    fn default() -> Self {
        Self {
            voting_delay: 1,
            voting_period: 5,
            quorum_percentage: 4,
            proposal_threshold: 0,
            queue_window: 50_400,
            guardian: None,
        }
    }
}

impl GovernorSettings {
    pub fn validate(&self) -> Result<(), GovernorError> {
        if self.quorum_percentage > 100 {
            return Err(GovernorError::InvalidSettings(format!(
                "quorum percentage {} exceeds 100",
                self.quorum_percentage
            )));
        }
        if self.voting_period == 0 {
            return Err(GovernorError::InvalidSettings(
                "voting period must be at least one block".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(GovernorSettings::default().validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range() {
        let s = GovernorSettings {
            quorum_percentage: 101,
            ..Default::default()
        };
        assert!(s.validate().is_err());
        let s = GovernorSettings {
            voting_period: 0,
            ..Default::default()
        };
        assert_eq!(
            s.validate().unwrap_err().kind(),
            quorum_types::ErrorKind::Validation
        );
    }
}
