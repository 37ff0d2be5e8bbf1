//! Single-owner access control.

use crate::error::TargetError;
use quorum_types::Account;
use serde::{Deserialize, Serialize};

/// Records one owner. A renounced owner leaves the target with no owner,
/// after which every gated entry point is unreachable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ownable {
    owner: Option<Account>,
}

impl Ownable {
    pub fn new(owner: Account) -> Self {
        Self { owner: Some(owner) }
    }

    pub fn owner(&self) -> Option<Account> {
        self.owner
    }

    pub fn only_owner(&self, caller: &Account) -> Result<(), TargetError> {
        if self.owner == Some(*caller) {
            Ok(())
        } else {
            Err(TargetError::Unauthorized { caller: *caller })
        }
    }

    pub fn transfer_ownership(
        &mut self,
        caller: &Account,
        new_owner: Account,
    ) -> Result<(), TargetError> {
        self.only_owner(caller)?;
        if new_owner.is_zero() {
            return Err(TargetError::InvalidOwner);
        }
        tracing::info!(from = %caller, to = %new_owner, "ownership transferred");
        self.owner = Some(new_owner);
        Ok(())
    }

    pub fn renounce_ownership(&mut self, caller: &Account) -> Result<(), TargetError> {
        self.only_owner(caller)?;
        tracing::info!(owner = %caller, "ownership renounced");
        self.owner = None;
        Ok(())
    }
}
