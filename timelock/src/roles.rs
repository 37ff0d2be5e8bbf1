//! Explicit role registry: (role, account) → granted.

use crate::error::TimelockError;
use quorum_types::Account;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Capabilities on the timelock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    /// Grants and revokes roles.
    Admin,
    /// Schedules operations.
    Proposer,
    /// Executes ready operations.
    Executor,
    /// Cancels pending operations.
    Canceller,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Proposer => "proposer",
            Self::Executor => "executor",
            Self::Canceller => "canceller",
        }
    }

    /// Whether granting this role to [`Account::ZERO`] opens it to every account.
    pub fn allows_open_grant(&self) -> bool {
        matches!(self, Self::Executor)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RoleRegistry {
    grants: HashSet<(Role, Account)>,
}

impl RoleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the grant is new.
    pub fn grant(&mut self, role: Role, account: Account) -> bool {
        self.grants.insert((role, account))
    }

    /// Returns `true` if the grant existed.
    pub fn revoke(&mut self, role: Role, account: Account) -> bool {
        self.grants.remove(&(role, account))
    }

    /// Exact grant lookup, ignoring open grants.
    pub fn has_role(&self, role: Role, account: &Account) -> bool {
        self.grants.contains(&(role, *account))
    }

    /// Whether `role` is open to everyone.
    pub fn is_open(&self, role: Role) -> bool {
        role.allows_open_grant() && self.has_role(role, &Account::ZERO)
    }

    /// The single authorization check used by every gated entry point.
    pub fn check(&self, role: Role, account: &Account) -> Result<(), TimelockError> {
        if self.is_open(role) || self.has_role(role, account) {
            Ok(())
        } else {
            Err(TimelockError::MissingRole {
                account: *account,
                role,
            })
        }
    }

    /// Holders of `role`, sorted.
    pub fn members(&self, role: Role) -> Vec<Account> {
        let mut members: Vec<Account> = self
            .grants
            .iter()
            .filter(|(r, _)| *r == role)
            .map(|(_, a)| *a)
            .collect();
        members.sort();
        members
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grant_and_revoke() {
        let mut roles = RoleRegistry::new();
        let a = Account::from_label("a");
        assert!(roles.grant(Role::Proposer, a));
        assert!(!roles.grant(Role::Proposer, a));
        assert!(roles.check(Role::Proposer, &a).is_ok());
        assert!(roles.check(Role::Executor, &a).is_err());

        assert!(roles.revoke(Role::Proposer, a));
        assert!(!roles.revoke(Role::Proposer, a));
        assert!(matches!(
            roles.check(Role::Proposer, &a),
            Err(TimelockError::MissingRole { role: Role::Proposer, .. })
        ));
    }

    #[test]
    fn open_grant_only_applies_to_executor() {
        let mut roles = RoleRegistry::new();
        roles.grant(Role::Executor, Account::ZERO);
        roles.grant(Role::Proposer, Account::ZERO);

        let anyone = Account::from_label("anyone");
        assert!(roles.is_open(Role::Executor));
        assert!(roles.check(Role::Executor, &anyone).is_ok());
        assert!(!roles.is_open(Role::Proposer));
        assert!(roles.check(Role::Proposer, &anyone).is_err());
    }

    #[test]
    fn members_lists_holders_of_one_role() {
        let mut roles = RoleRegistry::new();
        let (a, b) = (Account::from_label("a"), Account::from_label("b"));
        roles.grant(Role::Canceller, a);
        roles.grant(Role::Canceller, b);
        roles.grant(Role::Admin, a);

        let mut expected = vec![a, b];
        expected.sort();
        assert_eq!(roles.members(Role::Canceller), expected);
        assert_eq!(roles.members(Role::Admin), vec![a]);
    }
}
