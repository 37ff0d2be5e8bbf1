//! Deployed targets, addressed by account.

use crate::error::TargetError;
use crate::value_store::ValueStore;
use quorum_types::{Account, BlockContext, Call, CallError, Dispatcher};
use std::collections::BTreeMap;

/// A deployed system that accepts encoded calls.
pub trait Target: Send {
    fn call(&mut self, caller: &Account, call: &Call, ctx: &BlockContext) -> Result<(), TargetError>;

    fn box_clone(&self) -> Box<dyn Target>;

    fn as_value_store(&self) -> Option<&ValueStore> {
        None
    }
}

impl Clone for Box<dyn Target> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

/// Routes calls to targets. Cloning snapshots every target, which is how a
/// batch is staged before it is committed.
#[derive(Clone, Default)]
pub struct TargetRegistry {
    targets: BTreeMap<Account, Box<dyn Target>>,
}

impl TargetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deploy `target` at `address`, replacing anything already there.
    pub fn deploy(&mut self, address: Account, target: Box<dyn Target>) {
        tracing::debug!(address = %address, "target deployed");
        self.targets.insert(address, target);
    }

    pub fn contains(&self, address: &Account) -> bool {
        self.targets.contains_key(address)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn value_store(&self, address: &Account) -> Option<&ValueStore> {
        self.targets.get(address).and_then(|t| t.as_value_store())
    }
}

impl Dispatcher for TargetRegistry {
    fn dispatch(
        &mut self,
        caller: &Account,
        call: &Call,
        ctx: &BlockContext,
    ) -> Result<(), CallError> {
        let target = self
            .targets
            .get_mut(&call.target)
            .ok_or(CallError::NoTarget(call.target))?;
        target
            .call(caller, call, ctx)
            .map_err(|e| CallError::Reverted(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_store::ValueStoreCall;

    #[test]
    fn dispatch_routes_by_target() {
        let owner = Account::from_label("owner");
        let address = Account::from_label("box");
        let mut registry = TargetRegistry::new();
        registry.deploy(address, Box::new(ValueStore::new(owner)));

        let ctx = BlockContext::new(1, 12);
        registry
            .dispatch(&owner, &ValueStoreCall::Store(9).to_call(address), &ctx)
            .unwrap();
        assert_eq!(registry.value_store(&address).map(ValueStore::retrieve), Some(9));

        let missing = ValueStoreCall::Store(1).to_call(Account::from_label("nowhere"));
        assert!(matches!(
            registry.dispatch(&owner, &missing, &ctx),
            Err(CallError::NoTarget(_))
        ));
    }

    #[test]
    fn clone_is_independent() {
        let owner = Account::from_label("owner");
        let address = Account::from_label("box");
        let mut registry = TargetRegistry::new();
        registry.deploy(address, Box::new(ValueStore::new(owner)));

        let mut staged = registry.clone();
        staged
            .dispatch(&owner, &ValueStoreCall::Store(3).to_call(address), &BlockContext::new(1, 12))
            .unwrap();
        assert_eq!(registry.value_store(&address).map(ValueStore::retrieve), Some(0));
        assert_eq!(staged.value_store(&address).map(ValueStore::retrieve), Some(3));
    }

    #[test]
    fn unauthorized_call_reverts() {
        let address = Account::from_label("box");
        let mut registry = TargetRegistry::new();
        registry.deploy(address, Box::new(ValueStore::new(Account::from_label("owner"))));
        let err = registry
            .dispatch(
                &Account::from_label("stranger"),
                &ValueStoreCall::Store(3).to_call(address),
                &BlockContext::new(1, 12),
            )
            .unwrap_err();
        assert!(matches!(err, CallError::Reverted(_)));
    }
}
