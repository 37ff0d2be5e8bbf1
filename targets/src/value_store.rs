//! A single stored value, changeable only by its owner.

use crate::error::TargetError;
use crate::ownable::Ownable;
use crate::registry::Target;
use quorum_types::{Account, BlockContext, Call};
use serde::{Deserialize, Serialize};

/// Entry points of [`ValueStore`], carried as bincode in [`Call::data`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueStoreCall {
    Store(u128),
    TransferOwnership(Account),
    RenounceOwnership,
}

impl ValueStoreCall {
    pub fn encode(&self) -> Vec<u8> {
        bincode::serialize(self).unwrap_or_default()
    }

    pub fn decode(data: &[u8]) -> Result<Self, TargetError> {
        bincode::deserialize(data).map_err(|e| TargetError::Decode(e.to_string()))
    }

    /// A zero-value call addressed to the store at `target`.
    pub fn to_call(&self, target: Account) -> Call {
        Call::new(target, 0, self.encode())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueStoreEvent {
    ValueChanged { old: u128, new: u128 },
}

#[derive(Clone, Debug)]
pub struct ValueStore {
    ownable: Ownable,
    value: u128,
    events: Vec<ValueStoreEvent>,
}

impl ValueStore {
    pub fn new(owner: Account) -> Self {
        Self {
            ownable: Ownable::new(owner),
            value: 0,
            events: Vec::new(),
        }
    }

    pub fn owner(&self) -> Option<Account> {
        self.ownable.owner()
    }

    pub fn retrieve(&self) -> u128 {
        self.value
    }

    pub fn events(&self) -> &[ValueStoreEvent] {
        &self.events
    }

    pub fn store(&mut self, caller: &Account, value: u128) -> Result<(), TargetError> {
        self.ownable.only_owner(caller)?;
        let old = std::mem::replace(&mut self.value, value);
        self.events.push(ValueStoreEvent::ValueChanged { old, new: value });
        tracing::info!(old, new = value, "value stored");
        Ok(())
    }

    pub fn transfer_ownership(
        &mut self,
        caller: &Account,
        new_owner: Account,
    ) -> Result<(), TargetError> {
        self.ownable.transfer_ownership(caller, new_owner)
    }

    pub fn renounce_ownership(&mut self, caller: &Account) -> Result<(), TargetError> {
        self.ownable.renounce_ownership(caller)
    }
}

impl Target for ValueStore {
    fn call(&mut self, caller: &Account, call: &Call, _ctx: &BlockContext) -> Result<(), TargetError> {
        if call.value != 0 {
            return Err(TargetError::NotPayable(call.value));
        }
        match ValueStoreCall::decode(&call.data)? {
            ValueStoreCall::Store(value) => self.store(caller, value),
            ValueStoreCall::TransferOwnership(next) => self.transfer_ownership(caller, next),
            ValueStoreCall::RenounceOwnership => self.renounce_ownership(caller),
        }
    }

    fn box_clone(&self) -> Box<dyn Target> {
        Box::new(self.clone())
    }

    fn as_value_store(&self) -> Option<&ValueStore> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> BlockContext {
        BlockContext::new(1, 12)
    }

    #[test]
    fn owner_stores_and_anyone_reads() {
        let owner = Account::from_label("owner");
        let mut store = ValueStore::new(owner);
        store.store(&owner, 5).unwrap();
        assert_eq!(store.retrieve(), 5);
        assert_eq!(store.events(), &[ValueStoreEvent::ValueChanged { old: 0, new: 5 }]);
    }

    #[test]
    fn stranger_cannot_store() {
        let mut store = ValueStore::new(Account::from_label("owner"));
        let err = store.store(&Account::from_label("stranger"), 5).unwrap_err();
        assert_eq!(err.kind(), quorum_types::ErrorKind::Authorization);
        assert_eq!(store.retrieve(), 0);
    }

    #[test]
    fn call_dispatch_decodes_entry_point() {
        let owner = Account::from_label("owner");
        let mut store = ValueStore::new(owner);
        let call = ValueStoreCall::Store(7).to_call(Account::from_label("box"));
        store.call(&owner, &call, &ctx()).unwrap();
        assert_eq!(store.retrieve(), 7);
    }

    #[test]
    fn call_with_value_rejected() {
        let owner = Account::from_label("owner");
        let mut store = ValueStore::new(owner);
        let mut call = ValueStoreCall::Store(7).to_call(Account::from_label("box"));
        call.value = 1;
        assert!(matches!(
            store.call(&owner, &call, &ctx()),
            Err(TargetError::NotPayable(1))
        ));
    }

    #[test]
    fn garbage_call_data_rejected() {
        let owner = Account::from_label("owner");
        let mut store = ValueStore::new(owner);
        let call = Call::new(Account::from_label("box"), 0, vec![0xff; 8]);
        assert!(matches!(
            store.call(&owner, &call, &ctx()),
            Err(TargetError::Decode(_))
        ));
    }
}
