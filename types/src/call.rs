//! Calls against target contracts and the dispatch seam.

use crate::{Account, BlockContext};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single state-changing call: `(target, value, data)`.
///
/// `data` is the target-specific encoded entry point and arguments.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Call {
    pub target: Account,
    pub value: u128,
    pub data: Vec<u8>,
}

impl Call {
    pub fn new(target: Account, value: u128, data: Vec<u8>) -> Self {
        Self {
            target,
            value,
            data,
        }
    }
}

/// Why a dispatched call failed.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CallError {
    #[error("no target deployed at {0}")]
    NoTarget(Account),

    #[error("call reverted: {0}")]
    Reverted(String),
}

/// Routes a call to the target system it addresses.
///
/// `caller` is the account the target observes as the sender; for calls
/// executed by the timelock that is the timelock's own account.
pub trait Dispatcher {
    fn dispatch(
        &mut self,
        caller: &Account,
        call: &Call,
        ctx: &BlockContext,
    ) -> Result<(), CallError>;
}
