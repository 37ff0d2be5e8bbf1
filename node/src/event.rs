//! Events emitted by a deployment for subscribers.

use quorum_governor::GovernorEvent;
use quorum_timelock::TimelockEvent;
use quorum_types::{Account, BlockContext};

/// Pipeline events that observers can subscribe to via the [`EventBus`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GovernanceEvent {
    /// The local chain produced one or more blocks.
    BlockMined { context: BlockContext },
    /// Voting power moved to a new delegate.
    DelegateChanged {
        holder: Account,
        from: Account,
        to: Account,
    },
    Governor(GovernorEvent),
    Timelock(TimelockEvent),
    /// The governed value store changed.
    ValueStored { store: Account, value: u128 },
}

/// Synchronous fan-out event bus for pipeline events.
///
/// Listeners are invoked inline on the emitting thread; keep handlers fast.
pub struct EventBus {
    listeners: Vec<Box<dyn Fn(&GovernanceEvent) + Send + Sync>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&GovernanceEvent) + Send + Sync>) {
        self.listeners.push(listener);
    }

    pub fn emit(&self, event: &GovernanceEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
