//! The timelock gate: schedule, execute and cancel call batches.

use crate::error::{NotReadyReason, TimelockError};
use crate::event::TimelockEvent;
use crate::operation::{Operation, OperationRecord, OperationState};
use crate::roles::{Role, RoleRegistry};
use crate::self_call::TimelockCall;
use quorum_types::{Account, BlockContext, Call, CallError, Dispatcher, OperationId, Salt, Timestamp};
use std::collections::HashMap;

/// Role-gated scheduler enforcing a minimum delay before execution.
pub struct TimelockGate {
    address: Account,
    min_delay: u64,
    /// Seconds past `ready_at` a pending operation stays executable. 0 = no limit.
    grace_period: u64,
    roles: RoleRegistry,
    operations: HashMap<OperationId, OperationRecord>,
    events: Vec<TimelockEvent>,
}

impl TimelockGate {
    /// Deploy a timelock at `address`.
    ///
    /// The timelock administers itself. `admin` is an optional bootstrap
    /// admin that must renounce the role once roles are set up, or the delay
    /// guarantee is void. Proposers are also made cancellers.
    pub fn new(
        address: Account,
        min_delay: u64,
        proposers: &[Account],
        executors: &[Account],
        admin: Option<Account>,
    ) -> Self {
        let mut gate = Self {
            address,
            min_delay,
            grace_period: 0,
            roles: RoleRegistry::new(),
            operations: HashMap::new(),
            events: Vec::new(),
        };
        gate.record_grant(Role::Admin, address, address);
        if let Some(admin) = admin {
            gate.record_grant(Role::Admin, admin, address);
        }
        for proposer in proposers {
            gate.record_grant(Role::Proposer, *proposer, address);
            gate.record_grant(Role::Canceller, *proposer, address);
        }
        for executor in executors {
            gate.record_grant(Role::Executor, *executor, address);
        }
        tracing::info!(address = %address, min_delay, "timelock deployed");
        gate
    }

    /// Let pending operations lapse `secs` after they become ready.
    pub fn with_grace_period(mut self, secs: u64) -> Self {
        self.grace_period = secs;
        self
    }

    pub fn address(&self) -> Account {
        self.address
    }

    pub fn grace_period(&self) -> u64 {
        self.grace_period
    }

    pub fn min_delay(&self) -> u64 {
        self.min_delay
    }

    pub fn roles(&self) -> &RoleRegistry {
        &self.roles
    }

    pub fn has_role(&self, role: Role, account: &Account) -> bool {
        self.roles.has_role(role, account)
    }

    pub fn operation_state(&self, id: &OperationId) -> OperationState {
        self.operations
            .get(id)
            .map(|r| r.state)
            .unwrap_or(OperationState::Unset)
    }

    /// When a scheduled operation becomes executable.
    pub fn ready_at(&self, id: &OperationId) -> Option<Timestamp> {
        self.operations.get(id).map(|r| r.ready_at)
    }

    pub fn is_operation_pending(&self, id: &OperationId) -> bool {
        self.operation_state(id) == OperationState::Pending
    }

    pub fn is_operation_ready(&self, id: &OperationId, ctx: &BlockContext) -> bool {
        self.operations
            .get(id)
            .map(|r| {
                r.state == OperationState::Pending
                    && ctx.timestamp >= r.ready_at
                    && !self.lapsed(r, ctx)
            })
            .unwrap_or(false)
    }

    /// Pending, but past the grace period and no longer executable.
    pub fn is_operation_expired(&self, id: &OperationId, ctx: &BlockContext) -> bool {
        self.operations
            .get(id)
            .map(|r| r.state == OperationState::Pending && self.lapsed(r, ctx))
            .unwrap_or(false)
    }

    pub fn is_operation_done(&self, id: &OperationId) -> bool {
        self.operation_state(id) == OperationState::Done
    }

    pub fn events(&self) -> &[TimelockEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<TimelockEvent> {
        std::mem::take(&mut self.events)
    }

    /// Schedule `op` to become executable `delay` seconds from now.
    pub fn schedule(
        &mut self,
        caller: &Account,
        op: &Operation,
        delay: u64,
        ctx: &BlockContext,
    ) -> Result<OperationId, TimelockError> {
        self.roles.check(Role::Proposer, caller)?;
        if op.calls.is_empty() {
            return Err(TimelockError::EmptyBatch);
        }
        if delay < self.min_delay {
            return Err(TimelockError::InsufficientDelay {
                delay,
                min_delay: self.min_delay,
            });
        }
        let id = op.id();
        if self.operation_state(&id) != OperationState::Unset {
            return Err(TimelockError::AlreadyScheduled(id));
        }

        let ready_at = ctx.timestamp.saturating_add(delay);
        self.operations.insert(
            id,
            OperationRecord {
                state: OperationState::Pending,
                scheduled_at: ctx.timestamp,
                ready_at,
            },
        );
        for (index, call) in op.calls.iter().enumerate() {
            self.events.push(TimelockEvent::CallScheduled {
                id,
                index,
                target: call.target,
                ready_at,
            });
        }
        tracing::info!(id = %id, calls = op.calls.len(), ready_at = %ready_at, "operation scheduled");
        Ok(id)
    }

    /// Convenience form of [`Self::schedule`] taking the operation's parts.
    pub fn schedule_batch(
        &mut self,
        caller: &Account,
        calls: Vec<Call>,
        predecessor: Option<OperationId>,
        salt: Salt,
        delay: u64,
        ctx: &BlockContext,
    ) -> Result<OperationId, TimelockError> {
        let op = Operation::new(calls, predecessor, salt);
        self.schedule(caller, &op, delay, ctx)
    }

    /// Run every call in `op`, in order, against `dispatcher`.
    ///
    /// The batch runs against a staged copy of the targets and of the
    /// timelock's own roles and delay; nothing is committed unless every
    /// call succeeds, and only then does the operation become `Done`.
    pub fn execute<D: Dispatcher + Clone>(
        &mut self,
        caller: &Account,
        op: &Operation,
        ctx: &BlockContext,
        dispatcher: &mut D,
    ) -> Result<OperationId, TimelockError> {
        self.roles.check(Role::Executor, caller)?;
        let id = op.id();
        self.ensure_ready(&id, ctx)?;
        if let Some(predecessor) = op.predecessor {
            if !self.is_operation_done(&predecessor) {
                return Err(TimelockError::NotReady {
                    id,
                    reason: NotReadyReason::PredecessorPending(predecessor),
                });
            }
        }

        let mut staged = dispatcher.clone();
        let saved_roles = self.roles.clone();
        let saved_delay = self.min_delay;
        let saved_events = self.events.len();

        for (index, call) in op.calls.iter().enumerate() {
            let result = if call.target == self.address {
                self.apply_self_call(call)
            } else {
                staged.dispatch(&self.address, call, ctx)
            };
            if let Err(e) = result {
                self.roles = saved_roles;
                self.min_delay = saved_delay;
                self.events.truncate(saved_events);
                tracing::warn!(id = %id, index, error = %e, "batch reverted");
                return Err(TimelockError::BatchExecution {
                    index,
                    reason: e.to_string(),
                });
            }
            self.events.push(TimelockEvent::CallExecuted {
                id,
                index,
                target: call.target,
            });
        }

        *dispatcher = staged;
        if let Some(record) = self.operations.get_mut(&id) {
            record.state = OperationState::Done;
        }
        tracing::info!(id = %id, executor = %caller, "operation executed");
        Ok(id)
    }

    /// Drop a pending operation back to `Unset`.
    pub fn cancel(&mut self, caller: &Account, id: &OperationId) -> Result<(), TimelockError> {
        self.roles.check(Role::Canceller, caller)?;
        match self.operation_state(id) {
            OperationState::Done => Err(TimelockError::CannotCancelDone(*id)),
            OperationState::Unset => Err(TimelockError::NotPending(*id)),
            OperationState::Pending => {
                self.operations.remove(id);
                self.events.push(TimelockEvent::Cancelled { id: *id });
                tracing::info!(id = %id, canceller = %caller, "operation cancelled");
                Ok(())
            }
        }
    }

    pub fn grant_role(
        &mut self,
        caller: &Account,
        role: Role,
        account: Account,
    ) -> Result<(), TimelockError> {
        self.roles.check(Role::Admin, caller)?;
        self.record_grant(role, account, *caller);
        Ok(())
    }

    pub fn revoke_role(
        &mut self,
        caller: &Account,
        role: Role,
        account: Account,
    ) -> Result<(), TimelockError> {
        self.roles.check(Role::Admin, caller)?;
        self.record_revoke(role, account, *caller);
        Ok(())
    }

    /// Drop one of the caller's own roles.
    pub fn renounce_role(&mut self, caller: &Account, role: Role) -> Result<(), TimelockError> {
        self.record_revoke(role, *caller, *caller);
        Ok(())
    }

    /// Change the minimum delay. Only reachable from a batch targeting the timelock.
    pub fn update_delay(&mut self, caller: &Account, new_delay: u64) -> Result<(), TimelockError> {
        if *caller != self.address {
            return Err(TimelockError::OnlySelf(*caller));
        }
        let old = self.min_delay;
        self.min_delay = new_delay;
        self.events.push(TimelockEvent::MinDelayChanged { old, new: new_delay });
        tracing::info!(old, new = new_delay, "minimum delay changed");
        Ok(())
    }

    fn ensure_ready(&self, id: &OperationId, ctx: &BlockContext) -> Result<(), TimelockError> {
        let reason = match self.operations.get(id) {
            None => NotReadyReason::Unscheduled,
            Some(r) if r.state == OperationState::Done => NotReadyReason::AlreadyDone,
            Some(r) if ctx.timestamp < r.ready_at => NotReadyReason::Waiting {
                ready_at: r.ready_at,
            },
            Some(r) if self.lapsed(r, ctx) => NotReadyReason::Expired {
                expired_at: r.ready_at.saturating_add(self.grace_period),
            },
            Some(_) => return Ok(()),
        };
        Err(TimelockError::NotReady { id: *id, reason })
    }

    fn lapsed(&self, record: &OperationRecord, ctx: &BlockContext) -> bool {
        self.grace_period > 0 && record.ready_at.has_expired(self.grace_period, ctx.timestamp)
    }

    fn apply_self_call(&mut self, call: &Call) -> Result<(), CallError> {
        if call.value != 0 {
            return Err(CallError::Reverted("timelock calls carry no value".into()));
        }
        let me = self.address;
        let result = match TimelockCall::decode(&call.data)? {
            TimelockCall::UpdateDelay(delay) => self.update_delay(&me, delay),
            TimelockCall::GrantRole(role, account) => self.grant_role(&me, role, account),
            TimelockCall::RevokeRole(role, account) => self.revoke_role(&me, role, account),
        };
        result.map_err(|e| CallError::Reverted(e.to_string()))
    }

    fn record_grant(&mut self, role: Role, account: Account, sender: Account) {
        if self.roles.grant(role, account) {
            self.events.push(TimelockEvent::RoleGranted {
                role,
                account,
                sender,
            });
            tracing::debug!(role = %role, account = %account, sender = %sender, "role granted");
        }
    }

    fn record_revoke(&mut self, role: Role, account: Account, sender: Account) {
        if self.roles.revoke(role, account) {
            self.events.push(TimelockEvent::RoleRevoked {
                role,
                account,
                sender,
            });
            tracing::debug!(role = %role, account = %account, sender = %sender, "role revoked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records every dispatched call; calls whose data starts with 0xff revert.
    #[derive(Clone, Default)]
    struct Recorder {
        applied: Vec<(Account, Vec<u8>)>,
    }

    impl Dispatcher for Recorder {
        fn dispatch(
            &mut self,
            caller: &Account,
            call: &Call,
            _ctx: &BlockContext,
        ) -> Result<(), CallError> {
            if call.data.first() == Some(&0xff) {
                return Err(CallError::Reverted("boom".into()));
            }
            self.applied.push((*caller, call.data.clone()));
            Ok(())
        }
    }

    fn account(name: &str) -> Account {
        Account::from_label(name)
    }

    fn at(secs: u64) -> BlockContext {
        BlockContext::new(secs / 12, secs)
    }

    fn call(data: &[u8]) -> Call {
        Call::new(account("target"), 0, data.to_vec())
    }

    fn gate() -> TimelockGate {
        let mut gate = TimelockGate::new(
            account("timelock"),
            60,
            &[account("proposer")],
            &[account("executor")],
            Some(account("deployer")),
        );
        gate.take_events();
        gate
    }

    #[test]
    fn schedule_requires_proposer() {
        let mut g = gate();
        let op = Operation::new(vec![call(&[1])], None, [0u8; 32]);
        let err = g.schedule(&account("mallory"), &op, 60, &at(0)).unwrap_err();
        assert!(matches!(err, TimelockError::MissingRole { role: Role::Proposer, .. }));
        assert_eq!(err.kind(), quorum_types::ErrorKind::Authorization);
    }

    #[test]
    fn schedule_enforces_min_delay() {
        let mut g = gate();
        let op = Operation::new(vec![call(&[1])], None, [0u8; 32]);
        let err = g.schedule(&account("proposer"), &op, 59, &at(0)).unwrap_err();
        assert!(matches!(
            err,
            TimelockError::InsufficientDelay {
                delay: 59,
                min_delay: 60
            }
        ));
    }

    #[test]
    fn schedule_twice_rejected() {
        let mut g = gate();
        let op = Operation::new(vec![call(&[1])], None, [0u8; 32]);
        let id = g.schedule(&account("proposer"), &op, 60, &at(100)).unwrap();
        assert_eq!(g.ready_at(&id), Some(Timestamp::new(160)));
        assert!(g.is_operation_pending(&id));
        assert!(matches!(
            g.schedule(&account("proposer"), &op, 60, &at(100)),
            Err(TimelockError::AlreadyScheduled(_))
        ));
    }

    #[test]
    fn execute_before_ready_fails_then_succeeds_once() {
        let mut g = gate();
        let mut targets = Recorder::default();
        let op = Operation::new(vec![call(&[1]), call(&[2])], None, [0u8; 32]);
        let id = g.schedule(&account("proposer"), &op, 60, &at(0)).unwrap();

        let err = g.execute(&account("executor"), &op, &at(59), &mut targets).unwrap_err();
        assert!(matches!(
            err,
            TimelockError::NotReady {
                reason: NotReadyReason::Waiting { .. },
                ..
            }
        ));
        assert!(!g.is_operation_ready(&id, &at(59)));
        assert!(g.is_operation_ready(&id, &at(60)));

        g.execute(&account("executor"), &op, &at(60), &mut targets).unwrap();
        assert!(g.is_operation_done(&id));
        assert_eq!(targets.applied.len(), 2);
        assert_eq!(targets.applied[0], (account("timelock"), vec![1]));
        assert_eq!(targets.applied[1].1, vec![2]);

        let err = g.execute(&account("executor"), &op, &at(61), &mut targets).unwrap_err();
        assert!(matches!(
            err,
            TimelockError::NotReady {
                reason: NotReadyReason::AlreadyDone,
                ..
            }
        ));
        assert_eq!(targets.applied.len(), 2);
    }

    #[test]
    fn operation_lapses_after_grace_period() {
        let mut g = gate().with_grace_period(100);
        let mut targets = Recorder::default();
        let op = Operation::new(vec![call(&[1])], None, [0u8; 32]);
        let id = g.schedule(&account("proposer"), &op, 60, &at(0)).unwrap();

        assert!(g.is_operation_ready(&id, &at(159)));
        assert!(!g.is_operation_expired(&id, &at(159)));
        assert!(!g.is_operation_ready(&id, &at(160)));
        assert!(g.is_operation_expired(&id, &at(160)));

        let err = g.execute(&account("executor"), &op, &at(160), &mut targets).unwrap_err();
        assert!(matches!(
            err,
            TimelockError::NotReady {
                reason: NotReadyReason::Expired { expired_at },
                ..
            } if expired_at == Timestamp::new(160)
        ));
        assert!(targets.applied.is_empty());
        assert!(g.is_operation_pending(&id));

        g.cancel(&account("proposer"), &id).unwrap();
        assert_eq!(g.operation_state(&id), OperationState::Unset);
    }

    #[test]
    fn no_grace_period_never_lapses() {
        let mut g = gate();
        let mut targets = Recorder::default();
        let op = Operation::new(vec![call(&[1])], None, [0u8; 32]);
        let id = g.schedule(&account("proposer"), &op, 60, &at(0)).unwrap();
        assert!(!g.is_operation_expired(&id, &at(10_000_000)));
        g.execute(&account("executor"), &op, &at(10_000_000), &mut targets).unwrap();
    }

    #[test]
    fn failing_call_aborts_whole_batch() {
        let mut g = gate();
        let mut targets = Recorder::default();
        let op = Operation::new(vec![call(&[1]), call(&[0xff]), call(&[3])], None, [0u8; 32]);
        let id = g.schedule(&account("proposer"), &op, 60, &at(0)).unwrap();

        let err = g.execute(&account("executor"), &op, &at(60), &mut targets).unwrap_err();
        assert!(matches!(err, TimelockError::BatchExecution { index: 1, .. }));
        assert_eq!(err.kind(), quorum_types::ErrorKind::ExecutionFailure);
        assert!(targets.applied.is_empty());
        assert!(g.is_operation_pending(&id));
    }

    #[test]
    fn executor_role_can_be_opened() {
        let mut g = gate();
        let mut targets = Recorder::default();
        let op = Operation::new(vec![call(&[1])], None, [0u8; 32]);
        g.schedule(&account("proposer"), &op, 60, &at(0)).unwrap();

        assert!(g.execute(&account("anyone"), &op, &at(60), &mut targets).is_err());
        g.grant_role(&account("deployer"), Role::Executor, Account::ZERO).unwrap();
        g.execute(&account("anyone"), &op, &at(60), &mut targets).unwrap();
    }

    #[test]
    fn predecessor_must_be_done() {
        let mut g = gate();
        let mut targets = Recorder::default();
        let first = Operation::new(vec![call(&[1])], None, [1u8; 32]);
        let first_id = g.schedule(&account("proposer"), &first, 60, &at(0)).unwrap();
        let second = Operation::new(vec![call(&[2])], Some(first_id), [2u8; 32]);
        let second_id = g
            .schedule_batch(&account("proposer"), vec![call(&[2])], Some(first_id), [2u8; 32], 60, &at(0))
            .unwrap();
        assert_eq!(second_id, second.id());

        let err = g.execute(&account("executor"), &second, &at(60), &mut targets).unwrap_err();
        assert!(matches!(
            err,
            TimelockError::NotReady {
                reason: NotReadyReason::PredecessorPending(_),
                ..
            }
        ));
        g.execute(&account("executor"), &first, &at(60), &mut targets).unwrap();
        g.execute(&account("executor"), &second, &at(60), &mut targets).unwrap();
    }

    #[test]
    fn cancel_pending_and_refuse_done() {
        let mut g = gate();
        let mut targets = Recorder::default();
        let op = Operation::new(vec![call(&[1])], None, [0u8; 32]);
        let id = g.schedule(&account("proposer"), &op, 60, &at(0)).unwrap();

        assert!(g.cancel(&account("executor"), &id).is_err());
        g.cancel(&account("proposer"), &id).unwrap();
        assert_eq!(g.operation_state(&id), OperationState::Unset);
        assert!(matches!(
            g.cancel(&account("proposer"), &id),
            Err(TimelockError::NotPending(_))
        ));

        let id = g.schedule(&account("proposer"), &op, 60, &at(10)).unwrap();
        g.execute(&account("executor"), &op, &at(70), &mut targets).unwrap();
        assert!(matches!(
            g.cancel(&account("proposer"), &id),
            Err(TimelockError::CannotCancelDone(_))
        ));
    }

    #[test]
    fn revoked_admin_cannot_regrant() {
        let mut g = gate();
        let deployer = account("deployer");
        g.renounce_role(&deployer, Role::Admin).unwrap();
        let err = g.grant_role(&deployer, Role::Proposer, deployer).unwrap_err();
        assert!(matches!(err, TimelockError::MissingRole { role: Role::Admin, .. }));
        assert!(g.has_role(Role::Admin, &account("timelock")));
    }

    #[test]
    fn update_delay_only_through_self_call() {
        let mut g = gate();
        let mut targets = Recorder::default();
        assert!(matches!(
            g.update_delay(&account("deployer"), 0),
            Err(TimelockError::OnlySelf(_))
        ));

        let op = Operation::new(
            vec![TimelockCall::UpdateDelay(3_600).to_call(account("timelock"))],
            None,
            [0u8; 32],
        );
        g.schedule(&account("proposer"), &op, 60, &at(0)).unwrap();
        g.execute(&account("executor"), &op, &at(60), &mut targets).unwrap();
        assert_eq!(g.min_delay(), 3_600);
        assert!(g
            .events()
            .contains(&TimelockEvent::MinDelayChanged { old: 60, new: 3_600 }));
    }

    #[test]
    fn self_call_changes_roll_back_with_batch() {
        let mut g = gate();
        let mut targets = Recorder::default();
        let newcomer = account("newcomer");
        let op = Operation::new(
            vec![
                TimelockCall::GrantRole(Role::Proposer, newcomer).to_call(account("timelock")),
                call(&[0xff]),
            ],
            None,
            [0u8; 32],
        );
        g.schedule(&account("proposer"), &op, 60, &at(0)).unwrap();
        assert!(g.execute(&account("executor"), &op, &at(60), &mut targets).is_err());
        assert!(!g.has_role(Role::Proposer, &newcomer));
    }
}
