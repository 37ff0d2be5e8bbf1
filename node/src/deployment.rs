//! A deployed governance pipeline on a local chain.

use crate::chain::LocalChain;
use crate::config::DeployConfig;
use crate::event::{EventBus, GovernanceEvent};
use crate::tracing_spans;
use crate::NodeError;
use quorum_governor::{Governor, GovernorError, ProposalState, VoteChoice};
use quorum_targets::{TargetRegistry, ValueStore, ValueStoreCall};
use quorum_timelock::{Role, TimelockGate};
use quorum_token::VoteToken;
use quorum_types::{Account, BlockContext, Call, Dispatcher, OperationId, ProposalId, Timestamp};

/// Token, timelock, governor and a governed value store, wired together.
pub struct Deployment {
    config: DeployConfig,
    chain: LocalChain,
    deployer: Account,
    token: VoteToken,
    timelock: TimelockGate,
    governor: Governor,
    targets: TargetRegistry,
    value_store: Account,
    bus: EventBus,
}

impl Deployment {
    /// Deploy and wire the whole pipeline:
    ///
    /// 1. Token; the initial supply goes to the deployer, who self-delegates.
    /// 2. Timelock with the deployer as temporary admin and no other roles;
    ///    queued batches lapse `grace_period` seconds after they are ready.
    /// 3. Governor bound to the token and the timelock.
    /// 4. Governor gets `Proposer` and `Canceller`; `Executor` goes to the
    ///    open grant and/or the configured executors.
    /// 5. The deployer renounces `Admin`.
    /// 6. A value store owned by the deployer, then handed to the timelock.
    pub fn bootstrap(config: DeployConfig) -> Result<Self, NodeError> {
        config.validate()?;
        let _span = tracing_spans::bootstrap_span(config.network.as_str()).entered();

        let chain = LocalChain::new(Timestamp::EPOCH, config.block_time_secs);
        let deployer = config.deployer_account()?;
        let network = config.network.as_str();
        let address = |name: &str| Account::from_label(&format!("{network}:{name}"));

        let ctx = chain.mine(1);
        let mut token = VoteToken::new(address("token"), &config.token_name, &config.token_symbol);
        let unit = 10u128.pow(u32::from(token.decimals()));
        let supply = u128::from(config.initial_supply).saturating_mul(unit);
        token.mint(&deployer, supply, &ctx)?;
        token.delegate(&deployer, &deployer, &ctx)?;
        tracing::info!(
            token = %token.address(),
            supply,
            checkpoints = token.num_checkpoints(&deployer),
            "token deployed and delegated"
        );

        let ctx = chain.mine(1);
        let mut timelock =
            TimelockGate::new(address("timelock"), config.min_delay, &[], &[], Some(deployer))
                .with_grace_period(config.grace_period);

        let governor = Governor::new(
            address("governor"),
            timelock.address(),
            config.governor_settings(unit)?,
        )?;

        timelock.grant_role(&deployer, Role::Proposer, governor.address())?;
        timelock.grant_role(&deployer, Role::Canceller, governor.address())?;
        if config.open_executor {
            timelock.grant_role(&deployer, Role::Executor, Account::ZERO)?;
        }
        for executor in config.executor_accounts()? {
            timelock.grant_role(&deployer, Role::Executor, executor)?;
        }
        timelock.revoke_role(&deployer, Role::Admin, deployer)?;
        tracing::info!(
            timelock = %timelock.address(),
            governor = %governor.address(),
            open_executor = config.open_executor,
            "roles configured, deployer admin revoked"
        );

        let value_store = address("box");
        let mut targets = TargetRegistry::new();
        targets.deploy(value_store, Box::new(ValueStore::new(deployer)));
        targets.dispatch(
            &deployer,
            &ValueStoreCall::TransferOwnership(timelock.address()).to_call(value_store),
            &ctx,
        )?;
        tracing::info!(store = %value_store, owner = %timelock.address(), "value store deployed");

        chain.mine(1);
        Ok(Self {
            config,
            chain,
            deployer,
            token,
            timelock,
            governor,
            targets,
            value_store,
            bus: EventBus::new(),
        })
    }

    pub fn config(&self) -> &DeployConfig {
        &self.config
    }

    pub fn chain(&self) -> &LocalChain {
        &self.chain
    }

    pub fn context(&self) -> BlockContext {
        self.chain.context()
    }

    pub fn deployer(&self) -> Account {
        self.deployer
    }

    pub fn token(&self) -> &VoteToken {
        &self.token
    }

    pub fn timelock(&self) -> &TimelockGate {
        &self.timelock
    }

    pub fn governor(&self) -> &Governor {
        &self.governor
    }

    pub fn value_store(&self) -> Account {
        self.value_store
    }

    /// One whole token in base units.
    pub fn unit(&self) -> u128 {
        10u128.pow(u32::from(self.token.decimals()))
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&GovernanceEvent) + Send + Sync>) {
        self.bus.subscribe(listener);
    }

    /// Produce `blocks` blocks.
    pub fn mine(&mut self, blocks: u64) -> BlockContext {
        let context = self.chain.mine(blocks);
        self.bus.emit(&GovernanceEvent::BlockMined { context });
        context
    }

    /// Move time forward by `secs` within one new block.
    pub fn warp(&mut self, secs: u64) -> BlockContext {
        let context = self.chain.warp(secs);
        self.bus.emit(&GovernanceEvent::BlockMined { context });
        context
    }

    pub fn transfer(&mut self, from: &Account, to: &Account, amount: u128) -> Result<(), NodeError> {
        let ctx = self.context();
        self.token.transfer(from, to, amount, &ctx)?;
        Ok(())
    }

    pub fn delegate(&mut self, holder: &Account, delegatee: &Account) -> Result<(), NodeError> {
        let ctx = self.context();
        let from = self.token.delegates(holder);
        self.token.delegate(holder, delegatee, &ctx)?;
        self.bus.emit(&GovernanceEvent::DelegateChanged {
            holder: *holder,
            from,
            to: *delegatee,
        });
        Ok(())
    }

    /// Propose storing `value` in the governed value store.
    pub fn propose_store(
        &mut self,
        proposer: &Account,
        value: u128,
        description: &str,
    ) -> Result<ProposalId, NodeError> {
        let call = ValueStoreCall::Store(value).to_call(self.value_store);
        self.propose(proposer, vec![call], description)
    }

    pub fn propose(
        &mut self,
        proposer: &Account,
        calls: Vec<Call>,
        description: &str,
    ) -> Result<ProposalId, NodeError> {
        let _span = tracing_spans::propose_span(&proposer.to_string(), calls.len()).entered();
        let ctx = self.context();
        let id = self
            .governor
            .propose(proposer, calls, description, &self.token, &self.timelock, &ctx)?;
        self.flush_events();
        Ok(id)
    }

    pub fn cast_vote(
        &mut self,
        voter: &Account,
        id: &ProposalId,
        choice: VoteChoice,
    ) -> Result<u128, NodeError> {
        self.cast_vote_with_reason(voter, id, choice, None)
    }

    pub fn cast_vote_with_reason(
        &mut self,
        voter: &Account,
        id: &ProposalId,
        choice: VoteChoice,
        reason: Option<String>,
    ) -> Result<u128, NodeError> {
        let _span = tracing_spans::vote_span(&id.to_string(), &voter.to_string()).entered();
        let ctx = self.context();
        let weight = self
            .governor
            .cast_vote_with_reason(voter, id, choice, reason, &self.token, &ctx)?;
        self.flush_events();
        Ok(weight)
    }

    pub fn queue(&mut self, id: &ProposalId) -> Result<OperationId, NodeError> {
        let _span = tracing_spans::queue_span(&id.to_string()).entered();
        let ctx = self.context();
        let op_id = self
            .governor
            .queue(id, &self.token, &mut self.timelock, &ctx)?;
        self.flush_events();
        Ok(op_id)
    }

    pub fn execute(&mut self, caller: &Account, id: &ProposalId) -> Result<(), NodeError> {
        let _span = tracing_spans::execute_span(&id.to_string(), &caller.to_string()).entered();
        let ctx = self.context();
        let before = self.stored_value();
        self.governor.execute(
            caller,
            id,
            &self.token,
            &mut self.timelock,
            &mut self.targets,
            &ctx,
        )?;
        self.flush_events();
        self.emit_value_change(before);
        Ok(())
    }

    /// Execute a queued proposal's batch straight through the timelock,
    /// bypassing the governor, as any holder of `Executor` may.
    pub fn execute_via_timelock(
        &mut self,
        caller: &Account,
        id: &ProposalId,
    ) -> Result<OperationId, NodeError> {
        let _span = tracing_spans::execute_span(&id.to_string(), &caller.to_string()).entered();
        let ctx = self.context();
        let op = self
            .governor
            .proposal(id)
            .ok_or(GovernorError::UnknownProposal(*id))?
            .operation();
        let before = self.stored_value();
        let op_id = self
            .timelock
            .execute(caller, &op, &ctx, &mut self.targets)?;
        self.flush_events();
        self.emit_value_change(before);
        Ok(op_id)
    }

    pub fn cancel(&mut self, caller: &Account, id: &ProposalId) -> Result<(), NodeError> {
        let _span = tracing_spans::cancel_span(&id.to_string(), &caller.to_string()).entered();
        let ctx = self.context();
        self.governor
            .cancel(caller, id, &self.token, &mut self.timelock, &ctx)?;
        self.flush_events();
        Ok(())
    }

    pub fn proposal_state(&self, id: &ProposalId) -> Result<ProposalState, NodeError> {
        Ok(self
            .governor
            .state(id, &self.token, &self.timelock, &self.context())?)
    }

    /// Current value held by the governed value store.
    pub fn stored_value(&self) -> u128 {
        self.targets
            .value_store(&self.value_store)
            .map(ValueStore::retrieve)
            .unwrap_or(0)
    }

    pub fn value_store_owner(&self) -> Option<Account> {
        self.targets
            .value_store(&self.value_store)
            .and_then(ValueStore::owner)
    }

    fn emit_value_change(&mut self, before: u128) {
        let after = self.stored_value();
        if after != before {
            self.bus.emit(&GovernanceEvent::ValueStored {
                store: self.value_store,
                value: after,
            });
        }
    }

    fn flush_events(&mut self) {
        for event in self.timelock.take_events() {
            self.bus.emit(&GovernanceEvent::Timelock(event));
        }
        for event in self.governor.take_events() {
            self.bus.emit(&GovernanceEvent::Governor(event));
        }
    }
}
