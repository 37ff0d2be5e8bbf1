//! The governor: propose, vote, queue, execute, cancel.

use crate::counting::{quorum_of, Ballot, Tally, VoteChoice};
use crate::error::GovernorError;
use crate::event::GovernorEvent;
use crate::proposal::{Proposal, ProposalState};
use crate::settings::GovernorSettings;
use crate::votes::VotingPower;
use quorum_timelock::{NotReadyReason, OperationState, TimelockError, TimelockGate};
use quorum_types::{
    Account, BlockContext, BlockHeight, Call, Dispatcher, OperationId, ProposalId, Timestamp,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Proposal controller bound to one timelock.
///
/// The governor holds no references to the token or the timelock; each
/// operation receives the collaborators it reads or drives. Every proposal
/// is keyed by [`Governor::hash_proposal`].
pub struct Governor {
    address: Account,
    timelock: Account,
    settings: GovernorSettings,
    proposals: HashMap<ProposalId, Proposal>,
    /// Superseded records of re-proposed ids, oldest first.
    archived: Vec<(ProposalId, Proposal)>,
    events: Vec<GovernorEvent>,
}

/// Serializable snapshot of the governor state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GovernorSnapshot {
    pub address: Account,
    pub timelock: Account,
    pub settings: GovernorSettings,
    pub proposals: Vec<(ProposalId, Proposal)>,
    pub archived: Vec<(ProposalId, Proposal)>,
}

impl Governor {
    pub fn new(
        address: Account,
        timelock: Account,
        settings: GovernorSettings,
    ) -> Result<Self, GovernorError> {
        settings.validate()?;
        tracing::info!(
            address = %address,
            timelock = %timelock,
            voting_delay = settings.voting_delay,
            voting_period = settings.voting_period,
            quorum_percentage = settings.quorum_percentage,
            "governor deployed"
        );
        Ok(Self {
            address,
            timelock,
            settings,
            proposals: HashMap::new(),
            archived: Vec::new(),
            events: Vec::new(),
        })
    }

    pub fn address(&self) -> Account {
        self.address
    }

    pub fn timelock(&self) -> Account {
        self.timelock
    }

    pub fn settings(&self) -> &GovernorSettings {
        &self.settings
    }

    pub fn voting_delay(&self) -> u64 {
        self.settings.voting_delay
    }

    pub fn voting_period(&self) -> u64 {
        self.settings.voting_period
    }

    pub fn proposal_threshold(&self) -> u128 {
        self.settings.proposal_threshold
    }

    pub fn events(&self) -> &[GovernorEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<GovernorEvent> {
        std::mem::take(&mut self.events)
    }

    /// Superseded proposal records, kept for audit.
    pub fn archived(&self) -> &[(ProposalId, Proposal)] {
        &self.archived
    }

    pub fn proposal(&self, id: &ProposalId) -> Option<&Proposal> {
        self.proposals.get(id)
    }

    pub fn hash_proposal(calls: &[Call], description: &str) -> ProposalId {
        let description_hash = quorum_crypto::hash_description(description);
        quorum_crypto::hash_proposal(calls, &description_hash)
    }

    /// Votes required at `height`: a share of total supply at that block.
    pub fn quorum<V: VotingPower>(
        &self,
        votes: &V,
        height: BlockHeight,
        ctx: &BlockContext,
    ) -> Result<u128, GovernorError> {
        let supply = votes.past_total_supply(height, ctx)?;
        Ok(quorum_of(supply, self.settings.quorum_percentage))
    }

    pub fn proposal_snapshot(&self, id: &ProposalId) -> Result<BlockHeight, GovernorError> {
        Ok(self.get(id)?.snapshot)
    }

    pub fn proposal_deadline(&self, id: &ProposalId) -> Result<BlockHeight, GovernorError> {
        Ok(self.get(id)?.deadline)
    }

    pub fn proposal_proposer(&self, id: &ProposalId) -> Result<Account, GovernorError> {
        Ok(self.get(id)?.proposer)
    }

    /// When the queued proposal becomes executable, if queued.
    pub fn proposal_eta(&self, id: &ProposalId) -> Result<Option<Timestamp>, GovernorError> {
        Ok(self.get(id)?.eta)
    }

    pub fn proposal_votes(&self, id: &ProposalId) -> Result<Tally, GovernorError> {
        Ok(self.get(id)?.tally)
    }

    pub fn has_voted(&self, id: &ProposalId, account: &Account) -> Result<bool, GovernorError> {
        Ok(self.get(id)?.has_voted(account))
    }

    /// Derive the lifecycle state of `id` at `ctx`.
    ///
    /// A queued proposal follows its timelock operation, which may have been
    /// executed or cancelled directly through the timelock.
    pub fn state<V: VotingPower>(
        &self,
        id: &ProposalId,
        votes: &V,
        timelock: &TimelockGate,
        ctx: &BlockContext,
    ) -> Result<ProposalState, GovernorError> {
        self.ensure_timelock(timelock)?;
        let proposal = self.get(id)?;
        self.derive_state(proposal, votes, timelock, ctx)
    }

    /// Create a proposal for `calls`, opening for votes after the voting delay.
    pub fn propose<V: VotingPower>(
        &mut self,
        proposer: &Account,
        calls: Vec<Call>,
        description: &str,
        votes: &V,
        timelock: &TimelockGate,
        ctx: &BlockContext,
    ) -> Result<ProposalId, GovernorError> {
        self.ensure_timelock(timelock)?;
        if calls.is_empty() {
            return Err(GovernorError::EmptyBatch);
        }
        let threshold = self.settings.proposal_threshold;
        if threshold > 0 {
            let held = match ctx.height.prev() {
                Some(prev) => votes.past_votes(proposer, prev, ctx)?,
                None => 0,
            };
            if held < threshold {
                return Err(GovernorError::BelowProposalThreshold {
                    votes: held,
                    threshold,
                });
            }
        }

        let id = Self::hash_proposal(&calls, description);
        if let Some(existing) = self.proposals.get(&id) {
            let state = self.derive_state(existing, votes, timelock, ctx)?;
            if !state.allows_repropose() {
                return Err(GovernorError::DuplicateProposal(id));
            }
        }

        let snapshot = ctx.height.saturating_add(self.settings.voting_delay);
        let deadline = snapshot.saturating_add(self.settings.voting_period);
        let proposal = Proposal {
            proposer: *proposer,
            calls,
            description: description.to_string(),
            description_hash: quorum_crypto::hash_description(description),
            snapshot,
            deadline,
            tally: Tally::default(),
            ballots: HashMap::new(),
            eta: None,
            executed: false,
            canceled: false,
        };
        self.events.push(GovernorEvent::ProposalCreated {
            id,
            proposer: *proposer,
            calls: proposal.calls.len(),
            snapshot,
            deadline,
            description: proposal.description.clone(),
        });
        if let Some(previous) = self.proposals.insert(id, proposal) {
            self.archived.push((id, previous));
        }
        tracing::info!(
            id = %id,
            proposer = %proposer,
            snapshot = snapshot.get(),
            deadline = deadline.get(),
            "proposal created"
        );
        Ok(id)
    }

    /// Cast `voter`'s snapshot weight on `id`. Returns the weight counted.
    pub fn cast_vote<V: VotingPower>(
        &mut self,
        voter: &Account,
        id: &ProposalId,
        choice: VoteChoice,
        votes: &V,
        ctx: &BlockContext,
    ) -> Result<u128, GovernorError> {
        self.cast_vote_with_reason(voter, id, choice, None, votes, ctx)
    }

    pub fn cast_vote_with_reason<V: VotingPower>(
        &mut self,
        voter: &Account,
        id: &ProposalId,
        choice: VoteChoice,
        reason: Option<String>,
        votes: &V,
        ctx: &BlockContext,
    ) -> Result<u128, GovernorError> {
        let proposal = self.get(id)?;
        let state = self.recorded_state(proposal, votes, ctx)?;
        if state != ProposalState::Active {
            return Err(GovernorError::ProposalNotActive { id: *id, state });
        }
        if proposal.has_voted(voter) {
            return Err(GovernorError::AlreadyVoted {
                id: *id,
                voter: *voter,
            });
        }
        let weight = votes.past_votes(voter, proposal.snapshot, ctx)?;

        let proposal = self.get_mut(id)?;
        proposal.tally.add(choice, weight)?;
        proposal.ballots.insert(
            *voter,
            Ballot {
                choice,
                weight,
                reason: reason.clone(),
            },
        );
        self.events.push(GovernorEvent::VoteCast {
            id: *id,
            voter: *voter,
            choice,
            weight,
            reason,
        });
        tracing::info!(id = %id, voter = %voter, choice = %choice, weight, "vote cast");
        Ok(weight)
    }

    /// Schedule a succeeded proposal in the timelock with its minimum delay.
    pub fn queue<V: VotingPower>(
        &mut self,
        id: &ProposalId,
        votes: &V,
        timelock: &mut TimelockGate,
        ctx: &BlockContext,
    ) -> Result<OperationId, GovernorError> {
        self.ensure_timelock(timelock)?;
        let proposal = self.get(id)?;
        self.expect_state(id, proposal, votes, timelock, ctx, ProposalState::Succeeded)?;

        let op = proposal.operation();
        let op_id = timelock.schedule(&self.address, &op, timelock.min_delay(), ctx)?;
        let eta = timelock
            .ready_at(&op_id)
            .ok_or(GovernorError::TimelockNotReady {
                id: *id,
                reason: NotReadyReason::Unscheduled,
            })?;

        self.get_mut(id)?.eta = Some(eta);
        self.events.push(GovernorEvent::ProposalQueued { id: *id, eta });
        tracing::info!(id = %id, operation = %op_id, eta = %eta, "proposal queued");
        Ok(op_id)
    }

    /// Execute a queued proposal's batch through the timelock.
    ///
    /// `caller` is the account the timelock checks for the executor role.
    pub fn execute<V: VotingPower, D: Dispatcher + Clone>(
        &mut self,
        caller: &Account,
        id: &ProposalId,
        votes: &V,
        timelock: &mut TimelockGate,
        dispatcher: &mut D,
        ctx: &BlockContext,
    ) -> Result<(), GovernorError> {
        self.ensure_timelock(timelock)?;
        let proposal = self.get(id)?;
        self.expect_state(id, proposal, votes, timelock, ctx, ProposalState::Queued)?;

        let op = proposal.operation();
        timelock
            .execute(caller, &op, ctx, dispatcher)
            .map_err(|e| match e {
                TimelockError::NotReady { reason, .. } => {
                    GovernorError::TimelockNotReady { id: *id, reason }
                }
                TimelockError::BatchExecution { index, reason } => {
                    GovernorError::BatchExecution { index, reason }
                }
                other => GovernorError::Timelock(other),
            })?;

        self.get_mut(id)?.executed = true;
        self.events.push(GovernorEvent::ProposalExecuted { id: *id });
        tracing::info!(id = %id, executor = %caller, "proposal executed");
        Ok(())
    }

    /// Cancel a proposal that is not final. Only the proposer or the guardian
    /// may cancel; a queued proposal is also removed from the timelock.
    pub fn cancel<V: VotingPower>(
        &mut self,
        caller: &Account,
        id: &ProposalId,
        votes: &V,
        timelock: &mut TimelockGate,
        ctx: &BlockContext,
    ) -> Result<(), GovernorError> {
        self.ensure_timelock(timelock)?;
        let proposal = self.get(id)?;
        let state = self.derive_state(proposal, votes, timelock, ctx)?;
        if state.is_final() {
            return Err(GovernorError::UnexpectedState {
                id: *id,
                state,
                expected: "pending, active, succeeded or queued",
            });
        }
        let is_guardian = self.settings.guardian == Some(*caller);
        if proposal.proposer != *caller && !is_guardian {
            return Err(GovernorError::NotProposer(*caller));
        }
        if state == ProposalState::Queued {
            timelock.cancel(&self.address, &proposal.operation().id())?;
        }

        self.get_mut(id)?.canceled = true;
        self.events.push(GovernorEvent::ProposalCanceled { id: *id });
        tracing::info!(id = %id, by = %caller, from = %state, "proposal canceled");
        Ok(())
    }

    pub fn save_state(&self) -> Result<Vec<u8>, GovernorError> {
        let mut proposals: Vec<(ProposalId, Proposal)> = self
            .proposals
            .iter()
            .map(|(id, p)| (*id, p.clone()))
            .collect();
        proposals.sort_by(|a, b| a.0.cmp(&b.0));
        let snapshot = GovernorSnapshot {
            address: self.address,
            timelock: self.timelock,
            settings: self.settings.clone(),
            proposals,
            archived: self.archived.clone(),
        };
        bincode::serialize(&snapshot).map_err(|e| GovernorError::Snapshot(e.to_string()))
    }

    pub fn load_state(data: &[u8]) -> Result<Self, GovernorError> {
        let snapshot: GovernorSnapshot =
            bincode::deserialize(data).map_err(|e| GovernorError::Snapshot(e.to_string()))?;
        snapshot.settings.validate()?;
        Ok(Self {
            address: snapshot.address,
            timelock: snapshot.timelock,
            settings: snapshot.settings,
            proposals: snapshot.proposals.into_iter().collect(),
            archived: snapshot.archived,
            events: Vec::new(),
        })
    }

    fn get(&self, id: &ProposalId) -> Result<&Proposal, GovernorError> {
        self.proposals
            .get(id)
            .ok_or(GovernorError::UnknownProposal(*id))
    }

    fn get_mut(&mut self, id: &ProposalId) -> Result<&mut Proposal, GovernorError> {
        self.proposals
            .get_mut(id)
            .ok_or(GovernorError::UnknownProposal(*id))
    }

    fn ensure_timelock(&self, timelock: &TimelockGate) -> Result<(), GovernorError> {
        if timelock.address() != self.timelock {
            return Err(GovernorError::ForeignTimelock {
                expected: self.timelock,
                actual: timelock.address(),
            });
        }
        Ok(())
    }

    fn expect_state<V: VotingPower>(
        &self,
        id: &ProposalId,
        proposal: &Proposal,
        votes: &V,
        timelock: &TimelockGate,
        ctx: &BlockContext,
        expected: ProposalState,
    ) -> Result<(), GovernorError> {
        let state = self.derive_state(proposal, votes, timelock, ctx)?;
        if state != expected {
            return Err(GovernorError::UnexpectedState {
                id: *id,
                state,
                expected: expected.as_str(),
            });
        }
        Ok(())
    }

    fn derive_state<V: VotingPower>(
        &self,
        proposal: &Proposal,
        votes: &V,
        timelock: &TimelockGate,
        ctx: &BlockContext,
    ) -> Result<ProposalState, GovernorError> {
        let state = self.recorded_state(proposal, votes, ctx)?;
        if state != ProposalState::Queued {
            return Ok(state);
        }
        let op_id = proposal.operation().id();
        let state = match timelock.operation_state(&op_id) {
            OperationState::Done => ProposalState::Executed,
            OperationState::Unset => ProposalState::Canceled,
            OperationState::Pending if timelock.is_operation_expired(&op_id, ctx) => {
                ProposalState::Expired
            }
            OperationState::Pending => ProposalState::Queued,
        };
        Ok(state)
    }

    /// State from the governor's own records alone. A queued proposal is
    /// reported as `Queued` whatever its timelock operation did since.
    fn recorded_state<V: VotingPower>(
        &self,
        proposal: &Proposal,
        votes: &V,
        ctx: &BlockContext,
    ) -> Result<ProposalState, GovernorError> {
        if proposal.executed {
            return Ok(ProposalState::Executed);
        }
        if proposal.canceled {
            return Ok(ProposalState::Canceled);
        }
        if ctx.height <= proposal.snapshot {
            return Ok(ProposalState::Pending);
        }
        if ctx.height <= proposal.deadline {
            return Ok(ProposalState::Active);
        }

        let quorum = self.quorum(votes, proposal.snapshot, ctx)?;
        if !proposal.tally.succeeded(quorum) {
            return Ok(ProposalState::Defeated);
        }
        let state = match proposal.eta {
            None => {
                let window = self.settings.queue_window;
                let closes = proposal.deadline.saturating_add(window);
                if window > 0 && ctx.height > closes {
                    ProposalState::Expired
                } else {
                    ProposalState::Succeeded
                }
            }
            Some(_) => ProposalState::Queued,
        };
        Ok(state)
    }
}
