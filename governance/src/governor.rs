//! Governance program
//!
//! Owns the proposal registry. Anyone may create proposals, vote once per
//! proposal while its window is open, and execute a proposal that has ended
//! with a yes majority. Execution forwards the proposal's value and call data
//! to its target, which in the canonical deployment is the treasury's
//! `release_funds`.

use crate::call::GovernanceCall;
use crate::error::{GovernanceError, Result};
use crate::proposal::{Proposal, ProposalId, ProposalParams, ProposalStatus};
use crate::voting::Outcome;
use echo_core::codec;
use echo_core::{format_units, Address, Amount, BlockHeight, Contract, Env, Event, Revert};
use serde::{Deserialize, Serialize};
use std::any::Any;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Governance {
    treasury: Address,
    voting_period_blocks: u64,
    /// Indexed by id; ids are assigned sequentially from zero.
    proposals: Vec<Proposal>,
}

impl Governance {
    pub fn new(treasury: Address, voting_period_blocks: u64) -> Result<Self> {
        if voting_period_blocks == 0 {
            return Err(GovernanceError::InvalidVotingPeriod);
        }
        Ok(Self {
            treasury,
            voting_period_blocks,
            proposals: Vec::new(),
        })
    }

    pub fn treasury(&self) -> Address {
        self.treasury
    }

    pub fn voting_period_blocks(&self) -> u64 {
        self.voting_period_blocks
    }

    pub fn proposal_count(&self) -> u64 {
        self.proposals.len() as u64
    }

    pub fn proposal(&self, id: ProposalId) -> Option<&Proposal> {
        usize::try_from(id).ok().and_then(|i| self.proposals.get(i))
    }

    /// Every proposal, oldest first.
    pub fn proposals(&self) -> &[Proposal] {
        &self.proposals
    }

    pub fn status(&self, id: ProposalId, height: BlockHeight) -> Result<ProposalStatus> {
        Ok(self.get(id)?.status(height))
    }

    pub fn create_proposal(
        &mut self,
        env: &mut Env<'_>,
        target: Address,
        value: Amount,
        call_data: Vec<u8>,
        description: String,
    ) -> Result<ProposalId> {
        let id = self.proposal_count();
        let start = env.block_height();
        let proposal = Proposal::new(
            id,
            ProposalParams {
                proposer: env.caller(),
                target,
                value,
                call_data,
                description,
            },
            start,
            self.voting_period_blocks,
        )
        .ok_or(GovernanceError::WindowOverflow { start })?;

        env.emit(Event::ProposalCreated {
            id,
            proposer: proposal.proposer,
            target,
            value,
            description: proposal.description.clone(),
        });
        log::info!(
            "proposal {} created by {}: {} to {}, voting until block {}",
            id,
            proposal.proposer,
            format_units(value),
            target,
            proposal.block_end
        );

        self.proposals.push(proposal);
        Ok(id)
    }

    /// Create a proposal that releases `amount` of treasury funds to
    /// `recipient`.
    pub fn propose_release(
        &mut self,
        env: &mut Env<'_>,
        recipient: Address,
        amount: Amount,
        description: String,
    ) -> std::result::Result<ProposalId, Revert> {
        let call_data = treasury::release_funds_call(recipient, amount)?;
        Ok(self.create_proposal(env, self.treasury, 0, call_data, description)?)
    }

    pub fn vote(&mut self, env: &mut Env<'_>, id: ProposalId, support: bool) -> Result<()> {
        let voter = env.caller();
        let current = env.block_height();
        let proposal = self.get_mut(id)?;

        if !proposal.is_voting_open(current) {
            return Err(GovernanceError::VotingNotActive {
                id,
                current,
                start: proposal.block_start,
                end: proposal.block_end,
            });
        }
        if !proposal.record_vote(voter, support) {
            return Err(GovernanceError::AlreadyVoted { id, voter });
        }

        env.emit(Event::VoteCast {
            proposal_id: id,
            voter,
            support,
        });
        log::debug!(
            "{} voted {} on proposal {}",
            voter,
            if support { "yes" } else { "no" },
            id
        );
        Ok(())
    }

    /// Execute an ended, passed proposal. Returns the forwarded call's output.
    ///
    /// `executed` is set before the forwarded call. If that call reverts the
    /// whole execution reverts with it, so the flag never stays set for
    /// funds that did not move.
    pub fn execute_proposal(&mut self, env: &mut Env<'_>, id: ProposalId) -> Result<Vec<u8>> {
        let current = env.block_height();
        let proposal = self.get_mut(id)?;

        if !proposal.has_ended(current) {
            return Err(GovernanceError::VotingNotEnded {
                id,
                current,
                end: proposal.block_end,
            });
        }
        if proposal.executed {
            return Err(GovernanceError::AlreadyExecuted(id));
        }
        let tally = proposal.tally();
        if tally.outcome() != Outcome::Passed {
            return Err(GovernanceError::ProposalNotPassed {
                id,
                yes: tally.yes,
                no: tally.no,
            });
        }

        proposal.executed = true;
        let (target, value) = (proposal.target, proposal.value);
        let call_data = proposal.call_data.clone();

        let return_data = env
            .call(target, value, &call_data)
            .map_err(|cause| GovernanceError::ExecutionReverted { id, cause })?;

        env.emit(Event::ProposalExecuted {
            proposal_id: id,
            success: true,
            return_data: return_data.clone(),
        });
        log::info!("proposal {} executed against {}", id, target);
        Ok(return_data)
    }

    fn get(&self, id: ProposalId) -> Result<&Proposal> {
        self.proposal(id).ok_or(GovernanceError::UnknownProposal(id))
    }

    fn get_mut(&mut self, id: ProposalId) -> Result<&mut Proposal> {
        usize::try_from(id)
            .ok()
            .and_then(|i| self.proposals.get_mut(i))
            .ok_or(GovernanceError::UnknownProposal(id))
    }
}

impl Contract for Governance {
    fn name(&self) -> &'static str {
        "governance"
    }

    fn invoke(&mut self, env: &mut Env<'_>, input: &[u8]) -> std::result::Result<Vec<u8>, Revert> {
        match GovernanceCall::decode(input)? {
            GovernanceCall::Receive => Ok(Vec::new()),
            GovernanceCall::CreateProposal {
                target,
                value,
                call_data,
                description,
            } => {
                let id = self.create_proposal(env, target, value, call_data, description)?;
                codec::encode(&id)
            }
            GovernanceCall::ProposeRelease {
                recipient,
                amount,
                description,
            } => {
                let id = self.propose_release(env, recipient, amount, description)?;
                codec::encode(&id)
            }
            GovernanceCall::Vote {
                proposal_id,
                support,
            } => {
                self.vote(env, proposal_id, support)?;
                Ok(Vec::new())
            }
            GovernanceCall::ExecuteProposal { proposal_id } => {
                Ok(self.execute_proposal(env, proposal_id)?)
            }
            GovernanceCall::GetProposal { proposal_id } => codec::encode(self.get(proposal_id)?),
            GovernanceCall::ProposalCount => codec::encode(&self.proposal_count()),
            GovernanceCall::Treasury => codec::encode(&self.treasury),
            GovernanceCall::VotingPeriodBlocks => codec::encode(&self.voting_period_blocks),
        }
    }

    fn clone_box(&self) -> Box<dyn Contract> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
