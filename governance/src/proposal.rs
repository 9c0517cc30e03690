//! Proposal records and their derived lifecycle status

use crate::voting::{Outcome, Tally};
use echo_core::{Address, Amount, BlockHeight};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

pub type ProposalId = u64;

/// Lifecycle position of a proposal at a given block.
///
/// Only `executed` is stored; everything else is derived from the block
/// height and the tally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalStatus {
    /// Window not yet open
    Pending,
    /// Accepting votes
    Active,
    /// Window closed with more yes than no votes; awaiting execution
    Passed,
    /// Window closed without a yes majority (ties included). Terminal.
    Failed,
    /// Terminal
    Executed,
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProposalStatus::Pending => "pending",
            ProposalStatus::Active => "active",
            ProposalStatus::Passed => "passed",
            ProposalStatus::Failed => "failed",
            ProposalStatus::Executed => "executed",
        };
        f.pad(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub proposer: Address,
    pub target: Address,
    pub value: Amount,
    pub call_data: Vec<u8>,
    pub description: String,
    pub block_start: BlockHeight,
    pub block_end: BlockHeight,
    pub yes_votes: u64,
    pub no_votes: u64,
    pub executed: bool,
    has_voted: BTreeSet<Address>,
}

/// Fields supplied by the proposer.
#[derive(Debug, Clone)]
pub struct ProposalParams {
    pub proposer: Address,
    pub target: Address,
    pub value: Amount,
    pub call_data: Vec<u8>,
    pub description: String,
}

impl Proposal {
    pub(crate) fn new(
        id: ProposalId,
        params: ProposalParams,
        block_start: BlockHeight,
        voting_period_blocks: u64,
    ) -> Option<Self> {
        let block_end = block_start.checked_add(voting_period_blocks)?;
        Some(Self {
            id,
            proposer: params.proposer,
            target: params.target,
            value: params.value,
            call_data: params.call_data,
            description: params.description,
            block_start,
            block_end,
            yes_votes: 0,
            no_votes: 0,
            executed: false,
            has_voted: BTreeSet::new(),
        })
    }

    pub fn has_voted(&self, voter: &Address) -> bool {
        self.has_voted.contains(voter)
    }

    pub fn voter_count(&self) -> usize {
        self.has_voted.len()
    }

    /// Inclusive window check.
    pub fn is_voting_open(&self, height: BlockHeight) -> bool {
        self.block_start <= height && height <= self.block_end
    }

    pub fn has_ended(&self, height: BlockHeight) -> bool {
        height > self.block_end
    }

    pub fn tally(&self) -> Tally {
        Tally {
            yes: self.yes_votes,
            no: self.no_votes,
        }
    }

    pub fn status(&self, height: BlockHeight) -> ProposalStatus {
        if self.executed {
            return ProposalStatus::Executed;
        }
        if height < self.block_start {
            return ProposalStatus::Pending;
        }
        if self.is_voting_open(height) {
            return ProposalStatus::Active;
        }
        match self.tally().outcome() {
            Outcome::Passed => ProposalStatus::Passed,
            Outcome::Failed => ProposalStatus::Failed,
        }
    }

    /// Blocks left until the window closes, zero once ended.
    pub fn blocks_remaining(&self, height: BlockHeight) -> u64 {
        self.block_end.saturating_sub(height)
    }

    pub(crate) fn record_vote(&mut self, voter: Address, support: bool) -> bool {
        if !self.has_voted.insert(voter) {
            return false;
        }
        if support {
            self.yes_votes += 1;
        } else {
            self.no_votes += 1;
        }
        true
    }
}
