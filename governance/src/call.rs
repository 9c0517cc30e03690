//! Governance call data

use crate::proposal::ProposalId;
use echo_core::codec;
use echo_core::{Address, Amount, Revert};
use serde::{Deserialize, Serialize};

/// Entry points of the governance program.
///
/// Empty call data is a plain value receipt, which is how released treasury
/// funds addressed to governance itself arrive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GovernanceCall {
    Receive,
    CreateProposal {
        target: Address,
        value: Amount,
        call_data: Vec<u8>,
        description: String,
    },
    /// Shorthand for a proposal that calls `release_funds` on the treasury.
    ProposeRelease {
        recipient: Address,
        amount: Amount,
        description: String,
    },
    Vote {
        proposal_id: ProposalId,
        support: bool,
    },
    ExecuteProposal {
        proposal_id: ProposalId,
    },
    GetProposal {
        proposal_id: ProposalId,
    },
    ProposalCount,
    Treasury,
    VotingPeriodBlocks,
}

impl GovernanceCall {
    pub fn encode(&self) -> Result<Vec<u8>, Revert> {
        codec::encode(self)
    }

    pub fn decode(input: &[u8]) -> Result<Self, Revert> {
        if input.is_empty() {
            return Ok(GovernanceCall::Receive);
        }
        codec::decode(input)
    }
}
