//! Governance error types

use crate::proposal::ProposalId;
use echo_core::{Address, BlockHeight, ErrorKind, Revert};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GovernanceError {
    #[error("Unknown proposal: {0}")]
    UnknownProposal(ProposalId),

    #[error("Voting not active for proposal {id}: block {current} is outside [{start}, {end}]")]
    VotingNotActive {
        id: ProposalId,
        current: BlockHeight,
        start: BlockHeight,
        end: BlockHeight,
    },

    #[error("Already voted: {voter} on proposal {id}")]
    AlreadyVoted { id: ProposalId, voter: Address },

    #[error("Voting not ended for proposal {id}: block {current}, window closes after {end}")]
    VotingNotEnded {
        id: ProposalId,
        current: BlockHeight,
        end: BlockHeight,
    },

    #[error("Proposal {0} already executed")]
    AlreadyExecuted(ProposalId),

    #[error("Proposal {id} not passed: {yes} yes vs {no} no")]
    ProposalNotPassed { id: ProposalId, yes: u64, no: u64 },

    #[error("Execution of proposal {id} reverted: {cause}")]
    ExecutionReverted { id: ProposalId, cause: Revert },

    #[error("Invalid voting period: must be at least one block")]
    InvalidVotingPeriod,

    #[error("Voting window starting at block {start} would end past the last block height")]
    WindowOverflow { start: BlockHeight },
}

impl From<GovernanceError> for Revert {
    fn from(err: GovernanceError) -> Self {
        let kind = match &err {
            GovernanceError::UnknownProposal(_) => ErrorKind::UnknownProposal,
            GovernanceError::VotingNotActive { .. } => ErrorKind::VotingNotActive,
            GovernanceError::AlreadyVoted { .. } => ErrorKind::AlreadyVoted,
            GovernanceError::VotingNotEnded { .. } => ErrorKind::VotingNotEnded,
            GovernanceError::AlreadyExecuted(_) => ErrorKind::AlreadyExecuted,
            GovernanceError::ProposalNotPassed { .. } => ErrorKind::ProposalNotPassed,
            GovernanceError::ExecutionReverted { cause, .. } => {
                return Revert::new(ErrorKind::ExecutionReverted, err.to_string())
                    .with_cause(cause.clone());
            }
            GovernanceError::InvalidVotingPeriod => ErrorKind::InvalidCallData,
            GovernanceError::WindowOverflow { .. } => ErrorKind::VotingNotActive,
        };
        Revert::new(kind, err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GovernanceError>;
