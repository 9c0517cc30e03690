//! Echo Governance Program
//!
//! Runs the proposal lifecycle for the community treasury:
//! - Anyone can create a proposal; its voting window opens at the creation
//!   block and closes `voting_period_blocks` later (inclusive)
//! - One vote per address per proposal, simple majority, no quorum
//! - A passed proposal can be executed exactly once, by anyone, after its
//!   window closes
//!
//! After bootstrap the governance program owns the treasury, so executing a
//! proposal is the only way funds leave it.

pub mod call;
pub mod error;
pub mod governor;
pub mod proposal;
pub mod voting;

pub use call::GovernanceCall;
pub use error::{GovernanceError, Result};
pub use governor::Governance;
pub use proposal::{Proposal, ProposalId, ProposalParams, ProposalStatus};
pub use voting::{Ballot, Outcome, Tally};

/// Governance configuration constants
pub mod config {
    /// Default voting window: 17,280 blocks (one day at 5 second blocks)
    pub const DEFAULT_VOTING_PERIOD_BLOCKS: u64 = 17_280;

    /// Id given to the first proposal
    pub const FIRST_PROPOSAL_ID: u64 = 0;
}
