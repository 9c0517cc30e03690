//! Vote tallying
//!
//! One address, one vote. Simple majority with no quorum: a proposal passes
//! when it has strictly more yes than no votes.

use crate::proposal::ProposalId;
use echo_core::Address;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Passed,
    Failed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub yes: u64,
    pub no: u64,
}

impl Tally {
    pub fn total(&self) -> u64 {
        self.yes + self.no
    }

    /// Ties fail.
    pub fn outcome(&self) -> Outcome {
        if self.yes > self.no {
            Outcome::Passed
        } else {
            Outcome::Failed
        }
    }

    pub fn approval_percentage(&self) -> u64 {
        if self.total() == 0 {
            return 0;
        }
        (self.yes * 100) / self.total()
    }
}

/// A recorded ballot, as reported by `VoteCast` events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ballot {
    pub proposal_id: ProposalId,
    pub voter: Address,
    pub support: bool,
}
