//! Events emitted by programs and recorded in the ledger's log

use crate::address::Address;
use crate::amount::Amount;
use crate::transaction::TxHash;
use crate::BlockHeight;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    Deposited {
        from: Address,
        amount: Amount,
    },
    FundsReleased {
        recipient: Address,
        amount: Amount,
    },
    OwnershipTransferred {
        previous_owner: Address,
        new_owner: Address,
    },
    ProposalCreated {
        id: u64,
        proposer: Address,
        target: Address,
        value: Amount,
        description: String,
    },
    VoteCast {
        proposal_id: u64,
        voter: Address,
        support: bool,
    },
    ProposalExecuted {
        proposal_id: u64,
        success: bool,
        return_data: Vec<u8>,
    },
}

/// A committed event with its position in the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub emitter: Address,
    pub block: BlockHeight,
    pub tx_hash: TxHash,
    pub event: Event,
}
