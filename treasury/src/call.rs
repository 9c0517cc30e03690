//! Treasury call data

use echo_core::codec;
use echo_core::{Address, Amount, Revert};
use serde::{Deserialize, Serialize};

/// Entry points of the treasury program. Empty call data is a deposit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TreasuryCall {
    Deposit,
    ReleaseFunds { recipient: Address, amount: Amount },
    GetBalance,
    TransferOwnership { new_owner: Address },
    Owner,
}

impl TreasuryCall {
    pub fn encode(&self) -> Result<Vec<u8>, Revert> {
        codec::encode(self)
    }

    pub fn decode(input: &[u8]) -> Result<Self, Revert> {
        if input.is_empty() {
            return Ok(TreasuryCall::Deposit);
        }
        codec::decode(input)
    }
}

/// Call data for `release_funds(recipient, amount)`.
pub fn release_funds_call(recipient: Address, amount: Amount) -> Result<Vec<u8>, Revert> {
    TreasuryCall::ReleaseFunds { recipient, amount }.encode()
}
