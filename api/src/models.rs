//! Request and response bodies

use crate::{ApiError, ApiResult};
use echo_core::{format_units, parse_units, Address, Amount, BlockHeight, Event, Receipt, Revert};
use governance::{Ballot, Proposal, ProposalId, ProposalStatus};
use serde::{Deserialize, Serialize};
use treasury::TreasuryCall;

pub fn parse_address(input: &str) -> ApiResult<Address> {
    input
        .trim()
        .parse()
        .map_err(|e| ApiError::InvalidAddress(format!("{}: {}", input, e)))
}

pub fn parse_amount(input: &str) -> ApiResult<Amount> {
    parse_units(input).map_err(|e| ApiError::InvalidAmount(format!("{}: {}", input, e)))
}

/// An amount in base units and in whole units ("0.5").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountView {
    pub base: String,
    pub units: String,
}

impl From<Amount> for AmountView {
    fn from(amount: Amount) -> Self {
        Self {
            base: amount.to_string(),
            units: format_units(amount),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChainInfoResponse {
    pub network: String,
    pub height: BlockHeight,
    pub deployer: Address,
    pub treasury: Address,
    pub governance: Address,
    pub voting_period_blocks: u64,
    pub proposal_count: u64,
    pub uptime_secs: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReceiptResponse {
    pub tx_hash: String,
    pub from: Address,
    pub to: Address,
    pub nonce: u64,
    pub block: BlockHeight,
    pub success: bool,
    pub revert: Option<Revert>,
    /// Hex encoded return data
    pub output: String,
    pub events: Vec<Event>,
}

impl From<&Receipt> for ReceiptResponse {
    fn from(receipt: &Receipt) -> Self {
        Self {
            tx_hash: receipt.tx_hash.to_string(),
            from: receipt.from,
            to: receipt.to,
            nonce: receipt.nonce,
            block: receipt.block,
            success: receipt.is_success(),
            revert: receipt.revert().cloned(),
            output: hex::encode(&receipt.output),
            events: receipt.events.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    /// Only the most recent `limit` events
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReleaseView {
    pub recipient: Address,
    pub amount: AmountView,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProposalResponse {
    pub id: ProposalId,
    pub proposer: Address,
    pub target: Address,
    pub value: AmountView,
    pub description: String,
    pub block_start: BlockHeight,
    pub block_end: BlockHeight,
    pub yes_votes: u64,
    pub no_votes: u64,
    pub executed: bool,
    pub status: ProposalStatus,
    pub blocks_remaining: u64,
    /// Set when the proposal releases treasury funds
    pub release: Option<ReleaseView>,
}

impl ProposalResponse {
    pub fn new(proposal: &Proposal, treasury: Address, height: BlockHeight) -> Self {
        let release = if proposal.target == treasury {
            match TreasuryCall::decode(&proposal.call_data) {
                Ok(TreasuryCall::ReleaseFunds { recipient, amount }) => Some(ReleaseView {
                    recipient,
                    amount: amount.into(),
                }),
                _ => None,
            }
        } else {
            None
        };

        Self {
            id: proposal.id,
            proposer: proposal.proposer,
            target: proposal.target,
            value: proposal.value.into(),
            description: proposal.description.clone(),
            block_start: proposal.block_start,
            block_end: proposal.block_end,
            yes_votes: proposal.yes_votes,
            no_votes: proposal.no_votes,
            executed: proposal.executed,
            status: proposal.status(height),
            blocks_remaining: proposal.blocks_remaining(height),
            release,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TallyResponse {
    pub proposal_id: ProposalId,
    pub yes_votes: u64,
    pub no_votes: u64,
    pub total_votes: u64,
    pub approval_percentage: u64,
    pub status: ProposalStatus,
    pub ballots: Vec<Ballot>,
}

/// Mirrors the on-ledger proposal record, without the payload.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProposalStatusResponse {
    pub proposal_id: ProposalId,
    pub yes_votes: u64,
    pub no_votes: u64,
    pub executed: bool,
    pub block_start: BlockHeight,
    pub block_end: BlockHeight,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TreasuryInfoResponse {
    pub address: Address,
    pub owner: Address,
    pub balance: AmountView,
    pub total_deposited: AmountView,
    pub total_released: AmountView,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TreasuryBalanceResponse {
    pub balance_base: String,
    pub balance_units: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateProposalRequest {
    pub from: String,
    pub description: String,
    pub recipient: String,
    /// Whole units, e.g. "0.5"
    pub amount: String,
    /// Whole units. Required when the proposal is not free.
    pub fee: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateProposalResponse {
    pub tx_hash: String,
    pub proposal_id: ProposalId,
    pub fee_tx_hash: Option<String>,
    pub is_free: bool,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VoteRequest {
    pub from: String,
    pub proposal_id: ProposalId,
    pub support: bool,
}

#[derive(Debug, Deserialize)]
pub struct ExecuteQuery {
    /// Defaults to the deployer account
    pub from: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DepositRequest {
    pub from: String,
    pub amount: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TxResponse {
    pub tx_hash: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use echo_core::UNIT;

    #[test]
    fn test_amount_view() {
        let view = AmountView::from(UNIT / 2);
        assert_eq!(view.base, "500000000000000000");
        assert_eq!(view.units, "0.5");
    }

    #[test]
    fn test_parse_helpers() {
        assert_eq!(parse_amount("1.5").unwrap(), UNIT + UNIT / 2);
        assert!(matches!(parse_amount("-1"), Err(ApiError::InvalidAmount(_))));
        assert!(matches!(parse_address("0x12"), Err(ApiError::InvalidAddress(_))));

        let alice = Address::from_seed("alice");
        assert_eq!(parse_address(&format!(" {} ", alice)).unwrap(), alice);
    }
}
