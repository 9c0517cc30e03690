//! Treasury API Handlers

use crate::models::{
    parse_address, parse_amount, DepositRequest, ProposalStatusResponse, TreasuryBalanceResponse,
    TreasuryInfoResponse, TxResponse,
};
use crate::{ApiError, ApiResult, ApiState};
use axum::{
    extract::{Path, State},
    Json,
};
use echo_core::{format_units, Transaction};
use governance::ProposalId;
use tracing as log;
use treasury::TreasuryCall;

pub async fn get_treasury_info(State(state): State<ApiState>) -> ApiResult<Json<TreasuryInfoResponse>> {
    let node = state.node.read().await;
    let treasury = node.treasury()?;
    let address = node.treasury_address();

    Ok(Json(TreasuryInfoResponse {
        address,
        owner: treasury.owner(),
        balance: node.ledger().balance_of(&address).into(),
        total_deposited: treasury.total_deposited().into(),
        total_released: treasury.total_released().into(),
    }))
}

pub async fn get_treasury_balance(
    State(state): State<ApiState>,
) -> ApiResult<Json<TreasuryBalanceResponse>> {
    let node = state.node.read().await;
    let balance = node.ledger().balance_of(&node.treasury_address());

    Ok(Json(TreasuryBalanceResponse {
        balance_base: balance.to_string(),
        balance_units: format_units(balance),
    }))
}

pub async fn get_proposal_status(
    State(state): State<ApiState>,
    Path(id): Path<ProposalId>,
) -> ApiResult<Json<ProposalStatusResponse>> {
    let node = state.node.read().await;
    let proposal = node
        .governance()?
        .proposal(id)
        .ok_or(ApiError::ProposalNotFound(id))?;

    Ok(Json(ProposalStatusResponse {
        proposal_id: id,
        yes_votes: proposal.yes_votes,
        no_votes: proposal.no_votes,
        executed: proposal.executed,
        block_start: proposal.block_start,
        block_end: proposal.block_end,
    }))
}

pub async fn deposit(
    State(state): State<ApiState>,
    Json(request): Json<DepositRequest>,
) -> ApiResult<Json<TxResponse>> {
    let from = parse_address(&request.from)?;
    let amount = parse_amount(&request.amount)?;
    if amount == 0 {
        return Err(ApiError::BadRequest(
            "Amount must be greater than 0".to_string(),
        ));
    }

    let mut node = state.node.write().await;
    let treasury = node.treasury_address();
    let receipt = node.execute(Transaction::new(
        from,
        treasury,
        amount,
        TreasuryCall::Deposit.encode()?,
    ))?;

    log::info!("{} deposited {} into the treasury", from, format_units(amount));

    Ok(Json(TxResponse {
        tx_hash: receipt.tx_hash.to_string(),
        message: format!("Deposited {}.", format_units(amount)),
    }))
}
