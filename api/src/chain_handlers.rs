//! Chain info, receipts and the event log

use crate::models::{ChainInfoResponse, EventsQuery, ReceiptResponse};
use crate::{ApiError, ApiResult, ApiState};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use echo_core::{EventRecord, TxHash};

pub async fn get_chain_info(State(state): State<ApiState>) -> ApiResult<Json<ChainInfoResponse>> {
    let node = state.node.read().await;
    let governance = node.governance()?;

    Ok(Json(ChainInfoResponse {
        network: state.network.clone(),
        height: node.block_height(),
        deployer: node.deployer(),
        treasury: node.treasury_address(),
        governance: node.governance_address(),
        voting_period_blocks: governance.voting_period_blocks(),
        proposal_count: governance.proposal_count(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    }))
}

pub async fn get_transaction(
    State(state): State<ApiState>,
    Path(hash): Path<String>,
) -> ApiResult<Json<ReceiptResponse>> {
    let node = state.node.read().await;
    let receipt = node
        .ledger()
        .receipt(&TxHash::from(hash.clone()))
        .ok_or(ApiError::TransactionNotFound(hash))?;

    Ok(Json(ReceiptResponse::from(receipt)))
}

pub async fn get_events(
    State(state): State<ApiState>,
    Query(query): Query<EventsQuery>,
) -> ApiResult<Json<Vec<EventRecord>>> {
    let node = state.node.read().await;
    let events = node.ledger().events();
    let skip = query
        .limit
        .map(|limit| events.len().saturating_sub(limit))
        .unwrap_or(0);

    Ok(Json(events[skip..].to_vec()))
}
