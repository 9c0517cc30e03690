//! API handlers for governance proposals

use crate::models::{
    parse_address, parse_amount, CreateProposalRequest, CreateProposalResponse, ExecuteQuery,
    ProposalResponse, TallyResponse, TxResponse, VoteRequest,
};
use crate::policy::PolicyDecision;
use crate::{ApiError, ApiResult, ApiState};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use echo_core::codec;
use echo_core::{format_units, Event, Transaction};
use governance::{Ballot, GovernanceCall, ProposalId};
use tracing as log;
use treasury::TreasuryCall;

/// All proposals, oldest first, with derived status
pub async fn list_proposals(State(state): State<ApiState>) -> ApiResult<Json<Vec<ProposalResponse>>> {
    let node = state.node.read().await;
    let governance = node.governance()?;
    let height = node.block_height();
    let treasury = node.treasury_address();

    let proposals = governance
        .proposals()
        .iter()
        .map(|p| ProposalResponse::new(p, treasury, height))
        .collect();

    Ok(Json(proposals))
}

pub async fn get_proposal(
    State(state): State<ApiState>,
    Path(id): Path<ProposalId>,
) -> ApiResult<Json<ProposalResponse>> {
    let node = state.node.read().await;
    let proposal = node
        .governance()?
        .proposal(id)
        .ok_or(ApiError::ProposalNotFound(id))?;

    Ok(Json(ProposalResponse::new(
        proposal,
        node.treasury_address(),
        node.block_height(),
    )))
}

/// Vote counts plus the individual ballots, recovered from `VoteCast` events
pub async fn get_tally(
    State(state): State<ApiState>,
    Path(id): Path<ProposalId>,
) -> ApiResult<Json<TallyResponse>> {
    let node = state.node.read().await;
    let proposal = node
        .governance()?
        .proposal(id)
        .ok_or(ApiError::ProposalNotFound(id))?;
    let governance = node.governance_address();
    let tally = proposal.tally();

    let ballots = node
        .ledger()
        .events()
        .iter()
        .filter(|record| record.emitter == governance)
        .filter_map(|record| match &record.event {
            Event::VoteCast {
                proposal_id,
                voter,
                support,
            } if *proposal_id == id => Some(Ballot {
                proposal_id: id,
                voter: *voter,
                support: *support,
            }),
            _ => None,
        })
        .collect();

    Ok(Json(TallyResponse {
        proposal_id: id,
        yes_votes: tally.yes,
        no_votes: tally.no,
        total_votes: tally.total(),
        approval_percentage: tally.approval_percentage(),
        status: proposal.status(node.block_height()),
        ballots,
    }))
}

pub async fn get_policy(
    State(state): State<ApiState>,
    Path(address): Path<String>,
) -> ApiResult<Json<PolicyDecision>> {
    let address = parse_address(&address)?;
    Ok(Json(state.policy.check(&address, Utc::now())))
}

/// Create a treasury release proposal
///
/// The policy is checked first. A fee, when owed, is deposited into the
/// treasury by the proposer before the proposal is submitted. The node write
/// lock is held from the policy check until the creation is recorded, so
/// concurrent requests from one proposer are decided one at a time.
pub async fn create_proposal(
    State(state): State<ApiState>,
    Json(request): Json<CreateProposalRequest>,
) -> ApiResult<Json<CreateProposalResponse>> {
    let from = parse_address(&request.from)?;
    let recipient = parse_address(&request.recipient)?;
    let amount = parse_amount(&request.amount)?;

    if amount == 0 {
        return Err(ApiError::BadRequest(
            "Amount must be greater than 0".to_string(),
        ));
    }
    if request.description.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Description cannot be empty".to_string(),
        ));
    }

    let mut node = state.node.write().await;
    let now = Utc::now();
    let decision = state.policy.check(&from, now);
    if !decision.can_create {
        return Err(ApiError::RateLimited(decision.message));
    }

    let fee_due = decision.fee_due(state.policy.config());
    let fee = match request.fee.as_deref() {
        Some(fee) => parse_amount(fee)?,
        None => 0,
    };
    if fee < fee_due {
        return Err(ApiError::FeeRequired {
            min_fee: format_units(fee_due),
        });
    }

    let treasury = node.treasury_address();
    let governance = node.governance_address();

    let fee_tx_hash = if fee > 0 {
        let deposit = TreasuryCall::Deposit.encode()?;
        let receipt = node.execute(Transaction::new(from, treasury, fee, deposit))?;
        Some(receipt.tx_hash.to_string())
    } else {
        None
    };

    let call = GovernanceCall::ProposeRelease {
        recipient,
        amount,
        description: request.description,
    };
    let receipt = node.execute(Transaction::new(from, governance, 0, call.encode()?))?;
    let proposal_id: ProposalId = codec::decode(&receipt.output)?;
    state.policy.record(from, now);
    drop(node);

    log::info!(
        "proposal {} created by {} (release {} to {}, fee {})",
        proposal_id,
        from,
        format_units(amount),
        recipient,
        format_units(fee)
    );

    Ok(Json(CreateProposalResponse {
        tx_hash: receipt.tx_hash.to_string(),
        proposal_id,
        fee_tx_hash,
        is_free: decision.is_free,
        message: "Proposal submitted successfully.".to_string(),
    }))
}

pub async fn vote_on_proposal(
    State(state): State<ApiState>,
    Json(request): Json<VoteRequest>,
) -> ApiResult<Json<TxResponse>> {
    let from = parse_address(&request.from)?;
    let call = GovernanceCall::Vote {
        proposal_id: request.proposal_id,
        support: request.support,
    };

    let mut node = state.node.write().await;
    let governance = node.governance_address();
    let receipt = node.execute(Transaction::new(from, governance, 0, call.encode()?))?;

    log::info!(
        "{} voted {} on proposal {}",
        from,
        if request.support { "yes" } else { "no" },
        request.proposal_id
    );

    Ok(Json(TxResponse {
        tx_hash: receipt.tx_hash.to_string(),
        message: "Vote submitted successfully.".to_string(),
    }))
}

/// Execute a passed proposal. Anyone may trigger execution.
pub async fn execute_proposal(
    State(state): State<ApiState>,
    Path(id): Path<ProposalId>,
    Query(query): Query<ExecuteQuery>,
) -> ApiResult<Json<TxResponse>> {
    let mut node = state.node.write().await;
    let from = match query.from.as_deref() {
        Some(from) => parse_address(from)?,
        None => node.deployer(),
    };
    let governance = node.governance_address();
    let call = GovernanceCall::ExecuteProposal { proposal_id: id };
    let receipt = node.execute(Transaction::new(from, governance, 0, call.encode()?))?;

    log::info!("proposal {} executed by {} in {}", id, from, receipt.tx_hash);

    Ok(Json(TxResponse {
        tx_hash: receipt.tx_hash.to_string(),
        message: "Proposal executed.".to_string(),
    }))
}
