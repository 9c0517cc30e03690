//! HTTP tests for the DAO API
//!
//! Drives the full router with `oneshot` requests against an in-memory node.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use echo_api::models::{
    ChainInfoResponse, CreateProposalResponse, ProposalResponse, ProposalStatusResponse,
    ReceiptResponse, TallyResponse, TreasuryBalanceResponse, TreasuryInfoResponse, TxResponse,
};
use echo_api::{create_app, ApiState, DaoNode, GenesisConfig, PolicyConfig, ProposalPolicy};
use echo_core::{Address, UNIT};
use governance::ProposalStatus;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;
use tower::ServiceExt;

const PERIOD: u64 = 3;

fn setup() -> (Router, ApiState) {
    let genesis = GenesisConfig {
        deployer: Address::from_seed("deployer"),
        deployer_balance: 10 * UNIT,
        treasury_deposit: 2 * UNIT,
        voting_period_blocks: PERIOD,
        allocations: vec![(Address::from_seed("alice"), UNIT)],
    };
    let node = DaoNode::bootstrap(&genesis).unwrap();
    let state = ApiState::new(
        node,
        ProposalPolicy::new(PolicyConfig::default()),
        "devnet".to_string(),
    );
    (create_app(state.clone()), state)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn get<T: DeserializeOwned>(app: &Router, uri: &str) -> T {
    let request = Request::get(uri).body(Body::empty()).unwrap();
    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::OK, "GET {uri}: {body}");
    serde_json::from_value(body).unwrap()
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

fn addr(seed: &str) -> String {
    Address::from_seed(seed).to_string()
}

async fn create(app: &Router, from: &str, amount: &str, fee: Option<&str>) -> (StatusCode, Value) {
    post(
        app,
        "/proposals/create",
        json!({
            "from": addr(from),
            "description": "Clean water for the east district",
            "recipient": addr("recipient"),
            "amount": amount,
            "fee": fee,
        }),
    )
    .await
}

async fn vote(app: &Router, from: &str, proposal_id: u64, support: bool) -> (StatusCode, Value) {
    post(
        app,
        "/proposals/vote",
        json!({ "from": addr(from), "proposal_id": proposal_id, "support": support }),
    )
    .await
}

#[tokio::test]
async fn test_health_and_chain_info() {
    let (app, _) = setup();

    let (status, body) = send(&app, Request::get("/health").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let info: ChainInfoResponse = get(&app, "/chain/info").await;
    assert_eq!(info.network, "devnet");
    assert_eq!(info.voting_period_blocks, PERIOD);
    assert_eq!(info.proposal_count, 0);
    assert_eq!(info.deployer, Address::from_seed("deployer"));
}

#[tokio::test]
async fn test_treasury_views() {
    let (app, state) = setup();
    let governance = state.node.read().await.governance_address();

    let info: TreasuryInfoResponse = get(&app, "/funds/treasury").await;
    assert_eq!(info.owner, governance);
    assert_eq!(info.balance.units, "2.0");
    assert_eq!(info.total_released.base, "0");

    let balance: TreasuryBalanceResponse = get(&app, "/funds/treasury_balance").await;
    assert_eq!(balance.balance_base, (2 * UNIT).to_string());
    assert_eq!(balance.balance_units, "2.0");
}

#[tokio::test]
async fn test_proposal_lifecycle_over_http() {
    let (app, state) = setup();

    let (status, body) = create(&app, "deployer", "0.5", None).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let created: CreateProposalResponse = serde_json::from_value(body).unwrap();
    assert_eq!(created.proposal_id, 0);
    assert!(created.is_free);
    assert!(created.fee_tx_hash.is_none());

    let (status, _) = vote(&app, "alice", 0, true).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = vote(&app, "alice", 0, false).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "AlreadyVoted");
    assert!(body["tx_hash"].as_str().unwrap().starts_with("0x"));

    let (status, body) = post(&app, "/proposals/execute/0", json!({})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "VotingNotEnded");

    state.node.write().await.advance_blocks(PERIOD + 1).unwrap();

    let proposal: ProposalResponse = get(&app, "/proposals/0").await;
    assert_eq!(proposal.status, ProposalStatus::Passed);
    let release = proposal.release.unwrap();
    assert_eq!(release.recipient, Address::from_seed("recipient"));
    assert_eq!(release.amount.units, "0.5");

    let tally: TallyResponse = get(&app, "/proposals/0/tally").await;
    assert_eq!((tally.yes_votes, tally.no_votes), (1, 0));
    assert_eq!(tally.ballots.len(), 1);
    assert_eq!(tally.ballots[0].voter, Address::from_seed("alice"));

    let (status, body) = post(&app, "/proposals/execute/0", json!({})).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let executed: TxResponse = serde_json::from_value(body).unwrap();

    let receipt: ReceiptResponse = get(&app, &format!("/chain/tx/{}", executed.tx_hash)).await;
    assert!(receipt.success);

    let balance: TreasuryBalanceResponse = get(&app, "/funds/treasury_balance").await;
    assert_eq!(balance.balance_units, "1.5");

    let status: ProposalStatusResponse = get(&app, "/funds/proposal_status/0").await;
    assert!(status.executed);
    assert_eq!(status.block_end, status.block_start + PERIOD);

    let (code, body) = post(&app, "/proposals/execute/0", json!({})).await;
    assert_eq!(code, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "AlreadyExecuted");

    let proposals: Vec<ProposalResponse> = get(&app, "/proposals").await;
    assert_eq!(proposals.len(), 1);
    assert_eq!(proposals[0].status, ProposalStatus::Executed);
}

#[tokio::test]
async fn test_policy_fee_and_daily_cap() {
    let (app, _) = setup();

    let policy: Value = get(&app, &format!("/proposals/policy/{}", addr("deployer"))).await;
    assert_eq!(policy["is_free"], true);

    let (status, _) = create(&app, "deployer", "0.1", None).await;
    assert_eq!(status, StatusCode::OK);

    // Second proposal needs the fee
    let (status, body) = create(&app, "deployer", "0.1", None).await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert_eq!(body["error"], "fee_required");

    let (status, body) = create(&app, "deployer", "0.1", Some("0.01")).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let created: CreateProposalResponse = serde_json::from_value(body).unwrap();
    assert!(created.fee_tx_hash.is_some());

    let info: TreasuryInfoResponse = get(&app, "/funds/treasury").await;
    assert_eq!(info.balance.units, "2.01");

    let (status, _) = create(&app, "deployer", "0.1", Some("0.01")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = create(&app, "deployer", "0.1", Some("0.01")).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "rate_limited");
}

#[tokio::test]
async fn test_concurrent_creates_get_one_free_proposal() {
    let (app, state) = setup();

    // Hold the node so every request is in flight before any is served
    let guard = state.node.read().await;
    let handles: Vec<_> = (0..5)
        .map(|_| {
            let app = app.clone();
            tokio::spawn(async move { create(&app, "alice", "0.1", None).await.0 })
        })
        .collect();
    tokio::time::sleep(Duration::from_millis(50)).await;
    drop(guard);

    let mut statuses = Vec::new();
    for handle in handles {
        statuses.push(handle.await.unwrap());
    }
    let created = statuses.iter().filter(|s| **s == StatusCode::OK).count();
    let refused = statuses
        .iter()
        .filter(|s| **s == StatusCode::PAYMENT_REQUIRED)
        .count();
    assert_eq!((created, refused), (1, 4), "{statuses:?}");

    let node = state.node.read().await;
    assert_eq!(node.governance().unwrap().proposal_count(), 1);
    let decision = state.policy.check(&Address::from_seed("alice"), chrono::Utc::now());
    assert_eq!(decision.total_proposals, 1);
}

#[tokio::test]
async fn test_unpaid_fee_from_empty_account_reverts() {
    let (app, state) = setup();
    // A proposer with no funds gets its free proposal, but cannot pay for the next
    let (status, _) = create(&app, "pauper", "0.1", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = create(&app, "pauper", "0.1", Some("0.01")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "InsufficientBalance");

    let node = state.node.read().await;
    assert_eq!(node.governance().unwrap().proposal_count(), 1);
}

#[tokio::test]
async fn test_deposit_and_bad_input() {
    let (app, _) = setup();

    let (status, body) = post(
        &app,
        "/funds/deposit",
        json!({ "from": addr("alice"), "amount": "0.25" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let info: TreasuryInfoResponse = get(&app, "/funds/treasury").await;
    assert_eq!(info.balance.units, "2.25");
    assert_eq!(info.total_deposited.units, "2.25");

    let (status, body) = post(
        &app,
        "/funds/deposit",
        json!({ "from": "not-an-address", "amount": "1" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_address");

    let (status, body) = create(&app, "alice", "0", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");

    let (status, body) = send(&app, Request::get("/proposals/42").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "proposal_not_found");

    let (status, _) = send(&app, Request::get("/chain/tx/0xdead").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_event_log_limit() {
    let (app, _) = setup();
    create(&app, "deployer", "0.1", None).await;
    vote(&app, "alice", 0, true).await;

    let events: Vec<Value> = get(&app, "/chain/events?limit=1").await;
    assert_eq!(events.len(), 1);
    assert!(events[0]["event"].get("VoteCast").is_some());

    let all: Vec<Value> = get(&app, "/chain/events").await;
    // ownership handoff, bootstrap deposit, proposal, vote
    assert_eq!(all.len(), 4);
}
