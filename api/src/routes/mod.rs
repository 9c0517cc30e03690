//! API routes organization
//!
//! Each submodule is responsible for its own domain and exports a router function:
//! - `chain` - Ledger height, receipts and the event log
//! - `proposals` - Proposal queries, policy checks and submissions
//! - `funds` - Treasury queries and deposits

mod chain;
mod funds;
mod proposals;

use crate::models::HealthResponse;
use crate::ApiState;
use axum::{routing::get, Json, Router};

/// Create the main router with all API endpoints
pub fn create_routes() -> Router<ApiState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/chain", chain::chain_routes())
        .nest("/proposals", proposals::proposal_routes())
        .nest("/funds", funds::fund_routes())
}

async fn root() -> &'static str {
    "Echo DAO API"
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}
