//! Echo DAO HTTP API
//!
//! Read-only projections of the treasury and proposal registry, plus a
//! submission surface that turns requests into ledger transactions and reports
//! the transaction hash or the revert.

mod chain_handlers;
mod error;
mod fund_handlers;
pub mod models;
pub mod node;
pub mod policy;
mod proposal_handlers;
mod routes;
mod state;

pub use error::{ApiError, ApiResult};
pub use node::{DaoNode, GenesisConfig};
pub use policy::{PolicyConfig, PolicyDecision, ProposalPolicy};
pub use state::ApiState;

use axum::http::{header::CONTENT_TYPE, Method};
use axum::Router;
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// The full application router with CORS and request tracing.
pub fn create_app(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    routes::create_routes()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

pub async fn start_server(addr: SocketAddr, state: ApiState) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("API listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
