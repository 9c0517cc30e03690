//! Ledger endpoints

use crate::chain_handlers::{get_chain_info, get_events, get_transaction};
use crate::ApiState;
use axum::{routing::get, Router};

pub fn chain_routes() -> Router<ApiState> {
    Router::new()
        .route("/info", get(get_chain_info))
        .route("/tx/{hash}", get(get_transaction))
        .route("/events", get(get_events))
}
