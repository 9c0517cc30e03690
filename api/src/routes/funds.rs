//! Treasury endpoints

use crate::fund_handlers::{deposit, get_proposal_status, get_treasury_balance, get_treasury_info};
use crate::ApiState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn fund_routes() -> Router<ApiState> {
    Router::new()
        .route("/treasury", get(get_treasury_info))
        .route("/treasury_balance", get(get_treasury_balance))
        .route("/proposal_status/{id}", get(get_proposal_status))
        .route("/deposit", post(deposit))
}
