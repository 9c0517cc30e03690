//! Proposal queries and submissions

use crate::proposal_handlers::{
    create_proposal, execute_proposal, get_policy, get_proposal, get_tally, list_proposals,
    vote_on_proposal,
};
use crate::ApiState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn proposal_routes() -> Router<ApiState> {
    Router::new()
        .route("/", get(list_proposals))
        .route("/{id}", get(get_proposal))
        .route("/{id}/tally", get(get_tally))
        .route("/policy/{address}", get(get_policy))
        .route("/create", post(create_proposal))
        .route("/vote", post(vote_on_proposal))
        .route("/execute/{id}", post(execute_proposal))
}
