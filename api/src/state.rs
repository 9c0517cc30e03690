//! API State Management

use crate::node::DaoNode;
use crate::policy::ProposalPolicy;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct ApiState {
    pub node: Arc<RwLock<DaoNode>>,
    pub policy: Arc<ProposalPolicy>,
    pub start_time: std::time::Instant,
    pub network: String,
}

impl ApiState {
    /// Proposals already on the ledger (from journal replay) count toward
    /// their proposers' totals in the policy.
    pub fn new(node: DaoNode, policy: ProposalPolicy, network: String) -> Self {
        if let Ok(governance) = node.governance() {
            for proposal in governance.proposals() {
                policy.restore(proposal.proposer);
            }
        }

        Self {
            node: Arc::new(RwLock::new(node)),
            policy: Arc::new(policy),
            start_time: std::time::Instant::now(),
            network,
        }
    }
}
