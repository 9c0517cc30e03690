//! Block production
//!
//! Closes one block every `block_time`. Proposal windows are measured in
//! blocks, so this is what moves them forward on a running node.

use echo_api::DaoNode;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration};

pub struct BlockProducer {
    node: Arc<RwLock<DaoNode>>,
    block_time: Duration,
}

impl BlockProducer {
    pub fn new(node: Arc<RwLock<DaoNode>>, block_time: Duration) -> Self {
        Self { node, block_time }
    }

    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval(self.block_time);
            ticker.tick().await; // Skip first immediate tick

            loop {
                ticker.tick().await;

                let mut node = self.node.write().await;
                match node.advance_blocks(1) {
                    Ok(height) => tracing::debug!("block #{} closed", height),
                    Err(e) => {
                        tracing::error!("failed to close block: {}", e);
                        break;
                    }
                }
            }
        })
    }
}
