//! Echo node and command-line client support
//!
//! - `config` - TOML node configuration
//! - `block_producer` - advances the ledger height on a timer
//! - `client` - HTTP client used by `echo-cli`

pub mod block_producer;
pub mod client;
pub mod config;

pub use block_producer::BlockProducer;
pub use client::ApiClient;
pub use config::{ConfigError, NodeConfig};
