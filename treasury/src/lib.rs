//! Echo Treasury Program
//!
//! Custodian of the community pool:
//! - Accepts deposits from anyone
//! - Releases funds only when called by its owner
//! - Ownership is handed to the governance program during bootstrap
//!
//! Funds leave the treasury only through executed governance proposals.

pub mod call;
pub mod error;
pub mod vault;

pub use call::{release_funds_call, TreasuryCall};
pub use error::{Result, TreasuryError};
pub use vault::Treasury;
