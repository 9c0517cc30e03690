//! Echo Core Library
//!
//! Ledger primitives and the contract runtime that hosts the treasury and
//! governance programs:
//! - Addresses, amounts and block heights
//! - The revert taxonomy every program reports failures with
//! - The `Contract` trait and the per-call `Env`
//! - The `Ledger`: atomic transactions, receipts, events and static calls

pub mod address;
pub mod amount;
pub mod codec;
pub mod contract;
pub mod error;
pub mod event;
pub mod ledger;
pub mod transaction;

pub use address::{Address, AddressError};
pub use amount::{format_units, parse_units, Amount, AmountError, DECIMALS, UNIT};
pub use contract::{Contract, Env};
pub use error::{ErrorKind, Revert};
pub use event::{Event, EventRecord};
pub use ledger::{Ledger, LedgerOp, MAX_CALL_DEPTH};
pub use transaction::{Receipt, Transaction, TxHash, TxStatus};

/// Ledger block number. Voting windows are expressed in these.
pub type BlockHeight = u64;
