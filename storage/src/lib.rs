//! Echo Storage Layer
//!
//! The node keeps the ledger in memory and journals every operation it
//! accepts. On startup the ledger is rebuilt by replaying the journal on top
//! of the deterministic bootstrap.

pub mod journal;

pub use journal::{Journal, JournalEntry};

use echo_core::Ledger;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sled::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Corrupt journal entry {0}: {1}")]
    CorruptEntry(u64, String),

    #[error("Journal was written against genesis {journal}, node genesis is {node}")]
    GenesisMismatch { journal: String, node: String },
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Apply every journaled operation to `ledger`, oldest first.
///
/// Returns the number of operations applied. Transactions that reverted when
/// first submitted revert again; their receipts are recorded the same way.
pub fn replay(journal: &Journal, ledger: &mut Ledger) -> Result<usize> {
    let ops = journal.load_all()?;
    let count = ops.len();
    let mut reverted = 0usize;

    for op in ops {
        if let Some(receipt) = ledger.apply(op) {
            if !receipt.is_success() {
                reverted += 1;
            }
        }
    }

    log::info!(
        "replayed {} journaled operations ({} reverted), height now {}",
        count,
        reverted,
        ledger.block_height()
    );
    Ok(count)
}
