//! Transaction structures and receipts

use crate::address::Address;
use crate::amount::Amount;
use crate::error::{ErrorKind, Revert};
use crate::event::Event;
use crate::BlockHeight;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Transaction identifier, `0x`-prefixed hex of a SHA-256 digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxHash(String);

impl TxHash {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for TxHash {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A state-changing call submitted to the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub from: Address,
    pub to: Address,
    pub value: Amount,
    pub input: Vec<u8>,
}

impl Transaction {
    pub fn new(from: Address, to: Address, value: Amount, input: Vec<u8>) -> Self {
        Self {
            from,
            to,
            value,
            input,
        }
    }

    /// Plain value transfer with no call data.
    pub fn transfer(from: Address, to: Address, value: Amount) -> Self {
        Self::new(from, to, value, Vec::new())
    }

    /// Hash of the transaction as included at `nonce` in block `height`.
    pub fn hash(&self, nonce: u64, height: BlockHeight) -> TxHash {
        let mut hasher = Sha256::new();
        hasher.update(self.from.as_bytes());
        hasher.update(self.to.as_bytes());
        hasher.update(self.value.to_be_bytes());
        hasher.update((self.input.len() as u64).to_be_bytes());
        hasher.update(&self.input);
        hasher.update(nonce.to_be_bytes());
        hasher.update(height.to_be_bytes());
        TxHash(format!("0x{}", hex::encode(hasher.finalize())))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxStatus {
    Success,
    Reverted(Revert),
}

/// Outcome of a submitted transaction. Reverted transactions still get a
/// receipt and consume the sender's nonce, but leave no other trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub tx_hash: TxHash,
    pub from: Address,
    pub to: Address,
    pub nonce: u64,
    pub block: BlockHeight,
    pub status: TxStatus,
    pub output: Vec<u8>,
    pub events: Vec<Event>,
}

impl Receipt {
    pub fn is_success(&self) -> bool {
        matches!(self.status, TxStatus::Success)
    }

    pub fn revert(&self) -> Option<&Revert> {
        match &self.status {
            TxStatus::Success => None,
            TxStatus::Reverted(revert) => Some(revert),
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.revert().map(Revert::kind)
    }

    /// Return data on success, the revert otherwise.
    pub fn into_result(self) -> Result<Vec<u8>, Revert> {
        match self.status {
            TxStatus::Success => Ok(self.output),
            TxStatus::Reverted(revert) => Err(revert),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_depends_on_nonce_and_height() {
        let tx = Transaction::transfer(Address::from_seed("a"), Address::from_seed("b"), 10);

        let h1 = tx.hash(0, 5);
        assert_eq!(h1, tx.hash(0, 5));
        assert_ne!(h1, tx.hash(1, 5));
        assert_ne!(h1, tx.hash(0, 6));
        assert!(h1.as_str().starts_with("0x"));
        assert_eq!(h1.as_str().len(), 66);
    }
}
