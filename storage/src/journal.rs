//! Sled-backed journal of ledger operations
//!
//! Every state-changing operation the node accepts is appended here before
//! it is applied. Entries are keyed by a big-endian sequence number, so sled's
//! key order is the order they were accepted in.

use crate::{Result, StorageError};
use chrono::Utc;
use echo_core::LedgerOp;
use serde::{Deserialize, Serialize};
use std::path::Path;

const OPS_TREE: &str = "ops";
const META_TREE: &str = "meta";
const GENESIS_KEY: &[u8] = b"genesis";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub seq: u64,
    /// Unix timestamp of when the node accepted the operation
    pub recorded_at: i64,
    pub op: LedgerOp,
}

#[derive(Debug, Clone)]
pub struct Journal {
    ops: sled::Tree,
    meta: sled::Tree,
    db: sled::Db,
    path: String,
}

impl Journal {
    /// Open or create the journal
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        let db = sled::open(&path)?;
        let ops = db.open_tree(OPS_TREE)?;
        let meta = db.open_tree(META_TREE)?;

        log::info!("journal opened at {} ({} entries)", path_str, ops.len());
        Ok(Journal {
            ops,
            meta,
            db,
            path: path_str,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Tie the journal to the genesis it is written against.
    ///
    /// A fresh journal stores `fingerprint`. A journal that already holds one
    /// only accepts the same value, so operations are never replayed on top
    /// of a different bootstrap.
    pub fn bind_genesis(&self, fingerprint: &str) -> Result<()> {
        match self.genesis()? {
            Some(stored) if stored != fingerprint => Err(StorageError::GenesisMismatch {
                journal: stored,
                node: fingerprint.to_string(),
            }),
            Some(_) => Ok(()),
            None => {
                self.meta.insert(GENESIS_KEY, fingerprint.as_bytes())?;
                self.meta.flush()?;
                Ok(())
            }
        }
    }

    /// Genesis fingerprint the journal was bound to, if any.
    pub fn genesis(&self) -> Result<Option<String>> {
        Ok(self
            .meta
            .get(GENESIS_KEY)?
            .map(|value| String::from_utf8_lossy(&value).into_owned()))
    }

    /// Append an operation and flush it to disk. Returns its sequence number.
    ///
    /// Consecutive `AdvanceBlocks` are folded into the last entry, so an idle
    /// node does not grow the journal by one entry per block.
    pub fn append(&self, op: &LedgerOp) -> Result<u64> {
        if let LedgerOp::AdvanceBlocks(count) = op {
            if let Some(seq) = self.extend_last_advance(*count)? {
                return Ok(seq);
            }
        }

        let seq = self.db.generate_id()?;
        self.write(&JournalEntry {
            seq,
            recorded_at: Utc::now().timestamp(),
            op: op.clone(),
        })?;
        Ok(seq)
    }

    fn extend_last_advance(&self, count: u64) -> Result<Option<u64>> {
        let Some((key, value)) = self.ops.last()? else {
            return Ok(None);
        };
        let mut entry = decode_entry(&key, &value)?;
        let LedgerOp::AdvanceBlocks(previous) = entry.op else {
            return Ok(None);
        };
        let Some(total) = previous.checked_add(count) else {
            return Ok(None);
        };

        entry.op = LedgerOp::AdvanceBlocks(total);
        entry.recorded_at = Utc::now().timestamp();
        self.write(&entry)?;
        Ok(Some(entry.seq))
    }

    fn write(&self, entry: &JournalEntry) -> Result<()> {
        let value = bincode::serialize(entry)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        self.ops.insert(entry.seq.to_be_bytes(), value)?;
        self.ops.flush()?;
        Ok(())
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> Result<Vec<JournalEntry>> {
        let mut entries = Vec::with_capacity(self.ops.len());
        for item in self.ops.iter() {
            let (key, value) = item?;
            entries.push(decode_entry(&key, &value)?);
        }
        Ok(entries)
    }

    /// All operations, oldest first.
    pub fn load_all(&self) -> Result<Vec<LedgerOp>> {
        Ok(self.entries()?.into_iter().map(|entry| entry.op).collect())
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

fn decode_entry(key: &[u8], value: &[u8]) -> Result<JournalEntry> {
    bincode::deserialize(value).map_err(|e| {
        let seq = <[u8; 8]>::try_from(key)
            .map(u64::from_be_bytes)
            .unwrap_or_default();
        StorageError::CorruptEntry(seq, e.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use echo_core::{Address, Transaction, UNIT};
    use tempfile::tempdir;

    #[test]
    fn test_append_and_load_in_order() {
        let dir = tempdir().unwrap();
        let journal = Journal::open(dir.path()).unwrap();
        assert!(journal.is_empty());

        let alice = Address::from_seed("alice");
        let bob = Address::from_seed("bob");
        let ops = vec![
            LedgerOp::Mint {
                to: alice,
                amount: UNIT,
            },
            LedgerOp::AdvanceBlocks(3),
            LedgerOp::Submit(Transaction::transfer(alice, bob, UNIT / 2)),
        ];

        let mut last = None;
        for op in &ops {
            let seq = journal.append(op).unwrap();
            if let Some(prev) = last {
                assert!(seq > prev);
            }
            last = Some(seq);
        }

        assert_eq!(journal.len(), 3);
        assert_eq!(journal.load_all().unwrap(), ops);
    }

    #[test]
    fn test_survives_reopen() {
        let dir = tempdir().unwrap();
        let op = LedgerOp::AdvanceBlocks(7);
        {
            let journal = Journal::open(dir.path()).unwrap();
            journal.append(&op).unwrap();
        }

        let journal = Journal::open(dir.path()).unwrap();
        assert_eq!(journal.load_all().unwrap(), vec![op]);
        assert!(journal.entries().unwrap()[0].recorded_at > 0);
    }

    #[test]
    fn test_consecutive_advances_are_folded() {
        let dir = tempdir().unwrap();
        let journal = Journal::open(dir.path()).unwrap();
        let alice = Address::from_seed("alice");

        for _ in 0..3 {
            journal.append(&LedgerOp::AdvanceBlocks(1)).unwrap();
        }
        assert_eq!(journal.len(), 1);

        let transfer = LedgerOp::Submit(Transaction::transfer(alice, alice, 1));
        journal.append(&transfer).unwrap();
        journal.append(&LedgerOp::AdvanceBlocks(2)).unwrap();
        journal.append(&LedgerOp::AdvanceBlocks(4)).unwrap();

        assert_eq!(
            journal.load_all().unwrap(),
            vec![
                LedgerOp::AdvanceBlocks(3),
                transfer,
                LedgerOp::AdvanceBlocks(6)
            ]
        );
    }

    #[test]
    fn test_genesis_binding() {
        let dir = tempdir().unwrap();
        {
            let journal = Journal::open(dir.path()).unwrap();
            assert_eq!(journal.genesis().unwrap(), None);
            journal.bind_genesis("abc").unwrap();
            journal.bind_genesis("abc").unwrap();
        }

        let journal = Journal::open(dir.path()).unwrap();
        assert_eq!(journal.genesis().unwrap().as_deref(), Some("abc"));
        match journal.bind_genesis("def") {
            Err(StorageError::GenesisMismatch { journal, node }) => {
                assert_eq!(journal, "abc");
                assert_eq!(node, "def");
            }
            other => panic!("expected genesis mismatch, got {:?}", other),
        }
    }
}
