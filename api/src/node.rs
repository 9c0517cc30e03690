//! DAO node service
//!
//! Wraps the ledger with the treasury and governance programs deployed and
//! wired together. Bootstrap is deterministic and is not journaled: on every
//! start the node repeats it and then replays the journal on top.

use crate::{ApiError, ApiResult};
use echo_core::codec;
use echo_core::{format_units, Address, Amount, BlockHeight, Ledger, LedgerOp, Receipt, Transaction};
use echo_storage::Journal;
use governance::Governance;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing as log;
use treasury::{Treasury, TreasuryCall};

#[derive(Debug, Clone, Serialize)]
pub struct GenesisConfig {
    pub deployer: Address,
    /// Spendable balance left with the deployer after bootstrap
    pub deployer_balance: Amount,
    /// Moved into the treasury during bootstrap
    pub treasury_deposit: Amount,
    pub voting_period_blocks: u64,
    pub allocations: Vec<(Address, Amount)>,
}

impl GenesisConfig {
    /// SHA-256 over the encoded config, hex encoded. A journal only replays
    /// on top of the genesis with the same fingerprint.
    pub fn fingerprint(&self) -> ApiResult<String> {
        let encoded = codec::encode(self)?;
        Ok(hex::encode(Sha256::digest(&encoded)))
    }
}

pub struct DaoNode {
    ledger: Ledger,
    deployer: Address,
    treasury: Address,
    governance: Address,
    genesis_fingerprint: String,
    journal: Option<Journal>,
}

impl DaoNode {
    /// Deploy the treasury, deploy governance against it, hand the treasury
    /// to governance and fund it.
    pub fn bootstrap(genesis: &GenesisConfig) -> ApiResult<Self> {
        let deployer = genesis.deployer;
        let genesis_fingerprint = genesis.fingerprint()?;
        let mut ledger = Ledger::new();

        ledger.mint(
            deployer,
            genesis.deployer_balance.saturating_add(genesis.treasury_deposit),
        );
        for (address, amount) in &genesis.allocations {
            ledger.mint(*address, *amount);
        }

        let treasury = ledger.deploy(deployer, Treasury::new(deployer));
        let program = Governance::new(treasury, genesis.voting_period_blocks)
            .map_err(|e| ApiError::Internal(format!("Invalid genesis: {}", e)))?;
        let governance = ledger.deploy(deployer, program);

        let handoff = TreasuryCall::TransferOwnership {
            new_owner: governance,
        }
        .encode()?;
        bootstrap_step(ledger.submit(Transaction::new(deployer, treasury, 0, handoff)))?;

        if genesis.treasury_deposit > 0 {
            bootstrap_step(ledger.submit(Transaction::transfer(
                deployer,
                treasury,
                genesis.treasury_deposit,
            )))?;
        }

        log::info!(
            "bootstrapped DAO: treasury {} ({}), governance {}, voting period {} blocks",
            treasury,
            format_units(ledger.balance_of(&treasury)),
            governance,
            genesis.voting_period_blocks
        );

        Ok(Self {
            ledger,
            deployer,
            treasury,
            governance,
            genesis_fingerprint,
            journal: None,
        })
    }

    /// Replay `journal` on top of the bootstrapped state, then journal every
    /// later operation to it. Returns the number of replayed operations.
    ///
    /// Fails without replaying anything if the journal was written against a
    /// different genesis.
    pub fn attach_journal(&mut self, journal: Journal) -> ApiResult<usize> {
        journal.bind_genesis(&self.genesis_fingerprint)?;
        let replayed = echo_storage::replay(&journal, &mut self.ledger)?;
        self.journal = Some(journal);
        Ok(replayed)
    }

    pub fn genesis_fingerprint(&self) -> &str {
        &self.genesis_fingerprint
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn deployer(&self) -> Address {
        self.deployer
    }

    pub fn treasury_address(&self) -> Address {
        self.treasury
    }

    pub fn governance_address(&self) -> Address {
        self.governance
    }

    pub fn treasury(&self) -> ApiResult<&Treasury> {
        self.ledger
            .contract::<Treasury>(&self.treasury)
            .ok_or_else(|| ApiError::Internal("treasury program missing".to_string()))
    }

    pub fn governance(&self) -> ApiResult<&Governance> {
        self.ledger
            .contract::<Governance>(&self.governance)
            .ok_or_else(|| ApiError::Internal("governance program missing".to_string()))
    }

    pub fn block_height(&self) -> BlockHeight {
        self.ledger.block_height()
    }

    /// Journal and apply a transaction. Reverted transactions are still
    /// journaled; they consume a nonce.
    pub fn submit(&mut self, tx: Transaction) -> ApiResult<Receipt> {
        self.record(&LedgerOp::Submit(tx.clone()))?;
        Ok(self.ledger.submit(tx))
    }

    /// Like `submit`, but a revert becomes an error carrying the tx hash.
    pub fn execute(&mut self, tx: Transaction) -> ApiResult<Receipt> {
        let receipt = self.submit(tx)?;
        match receipt.revert() {
            Some(revert) => Err(ApiError::reverted(&receipt, revert)),
            None => Ok(receipt),
        }
    }

    pub fn advance_blocks(&mut self, count: u64) -> ApiResult<BlockHeight> {
        self.record(&LedgerOp::AdvanceBlocks(count))?;
        Ok(self.ledger.advance_blocks(count))
    }

    fn record(&self, op: &LedgerOp) -> ApiResult<()> {
        if let Some(journal) = &self.journal {
            journal.append(op)?;
        }
        Ok(())
    }
}

fn bootstrap_step(receipt: Receipt) -> ApiResult<()> {
    match receipt.revert() {
        Some(revert) => Err(ApiError::Internal(format!(
            "Bootstrap transaction {} reverted: {}",
            receipt.tx_hash, revert
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use echo_core::codec::decode;
    use echo_core::{ErrorKind, UNIT};
    use echo_storage::StorageError;
    use governance::{GovernanceCall, ProposalId};
    use tempfile::tempdir;

    fn genesis() -> GenesisConfig {
        GenesisConfig {
            deployer: Address::from_seed("deployer"),
            deployer_balance: 10 * UNIT,
            treasury_deposit: 5 * UNIT,
            voting_period_blocks: 4,
            allocations: vec![(Address::from_seed("alice"), UNIT)],
        }
    }

    fn propose(node: &mut DaoNode, recipient: Address, amount: Amount) -> ProposalId {
        let call = GovernanceCall::ProposeRelease {
            recipient,
            amount,
            description: "Library roof".to_string(),
        };
        let governance = node.governance_address();
        let receipt = node
            .execute(Transaction::new(
                node.deployer(),
                governance,
                0,
                call.encode().unwrap(),
            ))
            .unwrap();
        decode(&receipt.output).unwrap()
    }

    #[test]
    fn test_bootstrap_hands_treasury_to_governance() {
        let node = DaoNode::bootstrap(&genesis()).unwrap();

        assert_eq!(node.treasury().unwrap().owner(), node.governance_address());
        assert_eq!(node.governance().unwrap().treasury(), node.treasury_address());
        assert_eq!(node.ledger().balance_of(&node.treasury_address()), 5 * UNIT);
        assert_eq!(node.ledger().balance_of(&node.deployer()), 10 * UNIT);
        assert_eq!(node.ledger().balance_of(&Address::from_seed("alice")), UNIT);
    }

    #[test]
    fn test_bootstrap_rejects_zero_voting_period() {
        let mut config = genesis();
        config.voting_period_blocks = 0;
        assert!(DaoNode::bootstrap(&config).is_err());
    }

    #[test]
    fn test_execute_reports_revert() {
        let mut node = DaoNode::bootstrap(&genesis()).unwrap();
        let governance = node.governance_address();
        let call = GovernanceCall::Vote {
            proposal_id: 9,
            support: true,
        };

        let err = node
            .execute(Transaction::new(
                Address::from_seed("alice"),
                governance,
                0,
                call.encode().unwrap(),
            ))
            .unwrap_err();
        match err {
            ApiError::Reverted { kind, tx_hash, .. } => {
                assert_eq!(kind, ErrorKind::UnknownProposal);
                assert!(tx_hash.starts_with("0x"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_restart_replays_journal() {
        let dir = tempdir().unwrap();
        let recipient = Address::from_seed("recipient");

        let (height, recipient_balance, proposals) = {
            let mut node = DaoNode::bootstrap(&genesis()).unwrap();
            node.attach_journal(Journal::open(dir.path()).unwrap()).unwrap();

            let id = propose(&mut node, recipient, UNIT);
            let governance = node.governance_address();
            let vote = GovernanceCall::Vote {
                proposal_id: id,
                support: true,
            };
            node.execute(Transaction::new(
                Address::from_seed("alice"),
                governance,
                0,
                vote.encode().unwrap(),
            ))
            .unwrap();
            node.advance_blocks(5).unwrap();

            let execute = GovernanceCall::ExecuteProposal { proposal_id: id };
            node.execute(Transaction::new(
                node.deployer(),
                governance,
                0,
                execute.encode().unwrap(),
            ))
            .unwrap();

            (
                node.block_height(),
                node.ledger().balance_of(&recipient),
                node.governance().unwrap().proposals().to_vec(),
            )
        };
        assert_eq!(recipient_balance, UNIT);

        let mut restarted = DaoNode::bootstrap(&genesis()).unwrap();
        let replayed = restarted
            .attach_journal(Journal::open(dir.path()).unwrap())
            .unwrap();

        assert_eq!(replayed, 4);
        assert_eq!(restarted.block_height(), height);
        assert_eq!(restarted.ledger().balance_of(&recipient), UNIT);
        assert_eq!(
            restarted.ledger().balance_of(&restarted.treasury_address()),
            4 * UNIT
        );
        assert_eq!(restarted.governance().unwrap().proposals(), proposals.as_slice());
    }

    #[test]
    fn test_restart_with_changed_genesis_is_refused() {
        let dir = tempdir().unwrap();
        {
            let mut node = DaoNode::bootstrap(&genesis()).unwrap();
            node.attach_journal(Journal::open(dir.path()).unwrap()).unwrap();
            propose(&mut node, Address::from_seed("recipient"), UNIT);
            node.advance_blocks(1).unwrap();
            node.advance_blocks(1).unwrap();
            assert_eq!(node.journal.as_ref().unwrap().len(), 2);
        }

        let mut changed = genesis();
        changed.voting_period_blocks = 8;
        let mut restarted = DaoNode::bootstrap(&changed).unwrap();
        let err = restarted
            .attach_journal(Journal::open(dir.path()).unwrap())
            .unwrap_err();
        assert!(matches!(
            err,
            ApiError::Storage(StorageError::GenesisMismatch { .. })
        ));
        assert_eq!(restarted.governance().unwrap().proposal_count(), 0);
        assert_eq!(restarted.block_height(), 0);

        // The original genesis still replays
        let mut node = DaoNode::bootstrap(&genesis()).unwrap();
        assert_eq!(node.attach_journal(Journal::open(dir.path()).unwrap()).unwrap(), 2);
        assert_eq!(node.governance().unwrap().proposal_count(), 1);
        assert_eq!(node.block_height(), 2);
    }
}
