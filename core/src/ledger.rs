//! Ledger runtime
//!
//! Holds native balances, deployed programs and the block height, and applies
//! transactions one at a time. Each call frame checkpoints the world before it
//! runs and restores the checkpoint if it reverts, so a transaction either
//! commits completely or leaves nothing behind but its receipt.

use crate::address::Address;
use crate::amount::{format_units, Amount};
use crate::contract::{Contract, Env};
use crate::error::{ErrorKind, Revert};
use crate::event::{Event, EventRecord};
use crate::transaction::{Receipt, Transaction, TxHash, TxStatus};
use crate::BlockHeight;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Deepest allowed nesting of program-to-program calls.
pub const MAX_CALL_DEPTH: usize = 64;

#[derive(Clone, Default)]
pub(crate) struct World {
    pub(crate) height: BlockHeight,
    pub(crate) balances: BTreeMap<Address, Amount>,
    pub(crate) nonces: BTreeMap<Address, u64>,
    /// Programs not currently executing. An executing program is taken out
    /// of this map for the duration of its frame.
    pub(crate) programs: BTreeMap<Address, Box<dyn Contract>>,
    pub(crate) code: BTreeSet<Address>,
    pub(crate) logs: Vec<(Address, Event)>,
}

impl World {
    pub(crate) fn balance(&self, address: &Address) -> Amount {
        self.balances.get(address).copied().unwrap_or(0)
    }

    fn credit(&mut self, to: Address, amount: Amount) {
        // Supply only enters through mint, so this cannot realistically saturate
        let balance = self.balance(&to).saturating_add(amount);
        self.balances.insert(to, balance);
    }

    pub(crate) fn move_value(&mut self, from: Address, to: Address, amount: Amount) -> Result<(), Revert> {
        if amount == 0 {
            return Ok(());
        }

        let available = self.balance(&from);
        if available < amount {
            return Err(Revert::new(
                ErrorKind::InsufficientBalance,
                format!(
                    "{} holds {} but {} was requested",
                    from,
                    format_units(available),
                    format_units(amount)
                ),
            ));
        }

        self.balances.insert(from, available - amount);
        self.credit(to, amount);
        Ok(())
    }

    fn next_nonce(&mut self, address: Address) -> u64 {
        let nonce = self.nonces.entry(address).or_insert(0);
        let current = *nonce;
        *nonce += 1;
        current
    }
}

/// Run one call frame with checkpoint/rollback semantics.
pub(crate) fn execute_call(
    world: &mut World,
    caller: Address,
    target: Address,
    value: Amount,
    input: &[u8],
    depth: usize,
) -> Result<Vec<u8>, Revert> {
    if depth > MAX_CALL_DEPTH {
        return Err(Revert::new(
            ErrorKind::MaxCallDepth,
            format!("call depth {} exceeds {}", depth, MAX_CALL_DEPTH),
        ));
    }

    let checkpoint = world.clone();
    let result = dispatch(world, caller, target, value, input, depth);

    if let Err(revert) = &result {
        log::debug!("call {} -> {} reverted at depth {}: {}", caller, target, depth, revert);
        *world = checkpoint;
    }

    result
}

fn dispatch(
    world: &mut World,
    caller: Address,
    target: Address,
    value: Amount,
    input: &[u8],
    depth: usize,
) -> Result<Vec<u8>, Revert> {
    world.move_value(caller, target, value)?;

    // Plain accounts just receive the value
    if !world.code.contains(&target) {
        return Ok(Vec::new());
    }

    let mut program = world.programs.remove(&target).ok_or_else(|| {
        Revert::new(
            ErrorKind::Reentrancy,
            format!("program {} is already executing", target),
        )
    })?;

    let result = {
        let mut env = Env {
            world: &mut *world,
            caller,
            address: target,
            value,
            depth,
        };
        program.invoke(&mut env, input)
    };

    world.programs.insert(target, program);
    result
}

/// A state-changing ledger operation, in the form the node journals it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerOp {
    Mint { to: Address, amount: Amount },
    Submit(Transaction),
    AdvanceBlocks(u64),
}

#[derive(Default)]
pub struct Ledger {
    world: World,
    receipts: Vec<Receipt>,
    receipt_index: HashMap<TxHash, usize>,
    events: Vec<EventRecord>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn block_height(&self) -> BlockHeight {
        self.world.height
    }

    /// Close `count` blocks. Returns the new height.
    pub fn advance_blocks(&mut self, count: u64) -> BlockHeight {
        self.world.height = self.world.height.saturating_add(count);
        self.world.height
    }

    /// Create new value out of thin air (genesis allocations, dev faucet).
    pub fn mint(&mut self, to: Address, amount: Amount) {
        self.world.credit(to, amount);
        log::debug!("minted {} to {}", format_units(amount), to);
    }

    pub fn balance_of(&self, address: &Address) -> Amount {
        self.world.balance(address)
    }

    /// Number of transactions and deployments sent from `address` so far.
    pub fn nonce_of(&self, address: &Address) -> u64 {
        self.world.nonces.get(address).copied().unwrap_or(0)
    }

    /// Deploy a program. Its address is derived from the deployer and nonce.
    pub fn deploy<C: Contract>(&mut self, deployer: Address, program: C) -> Address {
        let nonce = self.world.next_nonce(deployer);
        let address = Address::for_deployment(&deployer, nonce);
        log::info!("deployed {} at {} (deployer {})", program.name(), address, deployer);

        self.world.code.insert(address);
        self.world.programs.insert(address, Box::new(program));
        address
    }

    pub fn is_program(&self, address: &Address) -> bool {
        self.world.code.contains(address)
    }

    /// Apply a transaction atomically and record its receipt.
    pub fn submit(&mut self, tx: Transaction) -> Receipt {
        let height = self.world.height;
        let nonce = self.world.next_nonce(tx.from);
        let tx_hash = tx.hash(nonce, height);

        let result = execute_call(&mut self.world, tx.from, tx.to, tx.value, &tx.input, 0);
        let logs = std::mem::take(&mut self.world.logs);

        let (status, output) = match result {
            Ok(output) => (TxStatus::Success, output),
            Err(revert) => {
                log::info!("tx {} from {} reverted: {}", tx_hash, tx.from, revert);
                (TxStatus::Reverted(revert), Vec::new())
            }
        };

        for (emitter, event) in &logs {
            self.events.push(EventRecord {
                emitter: *emitter,
                block: height,
                tx_hash: tx_hash.clone(),
                event: event.clone(),
            });
        }

        let receipt = Receipt {
            tx_hash,
            from: tx.from,
            to: tx.to,
            nonce,
            block: height,
            status,
            output,
            events: logs.into_iter().map(|(_, event)| event).collect(),
        };

        self.receipt_index
            .insert(receipt.tx_hash.clone(), self.receipts.len());
        self.receipts.push(receipt.clone());
        receipt
    }

    /// Run a call against a throwaway copy of the state.
    pub fn call_static(&self, from: Address, to: Address, input: &[u8]) -> Result<Vec<u8>, Revert> {
        let mut world = self.world.clone();
        execute_call(&mut world, from, to, 0, input, 0)
    }

    /// Typed read access to a deployed program.
    pub fn contract<T: Contract>(&self, address: &Address) -> Option<&T> {
        self.world
            .programs
            .get(address)?
            .as_any()
            .downcast_ref::<T>()
    }

    pub fn receipt(&self, hash: &TxHash) -> Option<&Receipt> {
        self.receipt_index.get(hash).map(|&i| &self.receipts[i])
    }

    pub fn receipts(&self) -> &[Receipt] {
        &self.receipts
    }

    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    /// Replay a journaled operation.
    pub fn apply(&mut self, op: LedgerOp) -> Option<Receipt> {
        match op {
            LedgerOp::Mint { to, amount } => {
                self.mint(to, amount);
                None
            }
            LedgerOp::Submit(tx) => Some(self.submit(tx)),
            LedgerOp::AdvanceBlocks(count) => {
                self.advance_blocks(count);
                None
            }
        }
    }
}
