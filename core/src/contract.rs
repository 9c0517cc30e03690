//! Program interface and call environment

use crate::address::Address;
use crate::amount::Amount;
use crate::error::Revert;
use crate::event::Event;
use crate::ledger::{execute_call, World};
use crate::BlockHeight;
use std::any::Any;

/// A program hosted by the ledger.
///
/// `invoke` receives opaque call data and returns opaque return data. A
/// returned `Revert` rolls back every state change made by the call,
/// including changes the program made to itself.
pub trait Contract: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    fn invoke(&mut self, env: &mut Env<'_>, input: &[u8]) -> Result<Vec<u8>, Revert>;

    fn clone_box(&self) -> Box<dyn Contract>;

    fn as_any(&self) -> &dyn Any;
}

impl Clone for Box<dyn Contract> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Context of a single call frame.
pub struct Env<'a> {
    pub(crate) world: &'a mut World,
    pub(crate) caller: Address,
    pub(crate) address: Address,
    pub(crate) value: Amount,
    pub(crate) depth: usize,
}

impl<'a> Env<'a> {
    /// Immediate caller of this frame (account or program).
    pub fn caller(&self) -> Address {
        self.caller
    }

    /// Address of the executing program.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Value attached to this call. Already credited to `address()`.
    pub fn value(&self) -> Amount {
        self.value
    }

    pub fn block_height(&self) -> BlockHeight {
        self.world.height
    }

    pub fn balance_of(&self, address: &Address) -> Amount {
        self.world.balance(address)
    }

    pub fn self_balance(&self) -> Amount {
        self.world.balance(&self.address)
    }

    /// Move value from the executing program to `to`. A program recipient is
    /// invoked with empty call data so it can account for the value; a
    /// program that is already on the call stack just receives it.
    pub fn transfer(&mut self, to: Address, amount: Amount) -> Result<(), Revert> {
        if self.world.programs.contains_key(&to) {
            self.call(to, amount, &[]).map(|_| ())
        } else {
            self.world.move_value(self.address, to, amount)
        }
    }

    pub fn emit(&mut self, event: Event) {
        self.world.logs.push((self.address, event));
    }

    /// Call `target` with `value` and `input` as the executing program.
    ///
    /// A failed sub-call is rolled back on its own; the caller decides whether
    /// to propagate the revert.
    pub fn call(&mut self, target: Address, value: Amount, input: &[u8]) -> Result<Vec<u8>, Revert> {
        execute_call(&mut *self.world, self.address, target, value, input, self.depth + 1)
    }
}
