//! Treasury custody program
//!
//! Holds the community's pooled value. Anyone can deposit; only the owner can
//! release funds. After bootstrap the owner is the governance program, so
//! every release has to come from an executed proposal.

use crate::call::TreasuryCall;
use crate::error::{Result, TreasuryError};
use echo_core::codec;
use echo_core::{format_units, Address, Amount, Contract, Env, Event, Revert};
use serde::{Deserialize, Serialize};
use std::any::Any;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Treasury {
    owner: Address,
    total_deposited: Amount,
    total_released: Amount,
}

impl Treasury {
    /// Create a treasury owned by `owner` (normally the deployer).
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            total_deposited: 0,
            total_released: 0,
        }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Sum of all value ever received.
    pub fn total_deposited(&self) -> Amount {
        self.total_deposited
    }

    /// Sum of all value ever released.
    pub fn total_released(&self) -> Amount {
        self.total_released
    }

    /// Book the value attached to the current call. Returns the new balance.
    pub fn deposit(&mut self, env: &mut Env<'_>) -> Amount {
        let amount = env.value();
        if amount > 0 {
            self.total_deposited = self.total_deposited.saturating_add(amount);
            env.emit(Event::Deposited {
                from: env.caller(),
                amount,
            });
            log::debug!("treasury received {} from {}", format_units(amount), env.caller());
        }
        env.self_balance()
    }

    /// Send `amount` to `recipient`. Owner only.
    ///
    /// A release back to the treasury itself moves nothing, so it is accepted
    /// without touching `total_released` or emitting `FundsReleased`.
    pub fn release_funds(&mut self, env: &mut Env<'_>, recipient: Address, amount: Amount) -> Result<()> {
        self.only_owner(env)?;

        let available = env.self_balance();
        if amount > available {
            return Err(TreasuryError::InsufficientBalance {
                requested: amount,
                available,
            });
        }

        if recipient == env.address() {
            log::debug!("treasury release of {} to itself ignored", format_units(amount));
            return Ok(());
        }

        env.transfer(recipient, amount)
            .map_err(TreasuryError::TransferFailed)?;
        self.total_released = self.total_released.saturating_add(amount);

        env.emit(Event::FundsReleased { recipient, amount });
        log::info!(
            "treasury released {} to {} ({} left)",
            format_units(amount),
            recipient,
            format_units(env.self_balance())
        );
        Ok(())
    }

    pub fn balance(&self, env: &Env<'_>) -> Amount {
        env.self_balance()
    }

    /// Hand the release right to `new_owner`. Owner only.
    pub fn transfer_ownership(&mut self, env: &mut Env<'_>, new_owner: Address) -> Result<()> {
        self.only_owner(env)?;
        if new_owner.is_zero() {
            return Err(TreasuryError::InvalidOwner);
        }

        let previous_owner = std::mem::replace(&mut self.owner, new_owner);
        env.emit(Event::OwnershipTransferred {
            previous_owner,
            new_owner,
        });
        log::info!("treasury ownership moved from {} to {}", previous_owner, new_owner);
        Ok(())
    }

    fn only_owner(&self, env: &Env<'_>) -> Result<()> {
        if env.caller() != self.owner {
            return Err(TreasuryError::Unauthorized {
                caller: env.caller(),
                owner: self.owner,
            });
        }
        Ok(())
    }
}

impl Contract for Treasury {
    fn name(&self) -> &'static str {
        "treasury"
    }

    fn invoke(&mut self, env: &mut Env<'_>, input: &[u8]) -> std::result::Result<Vec<u8>, Revert> {
        let call = TreasuryCall::decode(input)?;

        // Value attached to any entry point stays in custody
        let balance = self.deposit(env);

        match call {
            TreasuryCall::Deposit => codec::encode(&balance),
            TreasuryCall::ReleaseFunds { recipient, amount } => {
                self.release_funds(env, recipient, amount)?;
                Ok(Vec::new())
            }
            TreasuryCall::GetBalance => codec::encode(&self.balance(env)),
            TreasuryCall::TransferOwnership { new_owner } => {
                self.transfer_ownership(env, new_owner)?;
                Ok(Vec::new())
            }
            TreasuryCall::Owner => codec::encode(&self.owner),
        }
    }

    fn clone_box(&self) -> Box<dyn Contract> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
