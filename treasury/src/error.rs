//! Treasury error types

use echo_core::{Address, Amount, ErrorKind, Revert};
use thiserror::Error;

/// Treasury program errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreasuryError {
    #[error("Unauthorized: {caller} is not the treasury owner ({owner})")]
    Unauthorized { caller: Address, owner: Address },

    #[error("Insufficient treasury balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: Amount, available: Amount },

    #[error("Invalid owner: the null address cannot own the treasury")]
    InvalidOwner,

    #[error("Transfer failed: {0}")]
    TransferFailed(Revert),
}

impl From<TreasuryError> for Revert {
    fn from(err: TreasuryError) -> Self {
        let kind = match &err {
            TreasuryError::Unauthorized { .. } => ErrorKind::Unauthorized,
            TreasuryError::InsufficientBalance { .. } => ErrorKind::InsufficientBalance,
            TreasuryError::InvalidOwner => ErrorKind::InvalidOwner,
            TreasuryError::TransferFailed(inner) => return inner.clone(),
        };
        Revert::new(kind, err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TreasuryError>;
