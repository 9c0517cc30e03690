//! Revert taxonomy
//!
//! Every failed call aborts with a `Revert`. Programs keep their own detailed
//! error enums and convert into this shared form at the call boundary.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Machine-readable reason a call was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Caller lacks the required role
    Unauthorized,
    AlreadyVoted,
    VotingNotActive,
    VotingNotEnded,
    AlreadyExecuted,
    ProposalNotPassed,
    UnknownProposal,
    InsufficientBalance,
    InvalidOwner,
    /// A forwarded call made during proposal execution failed
    ExecutionReverted,
    InvalidCallData,
    /// A program that is already executing was called again
    Reentrancy,
    MaxCallDepth,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Unauthorized => "Unauthorized",
            ErrorKind::AlreadyVoted => "AlreadyVoted",
            ErrorKind::VotingNotActive => "VotingNotActive",
            ErrorKind::VotingNotEnded => "VotingNotEnded",
            ErrorKind::AlreadyExecuted => "AlreadyExecuted",
            ErrorKind::ProposalNotPassed => "ProposalNotPassed",
            ErrorKind::UnknownProposal => "UnknownProposal",
            ErrorKind::InsufficientBalance => "InsufficientBalance",
            ErrorKind::InvalidOwner => "InvalidOwner",
            ErrorKind::ExecutionReverted => "ExecutionReverted",
            ErrorKind::InvalidCallData => "InvalidCallData",
            ErrorKind::Reentrancy => "Reentrancy",
            ErrorKind::MaxCallDepth => "MaxCallDepth",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rejected call. Any state touched by the call is rolled back.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{message}")]
pub struct Revert {
    pub kind: ErrorKind,
    pub message: String,
    /// The nested revert that caused this one, if any
    pub cause: Option<Box<Revert>>,
}

impl Revert {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            cause: None,
        }
    }

    pub fn with_cause(mut self, cause: Revert) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Innermost revert in the cause chain.
    pub fn root_cause(&self) -> &Revert {
        let mut current = self;
        while let Some(next) = current.cause.as_deref() {
            current = next;
        }
        current
    }
}
