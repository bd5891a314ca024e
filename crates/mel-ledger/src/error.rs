use mel_types::Amount;

use crate::payout::PayoutError;

/// Errors produced by escrow operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EscrowError {
    #[error("caller is not the ledger owner")]
    Unauthorized,

    #[error("caller is not a whitelisted member")]
    NotWhitelisted,

    #[error("insufficient balance: have {balance}, requested {requested}")]
    InsufficientBalance { balance: Amount, requested: Amount },

    #[error("equal-split deposit with no whitelisted members")]
    NoMembers,

    #[error("payout failed: {0}")]
    Payout(#[from] PayoutError),

    #[error("snapshot hash does not match state")]
    SnapshotMismatch,

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("ledger lock poisoned")]
    LockPoisoned,
}

impl EscrowError {
    /// The short, stable reason string surfaced verbatim to callers.
    ///
    /// These strings are a wire contract shared with existing deployments;
    /// `"NOT AUTHORIZED"` and `"whitelisted"` in particular must never
    /// change without a contract version bump.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Unauthorized => "NOT AUTHORIZED",
            Self::NotWhitelisted => "whitelisted",
            Self::InsufficientBalance { .. } => "insufficient balance",
            Self::NoMembers => "no members",
            Self::Payout(_) => "payout failed",
            Self::SnapshotMismatch => "snapshot mismatch",
            Self::Serialization(_) => "serialization error",
            Self::LockPoisoned => "ledger unavailable",
        }
    }
}
