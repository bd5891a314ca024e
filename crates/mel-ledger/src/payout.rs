use mel_types::{Address, Amount};

/// Errors surfaced by the outbound transfer backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayoutError {
    #[error("transfer rejected: {0}")]
    Rejected(String),
}

/// Outbound transfer seam.
///
/// The ledger records balances; custody of the native currency itself
/// lives behind this trait. A withdrawal commits only if the sink accepts
/// the transfer — a rejection leaves the ledger untouched.
pub trait PayoutSink: Send {
    fn transfer(&mut self, to: Address, amount: Amount) -> Result<(), PayoutError>;
}

/// In-memory payout sink for tests, demos, and embedding.
///
/// Records every accepted transfer and can be armed to reject the next
/// one, which is how rollback behavior is exercised.
#[derive(Debug, Default, Clone)]
pub struct RecordingPayout {
    transfers: Vec<(Address, Amount)>,
    reject_next: Option<String>,
}

impl RecordingPayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the sink to reject the next transfer with the given reason.
    pub fn reject_next(&mut self, reason: impl Into<String>) {
        self.reject_next = Some(reason.into());
    }

    /// Every transfer accepted so far, in order.
    pub fn transfers(&self) -> &[(Address, Amount)] {
        &self.transfers
    }

    /// Total value pushed through the sink.
    pub fn total_paid(&self) -> Amount {
        self.transfers.iter().map(|(_, amount)| amount).sum()
    }
}

impl PayoutSink for RecordingPayout {
    fn transfer(&mut self, to: Address, amount: Amount) -> Result<(), PayoutError> {
        if let Some(reason) = self.reject_next.take() {
            return Err(PayoutError::Rejected(reason));
        }
        self.transfers.push((to, amount));
        Ok(())
    }
}
