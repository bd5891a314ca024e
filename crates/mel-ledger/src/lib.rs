//! Core escrow logic for the Member Escrow Ledger (MEL).
//!
//! This crate is the heart of MEL. It provides:
//! - [`EscrowState`]: the pure membership/deposit/withdrawal state machine
//! - [`EscrowReader`] / [`EscrowWriter`] trait boundaries
//! - [`InMemoryEscrow`] engine for tests and embedding
//! - [`PayoutSink`]: the seam to the external currency transfer backend
//! - [`LedgerSnapshot`] capture/restore with integrity hashing
//! - [`StateValidator`]: conservation and consistency checks
//!
//! The execution environment is trusted to authenticate caller identity
//! and to invoke operations one at a time; the engine preserves the same
//! all-or-nothing contract when embedded elsewhere.

pub mod error;
pub mod events;
pub mod memory;
pub mod payout;
pub mod state;
pub mod traits;
pub mod validation;

pub use error::EscrowError;
pub use events::LedgerEvent;
pub use memory::InMemoryEscrow;
pub use payout::{PayoutError, PayoutSink, RecordingPayout};
pub use state::{EscrowState, FlowTotals, LedgerSnapshot};
pub use traits::{EscrowReader, EscrowWriter};
pub use validation::{StateValidator, ValidationReport, Violation, ViolationKind};
