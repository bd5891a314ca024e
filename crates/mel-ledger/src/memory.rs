use std::sync::RwLock;

use mel_types::{Address, Amount, MemberStatus};

use crate::error::EscrowError;
use crate::events::LedgerEvent;
use crate::payout::PayoutSink;
use crate::state::{EscrowState, FlowTotals, LedgerSnapshot};
use crate::traits::{EscrowReader, EscrowWriter};

/// In-memory escrow engine for tests, local demos, and embedding.
///
/// Wraps the pure [`EscrowState`] in one `RwLock`, so each operation runs
/// as a single critical section. Mutations are staged on a copy of the
/// state and swapped in only on success, which keeps the all-or-nothing
/// contract even if an operation fails halfway through its effects.
pub struct InMemoryEscrow {
    inner: RwLock<EscrowState>,
}

impl InMemoryEscrow {
    pub fn new(owner: Address) -> Self {
        Self {
            inner: RwLock::new(EscrowState::new(owner)),
        }
    }

    /// Rebuild an engine from a snapshot, verifying its integrity hash.
    pub fn from_snapshot(snapshot: LedgerSnapshot) -> Result<Self, EscrowError> {
        Ok(Self {
            inner: RwLock::new(snapshot.restore()?),
        })
    }

    /// Capture a verifiable snapshot of the current state.
    pub fn snapshot(&self) -> Result<LedgerSnapshot, EscrowError> {
        self.with_state(EscrowState::snapshot)?
    }

    /// Run a read-only closure against the current state.
    pub fn with_state<R>(&self, f: impl FnOnce(&EscrowState) -> R) -> Result<R, EscrowError> {
        let state = self.inner.read().map_err(|_| EscrowError::LockPoisoned)?;
        Ok(f(&state))
    }

    fn commit(
        &self,
        op: impl FnOnce(&mut EscrowState) -> Result<(), EscrowError>,
    ) -> Result<(), EscrowError> {
        let mut state = self.inner.write().map_err(|_| EscrowError::LockPoisoned)?;
        let mut staged = state.clone();
        op(&mut staged)?;
        *state = staged;
        Ok(())
    }
}

impl EscrowReader for InMemoryEscrow {
    fn owner(&self) -> Result<Address, EscrowError> {
        self.with_state(EscrowState::owner)
    }

    fn status(&self, addr: Address) -> Result<MemberStatus, EscrowError> {
        self.with_state(|state| state.status(addr))
    }

    fn balance_of(&self, addr: Address) -> Result<Amount, EscrowError> {
        self.with_state(|state| state.balance_of(addr))
    }

    fn roster(&self) -> Result<Vec<Address>, EscrowError> {
        self.with_state(|state| state.roster().to_vec())
    }

    fn totals(&self) -> Result<FlowTotals, EscrowError> {
        self.with_state(EscrowState::totals)
    }

    fn events(&self) -> Result<Vec<LedgerEvent>, EscrowError> {
        self.with_state(|state| state.events().to_vec())
    }
}

impl EscrowWriter for InMemoryEscrow {
    fn set_whitelist(&self, caller: Address, target: Address) -> Result<(), EscrowError> {
        self.commit(|state| state.set_whitelist(caller, target))
    }

    fn blacklist_member(&self, caller: Address, target: Address) -> Result<(), EscrowError> {
        self.commit(|state| state.blacklist_member(caller, target))
    }

    fn deposit_equally(&self, caller: Address, amount: Amount) -> Result<(), EscrowError> {
        self.commit(|state| state.deposit_equally(caller, amount))
    }

    fn deposit_to_member(
        &self,
        caller: Address,
        target: Address,
        amount: Amount,
    ) -> Result<(), EscrowError> {
        self.commit(|state| state.deposit_to_member(caller, target, amount))
    }

    fn withdraw_funds(
        &self,
        caller: Address,
        amount: Amount,
        payout: &mut dyn PayoutSink,
    ) -> Result<(), EscrowError> {
        self.commit(|state| state.withdraw_funds(caller, amount, payout))
    }
}
