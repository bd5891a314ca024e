use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use mel_types::{Address, Amount, MemberStatus};

use crate::error::EscrowError;
use crate::events::LedgerEvent;
use crate::payout::PayoutSink;

/// Running deposit/withdrawal totals backing the conservation check.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowTotals {
    pub received: Amount,
    pub withdrawn: Amount,
}

/// The escrow ledger state machine.
///
/// One exclusively-owned value holds the whole ledger: the fixed owner,
/// per-address membership status, per-address balances, the whitelist
/// roster in admission order, flow totals, and the audit event log.
/// Every mutating operation either fully applies or returns an error
/// with the state untouched.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowState {
    owner: Address,
    statuses: BTreeMap<Address, MemberStatus>,
    balances: BTreeMap<Address, Amount>,
    roster: Vec<Address>,
    totals: FlowTotals,
    events: Vec<LedgerEvent>,
}

impl EscrowState {
    /// Create a ledger owned by `owner`, with every address a non-member
    /// holding a zero balance.
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            statuses: BTreeMap::new(),
            balances: BTreeMap::new(),
            roster: Vec::new(),
            totals: FlowTotals::default(),
            events: Vec::new(),
        }
    }

    // ---- Reads ----

    /// The fixed owner identity.
    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Membership status of `addr`; unseen addresses are `NotMember`.
    pub fn status(&self, addr: Address) -> MemberStatus {
        self.statuses.get(&addr).copied().unwrap_or_default()
    }

    /// Current balance of `addr`; unseen addresses hold zero.
    pub fn balance_of(&self, addr: Address) -> Amount {
        self.balances.get(&addr).copied().unwrap_or(0)
    }

    /// Whitelisted addresses in admission order.
    pub fn roster(&self) -> &[Address] {
        &self.roster
    }

    /// Cumulative value received and withdrawn.
    pub fn totals(&self) -> FlowTotals {
        self.totals
    }

    /// The audit event log, oldest first.
    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }

    /// All balances, for snapshot inspection and validation.
    pub fn balances(&self) -> &BTreeMap<Address, Amount> {
        &self.balances
    }

    /// All explicit status entries, for validation.
    pub fn statuses(&self) -> &BTreeMap<Address, MemberStatus> {
        &self.statuses
    }

    // ---- Owner operations ----

    /// Admit `target` as a member. Owner only. Idempotent for addresses
    /// that are already whitelisted.
    pub fn set_whitelist(&mut self, caller: Address, target: Address) -> Result<(), EscrowError> {
        self.ensure_owner(caller)?;
        if self.status(target).is_whitelisted() {
            return Ok(());
        }
        self.statuses.insert(target, MemberStatus::Whitelisted);
        self.roster.push(target);
        self.events
            .push(LedgerEvent::MemberWhitelisted { member: target });
        debug!(member = %target, roster = self.roster.len(), "whitelisted member");
        Ok(())
    }

    /// Revoke `target`'s membership. Owner only. The balance stays in
    /// place; only withdrawal eligibility is removed.
    pub fn blacklist_member(
        &mut self,
        caller: Address,
        target: Address,
    ) -> Result<(), EscrowError> {
        self.ensure_owner(caller)?;
        let was_member = self.status(target).is_whitelisted();
        self.statuses.insert(target, MemberStatus::NotMember);
        if was_member {
            self.roster.retain(|addr| *addr != target);
            self.events
                .push(LedgerEvent::MemberBlacklisted { member: target });
            debug!(member = %target, roster = self.roster.len(), "blacklisted member");
        }
        Ok(())
    }

    /// Split `amount` evenly across the whitelist roster. Owner only.
    ///
    /// Integer division decides the per-member share; the remainder goes
    /// to the first roster member so the full amount is always credited.
    pub fn deposit_equally(&mut self, caller: Address, amount: Amount) -> Result<(), EscrowError> {
        self.ensure_owner(caller)?;
        if self.roster.is_empty() {
            return Err(EscrowError::NoMembers);
        }

        let shares = self.roster.len() as Amount;
        let share = amount / shares;
        let remainder = amount % shares;

        for (index, member) in self.roster.clone().into_iter().enumerate() {
            let credit = if index == 0 { share + remainder } else { share };
            *self.balances.entry(member).or_insert(0) += credit;
        }
        self.totals.received += amount;
        self.events.push(LedgerEvent::DepositSplit { amount, shares });
        debug!(amount, shares, "split deposit across roster");
        Ok(())
    }

    /// Credit `amount` to `target`. Owner only.
    ///
    /// The target does not need to be whitelisted: membership gates
    /// withdrawal, not receipt.
    pub fn deposit_to_member(
        &mut self,
        caller: Address,
        target: Address,
        amount: Amount,
    ) -> Result<(), EscrowError> {
        self.ensure_owner(caller)?;
        *self.balances.entry(target).or_insert(0) += amount;
        self.totals.received += amount;
        self.events
            .push(LedgerEvent::DepositTargeted { target, amount });
        debug!(target = %target, amount, "targeted deposit");
        Ok(())
    }

    // ---- Member operations ----

    /// Withdraw `amount` of the caller's balance through `payout`.
    ///
    /// The caller must be whitelisted and hold at least `amount`. The
    /// balance decrement commits only if the sink accepts the transfer;
    /// a rejected transfer leaves the ledger untouched.
    pub fn withdraw_funds(
        &mut self,
        caller: Address,
        amount: Amount,
        payout: &mut dyn PayoutSink,
    ) -> Result<(), EscrowError> {
        if !self.status(caller).is_whitelisted() {
            return Err(EscrowError::NotWhitelisted);
        }
        let balance = self.balance_of(caller);
        if amount > balance {
            return Err(EscrowError::InsufficientBalance {
                balance,
                requested: amount,
            });
        }

        payout.transfer(caller, amount)?;

        self.balances.insert(caller, balance - amount);
        self.totals.withdrawn += amount;
        self.events.push(LedgerEvent::Withdrawal {
            member: caller,
            amount,
        });
        debug!(member = %caller, amount, "withdrawal paid out");
        Ok(())
    }

    // ---- Snapshots ----

    /// Capture a verifiable snapshot of the full state.
    pub fn snapshot(&self) -> Result<LedgerSnapshot, EscrowError> {
        Ok(LedgerSnapshot {
            state_hash: hash_state(self)?,
            state: self.clone(),
        })
    }

    fn ensure_owner(&self, caller: Address) -> Result<(), EscrowError> {
        if caller != self.owner {
            return Err(EscrowError::Unauthorized);
        }
        Ok(())
    }
}

/// A serializable copy of the ledger state with an integrity hash over
/// its canonical JSON encoding.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub state: EscrowState,
    pub state_hash: [u8; 32],
}

impl LedgerSnapshot {
    /// Verify the integrity hash against the carried state.
    pub fn verify(&self) -> Result<(), EscrowError> {
        if hash_state(&self.state)? != self.state_hash {
            return Err(EscrowError::SnapshotMismatch);
        }
        Ok(())
    }

    /// Verify and unwrap the carried state.
    pub fn restore(self) -> Result<EscrowState, EscrowError> {
        self.verify()?;
        Ok(self.state)
    }
}

fn hash_state(state: &EscrowState) -> Result<[u8; 32], EscrowError> {
    let encoded =
        serde_json::to_vec(state).map_err(|e| EscrowError::Serialization(e.to_string()))?;
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"mel-snapshot-v1:");
    hasher.update(&encoded);
    Ok(*hasher.finalize().as_bytes())
}
