use mel_types::{Address, Amount, MemberStatus};

use crate::error::EscrowError;
use crate::events::LedgerEvent;
use crate::payout::PayoutSink;
use crate::state::FlowTotals;

/// Read boundary for escrow queries. No caller identity required.
pub trait EscrowReader: Send + Sync {
    fn owner(&self) -> Result<Address, EscrowError>;

    fn status(&self, addr: Address) -> Result<MemberStatus, EscrowError>;

    fn balance_of(&self, addr: Address) -> Result<Amount, EscrowError>;

    fn roster(&self) -> Result<Vec<Address>, EscrowError>;

    fn totals(&self) -> Result<FlowTotals, EscrowError>;

    fn events(&self) -> Result<Vec<LedgerEvent>, EscrowError>;
}

/// Write boundary for escrow mutations. Every call carries the
/// pre-authenticated caller identity supplied by the environment.
pub trait EscrowWriter: Send + Sync {
    fn set_whitelist(&self, caller: Address, target: Address) -> Result<(), EscrowError>;

    fn blacklist_member(&self, caller: Address, target: Address) -> Result<(), EscrowError>;

    fn deposit_equally(&self, caller: Address, amount: Amount) -> Result<(), EscrowError>;

    fn deposit_to_member(
        &self,
        caller: Address,
        target: Address,
        amount: Amount,
    ) -> Result<(), EscrowError>;

    fn withdraw_funds(
        &self,
        caller: Address,
        amount: Amount,
        payout: &mut dyn PayoutSink,
    ) -> Result<(), EscrowError>;
}
