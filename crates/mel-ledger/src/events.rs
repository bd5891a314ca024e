use serde::{Deserialize, Serialize};

use mel_types::{Address, Amount};

/// Audit record appended for every successful state mutation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerEvent {
    MemberWhitelisted {
        member: Address,
    },
    MemberBlacklisted {
        member: Address,
    },
    DepositSplit {
        amount: Amount,
        shares: u64,
    },
    DepositTargeted {
        target: Address,
        amount: Amount,
    },
    Withdrawal {
        member: Address,
        amount: Amount,
    },
}
