use std::collections::BTreeSet;

use mel_types::{Amount, MemberStatus};

use crate::events::LedgerEvent;
use crate::state::{EscrowState, LedgerSnapshot};

/// Result of state validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationReport {
    pub conservation_holds: bool,
    pub roster_consistent: bool,
    pub events_consistent: bool,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    /// Returns `true` if all checks passed.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// A specific invariant violation detected during validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    pub kind: ViolationKind,
    pub description: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViolationKind {
    ConservationBreak,
    RosterMismatch,
    EventMismatch,
    HashMismatch,
}

/// Ledger invariant validator.
pub struct StateValidator;

impl StateValidator {
    /// Check every structural invariant of a ledger state: conservation
    /// of funds, roster/status agreement, and event-log accounting.
    pub fn validate(state: &EscrowState) -> ValidationReport {
        let mut violations = Vec::new();

        let conservation_holds = Self::check_conservation(state, &mut violations);
        let roster_consistent = Self::check_roster(state, &mut violations);
        let events_consistent = Self::check_events(state, &mut violations);

        ValidationReport {
            conservation_holds,
            roster_consistent,
            events_consistent,
            violations,
        }
    }

    /// Validate a snapshot: integrity hash first, then the carried state.
    pub fn validate_snapshot(snapshot: &LedgerSnapshot) -> ValidationReport {
        let mut report = Self::validate(&snapshot.state);
        if snapshot.verify().is_err() {
            report.violations.push(Violation {
                kind: ViolationKind::HashMismatch,
                description: "snapshot hash does not match carried state".into(),
            });
        }
        report
    }

    fn check_conservation(state: &EscrowState, violations: &mut Vec<Violation>) -> bool {
        let held: Amount = state.balances().values().sum();
        let totals = state.totals();
        if totals.received.checked_sub(totals.withdrawn) != Some(held) {
            violations.push(Violation {
                kind: ViolationKind::ConservationBreak,
                description: format!(
                    "held balances {held} != received {} - withdrawn {}",
                    totals.received, totals.withdrawn
                ),
            });
            return false;
        }
        true
    }

    fn check_roster(state: &EscrowState, violations: &mut Vec<Violation>) -> bool {
        let mut consistent = true;

        let mut seen = BTreeSet::new();
        for member in state.roster() {
            if !seen.insert(*member) {
                consistent = false;
                violations.push(Violation {
                    kind: ViolationKind::RosterMismatch,
                    description: format!("{member} appears on the roster more than once"),
                });
            }
            if !state.status(*member).is_whitelisted() {
                consistent = false;
                violations.push(Violation {
                    kind: ViolationKind::RosterMismatch,
                    description: format!("{member} is on the roster but not whitelisted"),
                });
            }
        }

        for (addr, status) in state.statuses() {
            if *status == MemberStatus::Whitelisted && !seen.contains(addr) {
                consistent = false;
                violations.push(Violation {
                    kind: ViolationKind::RosterMismatch,
                    description: format!("{addr} is whitelisted but missing from the roster"),
                });
            }
        }

        consistent
    }

    fn check_events(state: &EscrowState, violations: &mut Vec<Violation>) -> bool {
        let mut received: Amount = 0;
        let mut withdrawn: Amount = 0;
        for event in state.events() {
            match event {
                LedgerEvent::DepositSplit { amount, .. } => received += amount,
                LedgerEvent::DepositTargeted { amount, .. } => received += amount,
                LedgerEvent::Withdrawal { amount, .. } => withdrawn += amount,
                LedgerEvent::MemberWhitelisted { .. } | LedgerEvent::MemberBlacklisted { .. } => {}
            }
        }

        let totals = state.totals();
        if received != totals.received || withdrawn != totals.withdrawn {
            violations.push(Violation {
                kind: ViolationKind::EventMismatch,
                description: format!(
                    "event log accounts for {received} in / {withdrawn} out, totals say {} / {}",
                    totals.received, totals.withdrawn
                ),
            });
            return false;
        }
        true
    }
}
