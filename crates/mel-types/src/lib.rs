//! Foundation types for the Member Escrow Ledger (MEL).
//!
//! This crate provides:
//! - [`Address`]: opaque, BLAKE3-derived account identities
//! - [`Amount`]: native-currency amounts in smallest units
//! - [`MemberStatus`]: the membership state machine's two states

pub mod address;
pub mod amount;
pub mod error;
pub mod status;

pub use address::{Address, IdentitySource};
pub use amount::{format_coins, parse_coins, Amount, UNIT};
pub use error::TypeError;
pub use status::MemberStatus;
