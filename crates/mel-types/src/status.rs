use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Membership status of an address.
///
/// The numeric wire values (0 = not a member, 1 = whitelisted) are part of
/// the observable contract surfaced by the `status` read and must not be
/// renumbered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    #[default]
    NotMember = 0,
    Whitelisted = 1,
}

impl MemberStatus {
    /// The stable wire value.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Parse a wire value.
    pub fn from_u8(value: u8) -> Result<Self, TypeError> {
        match value {
            0 => Ok(Self::NotMember),
            1 => Ok(Self::Whitelisted),
            other => Err(TypeError::UnknownStatus(other)),
        }
    }

    /// Whether this status admits withdrawals.
    pub fn is_whitelisted(self) -> bool {
        matches!(self, Self::Whitelisted)
    }
}

impl fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotMember => write!(f, "not-member"),
            Self::Whitelisted => write!(f, "whitelisted"),
        }
    }
}
