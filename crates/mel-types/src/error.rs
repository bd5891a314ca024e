/// Errors produced while parsing foundation types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeError {
    #[error("invalid hex encoding: {0}")]
    InvalidHex(String),

    #[error("invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("unknown status value: {0}")]
    UnknownStatus(u8),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),
}
