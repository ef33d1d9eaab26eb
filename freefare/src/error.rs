// freefare-rs/freefare/src/error.rs

use thiserror::Error;

/// Common error type for every tag, device and codec operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The tag is connected when it must not be, or the other way round.
    #[error("wrong tag state: operation requires the tag to be {expected}")]
    WrongState { expected: &'static str },

    /// The operation belongs to another MIFARE family.
    #[error("wrong device type: operation requires a {expected} tag")]
    WrongDeviceType { expected: &'static str },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("corrupt data: {0}")]
    CorruptData(String),

    #[error("device not found")]
    DeviceNotFound,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("operation timed out")]
    Timeout,

    #[error("invalid response length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// The PICC rejected the command with the given status code.
    #[error("card error: status={status:#04x}")]
    Card { status: u8 },

    #[error("authentication failed: card response does not match the challenge")]
    AuthenticationFailed,
}

impl Error {
    /// True when the reader side (PCD) failed rather than the card.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Transport(_) | Error::Timeout | Error::InvalidLength { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
