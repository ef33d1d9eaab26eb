// freefare-rs/freefare/src/lib.rs

//! freefare
//!
//! MIFARE Classic, DESFire and Ultralight tag access on top of any reader
//! that can exchange raw ISO14443A frames.

pub mod constants;
pub mod crypto;
pub mod device;
pub mod error;
pub mod mad;
pub mod prelude;
pub mod tag;
pub mod test_support;
pub mod transport;
pub mod types;
pub mod utils;

// Re-export the error and identity types at the crate root so
// `crate::Error` and `crate::Result` resolve everywhere.
pub use crate::error::*;
pub use crate::types::*;

pub use prelude::*;
