// freefare-rs/freefare/src/crypto/mod.rs

pub mod cbc;
pub mod crc8;
pub mod key;

pub use cbc::{Direction, cbc_transform};
pub use crc8::{crc8, crc8_finalize, crc8_update};
pub use key::{DesfireKey, DesfireKeyKind};
