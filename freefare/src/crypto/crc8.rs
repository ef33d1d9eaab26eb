// freefare-rs/freefare/src/crypto/crc8.rs

use crate::constants::{MAD_CRC_INIT, MAD_CRC_POLYNOMIAL};

/// Fold one byte into a running MAD CRC-8 state
/// (x^8 + x^4 + x^3 + x^2 + 1, MSB first).
pub fn crc8_update(state: u8, byte: u8) -> u8 {
    let mut crc = state ^ byte;
    for _ in 0..8 {
        crc = if crc & 0x80 != 0 {
            (crc << 1) ^ MAD_CRC_POLYNOMIAL
        } else {
            crc << 1
        };
    }
    crc
}

/// The MAD CRC has no output XOR.
pub fn crc8_finalize(state: u8) -> u8 {
    state
}

/// Compute the MAD CRC-8 of a byte sequence starting from the MAD initial value.
pub fn crc8<'a>(data: impl IntoIterator<Item = &'a u8>) -> u8 {
    crc8_finalize(
        data.into_iter()
            .fold(MAD_CRC_INIT, |crc, &byte| crc8_update(crc, byte)),
    )
}
