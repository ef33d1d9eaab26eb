// fixtures.rs: identities and card payloads used across integration tests

use freefare::types::{Atqa, Iso14443aInfo, Uid};

pub fn uid_4() -> Uid {
    Uid::from([0x04, 0x11, 0x22, 0x33])
}

pub fn uid_7() -> Uid {
    Uid::from([0x04, 0x52, 0x6b, 0x1a, 0x31, 0x25, 0x80])
}

pub fn classic_1k_info() -> Iso14443aInfo {
    Iso14443aInfo::new(uid_4(), Atqa::from_bytes([0x00, 0x04]), 0x08)
}

pub fn classic_4k_info() -> Iso14443aInfo {
    Iso14443aInfo::new(uid_4(), Atqa::from_bytes([0x00, 0x02]), 0x18)
}

pub fn ultralight_info() -> Iso14443aInfo {
    Iso14443aInfo::new(uid_7(), Atqa::from_bytes([0x00, 0x44]), 0x00)
}

pub fn desfire_info() -> Iso14443aInfo {
    Iso14443aInfo::new(uid_7(), Atqa::from_bytes([0x03, 0x44]), 0x20)
}

/// A target no supported tag matches (ISO14443-4 smartcard)
pub fn unknown_info() -> Iso14443aInfo {
    Iso14443aInfo::new(uid_4(), Atqa::from_bytes([0x00, 0x04]), 0x28)
}

/// Sector trailer with factory keys and the given access bytes
pub fn trailer(access: [u8; 3]) -> Vec<u8> {
    let mut tb = vec![0xFFu8; 16];
    tb[6..9].copy_from_slice(&access);
    tb[9] = 0x69;
    tb
}

/// Four Ultralight pages starting at `first`, each filled with its number
pub fn ultralight_window(first: u8) -> Vec<u8> {
    (0..4u8)
        .flat_map(|i| [(first + i) % 16; 4])
        .collect()
}
