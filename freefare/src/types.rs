// freefare-rs/freefare/src/types.rs

use crate::Error;
use std::convert::TryFrom;

/// ISO14443A UID - Newtype Pattern (4, 7 or 10 bytes)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Uid(Vec<u8>);

impl Uid {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_hex(&self) -> String {
        crate::utils::bytes_to_hex(self.as_bytes())
    }
}

impl TryFrom<&[u8]> for Uid {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        match bytes.len() {
            4 | 7 | 10 => Ok(Self(bytes.to_vec())),
            actual => Err(Error::InvalidArgument(format!(
                "UID must be 4, 7 or 10 bytes, got {}",
                actual
            ))),
        }
    }
}

impl From<[u8; 4]> for Uid {
    fn from(bytes: [u8; 4]) -> Self {
        Self(bytes.to_vec())
    }
}

impl From<[u8; 7]> for Uid {
    fn from(bytes: [u8; 7]) -> Self {
        Self(bytes.to_vec())
    }
}

/// ATQA (2 バイト, as transmitted)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Atqa([u8; 2]);

impl Atqa {
    pub const fn from_bytes(bytes: [u8; 2]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 2] {
        &self.0
    }
}

/// Identity reported by the reader for an ISO14443A target at discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Iso14443aInfo {
    pub uid: Uid,
    pub atqa: Atqa,
    pub sak: u8,
}

impl Iso14443aInfo {
    pub fn new(uid: Uid, atqa: Atqa, sak: u8) -> Self {
        Self { uid, atqa, sak }
    }
}

/// MIFARE Classic key type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum KeyType {
    KeyA,
    KeyB,
}

impl KeyType {
    /// Authentication command code for this key type.
    pub fn auth_command(self) -> u8 {
        match self {
            KeyType::KeyA => crate::constants::CLASSIC_CMD_AUTH_A,
            KeyType::KeyB => crate::constants::CLASSIC_CMD_AUTH_B,
        }
    }
}

/// MIFARE Classic block number (0..=255)
pub type BlockNumber = u8;

/// MIFARE Classic sector number (0..=39)
pub type SectorNumber = u8;

/// MIFARE Classic 6 バイト key
pub type ClassicKey = [u8; 6];

/// MIFARE Classic 16 バイト block
pub type ClassicBlock = [u8; 16];

/// MIFARE Ultralight 4 バイト page
pub type UltralightPage = [u8; 4];
