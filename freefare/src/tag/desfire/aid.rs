// freefare-rs/freefare/src/tag/desfire/aid.rs

use crate::mad::MadAid;
use crate::{Error, Result};

/// 3-byte DESFire application identifier, in card (little-endian) order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DesfireAid([u8; 3]);

impl DesfireAid {
    /// The PICC level application.
    pub const PICC: DesfireAid = DesfireAid([0x00; 3]);

    pub const fn new(bytes: [u8; 3]) -> Self {
        Self(bytes)
    }

    /// Low 24 bits of `value`. The high byte is dropped without complaint.
    pub fn from_u32(value: u32) -> Self {
        let b = value.to_le_bytes();
        Self([b[0], b[1], b[2]])
    }

    /// DESFire AID reserved for MAD application `mad_aid`, sub-application `n`.
    ///
    /// Layout: `F` nibble, then function cluster code, application code and
    /// `n`, one nibble each.
    pub fn from_mad_aid(mad_aid: MadAid, n: u8) -> Result<Self> {
        if n & 0xF0 != 0 {
            return Err(Error::InvalidArgument(format!(
                "sub-application index {} does not fit in a nibble",
                n
            )));
        }
        let fcc = mad_aid.function_cluster_code;
        let ac = mad_aid.application_code;
        Ok(Self([
            0xF0 | (fcc >> 4),
            ((fcc & 0x0F) << 4) | (ac >> 4),
            ((ac & 0x0F) << 4) | n,
        ]))
    }

    pub fn as_bytes(&self) -> &[u8; 3] {
        &self.0
    }

    pub fn to_u32(self) -> u32 {
        u32::from_le_bytes([self.0[0], self.0[1], self.0[2], 0])
    }
}

impl From<[u8; 3]> for DesfireAid {
    fn from(bytes: [u8; 3]) -> Self {
        Self(bytes)
    }
}
