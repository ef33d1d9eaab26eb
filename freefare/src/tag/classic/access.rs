// freefare-rs/freefare/src/tag/classic/access.rs

//! Access conditions stored in bytes 6..9 of a sector trailer.

use crate::types::{BlockNumber, ClassicBlock, ClassicKey, KeyType};
use crate::{Error, Result};

/// 3-bit access condition of one block group.
///
/// Bit 0 is C1, bit 1 is C2 and bit 2 is C3, so the binary spelling of the
/// constants reads C3 C2 C1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccessBits(u8);

impl AccessBits {
    pub const C000: Self = Self(0b000);
    pub const C001: Self = Self(0b001);
    pub const C010: Self = Self(0b010);
    pub const C011: Self = Self(0b011);
    pub const C100: Self = Self(0b100);
    pub const C101: Self = Self(0b101);
    pub const C110: Self = Self(0b110);
    pub const C111: Self = Self(0b111);

    pub fn new(bits: u8) -> Result<Self> {
        if bits > 0b111 {
            return Err(Error::InvalidArgument(format!(
                "access bits {:#04x} do not fit in 3 bits",
                bits
            )));
        }
        Ok(Self(bits))
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    /// Access bits for a data block, `000` when unspecified.
    pub fn data_block_or_default(ab: Option<AccessBits>) -> AccessBits {
        ab.unwrap_or(AccessBits::C000)
    }

    /// Access bits for the sector trailer, `100` (transport configuration)
    /// when unspecified.
    pub fn trailer_block_or_default(ab: Option<AccessBits>) -> AccessBits {
        ab.unwrap_or(AccessBits::C100)
    }

    fn c1(self) -> u16 {
        u16::from(self.0 & 0x01)
    }

    fn c2(self) -> u16 {
        u16::from((self.0 >> 1) & 0x01)
    }

    fn c3(self) -> u16 {
        u16::from((self.0 >> 2) & 0x01)
    }
}

/// Decoded 12-bit access word of a whole sector: `C1 | C2 << 4 | C3 << 8`,
/// where bit n of each nibble belongs to block group n.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectorAccessBits(u16);

impl SectorAccessBits {
    pub fn from_groups(groups: [AccessBits; 4]) -> Self {
        let word = groups.iter().enumerate().fold(0u16, |w, (n, g)| {
            w | (g.c1() << n) | (g.c2() << (4 + n)) | (g.c3() << (8 + n))
        });
        Self(word)
    }

    /// Decode trailer bytes 6..9, verifying the inverted copy.
    pub fn decode(bytes: &[u8; 3]) -> Result<Self> {
        let c1 = u16::from(bytes[1] >> 4);
        let c2 = u16::from(bytes[2] & 0x0F);
        let c3 = u16::from(bytes[2] >> 4);
        let inv_c1 = u16::from(bytes[0] & 0x0F);
        let inv_c2 = u16::from(bytes[0] >> 4);
        let inv_c3 = u16::from(bytes[1] & 0x0F);

        let word = c1 | (c2 << 4) | (c3 << 8);
        let inverted = inv_c1 | (inv_c2 << 4) | (inv_c3 << 8);
        if word ^ inverted != 0x0FFF {
            return Err(Error::CorruptData(format!(
                "access bits {:02x} {:02x} {:02x} fail the inverted copy check",
                bytes[0], bytes[1], bytes[2]
            )));
        }
        Ok(Self(word))
    }

    pub fn encode(self) -> [u8; 3] {
        let c1 = (self.0 & 0x0F) as u8;
        let c2 = ((self.0 >> 4) & 0x0F) as u8;
        let c3 = ((self.0 >> 8) & 0x0F) as u8;
        [
            ((!c2 & 0x0F) << 4) | (!c1 & 0x0F),
            (c1 << 4) | (!c3 & 0x0F),
            (c3 << 4) | c2,
        ]
    }

    pub fn word(self) -> u16 {
        self.0
    }

    /// Access bits of block group `group` (0..=3).
    pub fn group(self, group: u8) -> AccessBits {
        let n = u16::from(group & 0x03);
        let c1 = (self.0 >> n) & 0x01;
        let c2 = (self.0 >> (4 + n)) & 0x01;
        let c3 = (self.0 >> (8 + n)) & 0x01;
        AccessBits((c1 | (c2 << 1) | (c3 << 2)) as u8)
    }
}

/// Operations guarded by data block access conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataPermission {
    Read,
    Write,
    Increment,
    /// Decrement, transfer and restore share one condition.
    Decrement,
}

/// Operations guarded by sector trailer access conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrailerPermission {
    ReadKeyA,
    WriteKeyA,
    ReadAccessBits,
    WriteAccessBits,
    ReadKeyB,
    WriteKeyB,
}

const A: u8 = 0x01;
const B: u8 = 0x02;
const AB: u8 = A | B;

// Indexed by AccessBits value, columns follow DataPermission.
const DATA_PERMISSIONS: [[u8; 4]; 8] = [
    [AB, AB, AB, AB], // 000
    [AB, B, 0, 0],    // C1
    [AB, 0, 0, 0],    // C2
    [AB, B, B, AB],   // C1 C2
    [AB, 0, 0, AB],   // C3
    [B, 0, 0, 0],     // C1 C3
    [B, B, 0, 0],     // C2 C3
    [0, 0, 0, 0],     // C1 C2 C3
];

// Indexed by AccessBits value, columns follow TrailerPermission.
const TRAILER_PERMISSIONS: [[u8; 6]; 8] = [
    [0, A, A, 0, A, A],  // 000
    [0, B, AB, 0, 0, B], // C1
    [0, 0, A, 0, A, 0],  // C2
    [0, 0, AB, 0, 0, 0], // C1 C2
    [0, A, A, A, A, A],  // C3 (transport configuration)
    [0, 0, AB, B, 0, 0], // C1 C3
    [0, B, AB, B, 0, B], // C2 C3
    [0, 0, AB, 0, 0, 0], // C1 C2 C3
];

fn key_mask(key_type: KeyType) -> u8 {
    match key_type {
        KeyType::KeyA => A,
        KeyType::KeyB => B,
    }
}

pub fn data_block_permits(ab: AccessBits, permission: DataPermission, key_type: KeyType) -> bool {
    DATA_PERMISSIONS[ab.0 as usize][permission as usize] & key_mask(key_type) != 0
}

pub fn trailer_block_permits(
    ab: AccessBits,
    permission: TrailerPermission,
    key_type: KeyType,
) -> bool {
    TRAILER_PERMISSIONS[ab.0 as usize][permission as usize] & key_mask(key_type) != 0
}

/// Build a sector trailer. `None` access bits fall back to the data block
/// and trailer defaults.
pub fn trailer_block(
    key_a: &ClassicKey,
    ab_0: Option<AccessBits>,
    ab_1: Option<AccessBits>,
    ab_2: Option<AccessBits>,
    ab_tb: Option<AccessBits>,
    gpb: u8,
    key_b: &ClassicKey,
) -> ClassicBlock {
    let access = SectorAccessBits::from_groups([
        AccessBits::data_block_or_default(ab_0),
        AccessBits::data_block_or_default(ab_1),
        AccessBits::data_block_or_default(ab_2),
        AccessBits::trailer_block_or_default(ab_tb),
    ]);

    let mut block = [0u8; 16];
    block[..6].copy_from_slice(key_a);
    block[6..9].copy_from_slice(&access.encode());
    block[9] = gpb;
    block[10..].copy_from_slice(key_b);
    block
}

/// Single-entry caches for decoded access bits. `None` means empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct AccessBitsCache {
    pub(crate) sector: Option<(BlockNumber, SectorAccessBits)>,
    pub(crate) block: Option<(BlockNumber, AccessBits)>,
}

impl AccessBitsCache {
    pub(crate) fn sector(&self, trailer: BlockNumber) -> Option<SectorAccessBits> {
        match self.sector {
            Some((cached, bits)) if cached == trailer => Some(bits),
            _ => None,
        }
    }

    pub(crate) fn block(&self, block: BlockNumber) -> Option<AccessBits> {
        match self.block {
            Some((cached, bits)) if cached == block => Some(bits),
            _ => None,
        }
    }

    pub(crate) fn invalidate(&mut self) {
        *self = Self::default();
    }
}
