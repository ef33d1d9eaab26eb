// freefare-rs/freefare/src/tag/classic/sector.rs

//! Sector / block arithmetic.
//!
//! - Blocks 0-127 -> sectors 0-31 (4 blocks per sector)
//! - Blocks 128-255 -> sectors 32-39 (16 blocks per sector)

use crate::constants::{CLASSIC_FOUR_BLOCK_SECTORS, CLASSIC_SIXTEEN_BLOCK_BOUNDARY};
use crate::types::{BlockNumber, SectorNumber};

fn in_four_block_sector(block: BlockNumber) -> bool {
    block < CLASSIC_SIXTEEN_BLOCK_BOUNDARY
}

/// First block of the sector containing `block`.
pub fn first_sector_block(block: BlockNumber) -> BlockNumber {
    if in_four_block_sector(block) {
        block & !0x03
    } else {
        block & !0x0F
    }
}

/// Last block (the sector trailer) of the sector containing `block`.
pub fn last_sector_block(block: BlockNumber) -> BlockNumber {
    if in_four_block_sector(block) {
        block | 0x03
    } else {
        block | 0x0F
    }
}

pub fn is_trailer_block(block: BlockNumber) -> bool {
    block == last_sector_block(block)
}

pub fn block_sector(block: BlockNumber) -> SectorNumber {
    if in_four_block_sector(block) {
        block / 4
    } else {
        CLASSIC_FOUR_BLOCK_SECTORS + (block - CLASSIC_SIXTEEN_BLOCK_BOUNDARY) / 16
    }
}

/// First block of `sector`. Sectors past 39 do not exist.
pub fn sector_first_block(sector: SectorNumber) -> Option<BlockNumber> {
    match sector {
        0..=31 => Some(sector * 4),
        32..=39 => Some(CLASSIC_SIXTEEN_BLOCK_BOUNDARY + (sector - CLASSIC_FOUR_BLOCK_SECTORS) * 16),
        _ => None,
    }
}

pub fn sector_block_count(sector: SectorNumber) -> Option<u8> {
    match sector {
        0..=31 => Some(4),
        32..=39 => Some(16),
        _ => None,
    }
}

pub fn sector_trailer_block(sector: SectorNumber) -> Option<BlockNumber> {
    sector_first_block(sector).map(last_sector_block)
}

/// Index (0..=3) of the access-bit group controlling `block`.
///
/// In a 16 block sector, data blocks share access bits five at a time.
pub fn access_group(block: BlockNumber) -> u8 {
    if in_four_block_sector(block) {
        block & 0x03
    } else {
        (block & 0x0F) / 5
    }
}
