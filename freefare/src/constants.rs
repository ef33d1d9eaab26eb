// freefare-rs/freefare/src/constants.rs
//! Card-level command codes and layout constants shared across the crate

/// MIFARE Classic authenticate with key A / key B
pub const CLASSIC_CMD_AUTH_A: u8 = 0x60;
pub const CLASSIC_CMD_AUTH_B: u8 = 0x61;

/// MIFARE Classic read / write (16 byte block)
pub const CLASSIC_CMD_READ: u8 = 0x30;
pub const CLASSIC_CMD_WRITE: u8 = 0xA0;

/// MIFARE Classic value block commands
pub const CLASSIC_CMD_DECREMENT: u8 = 0xC0;
pub const CLASSIC_CMD_INCREMENT: u8 = 0xC1;
pub const CLASSIC_CMD_RESTORE: u8 = 0xC2;
pub const CLASSIC_CMD_TRANSFER: u8 = 0xB0;

/// Blocks 0..128 belong to the 32 four-block sectors, the rest to sixteen-block sectors.
pub const CLASSIC_FOUR_BLOCK_SECTORS: u8 = 32;
pub const CLASSIC_SIXTEEN_BLOCK_BOUNDARY: u8 = 128;

/// Factory key for both key A and key B
pub const CLASSIC_DEFAULT_KEY: [u8; 6] = [0xFF; 6];

/// MIFARE Ultralight read (returns 4 pages) / write (1 page)
pub const ULTRALIGHT_CMD_READ: u8 = 0x30;
pub const ULTRALIGHT_CMD_WRITE: u8 = 0xA2;

pub const ULTRALIGHT_PAGE_COUNT: usize = 16;
pub const ULTRALIGHT_PAGES_PER_READ: usize = 4;

/// DESFire native command codes
pub const DESFIRE_CMD_AUTHENTICATE: u8 = 0x0A;
pub const DESFIRE_CMD_GET_KEY_SETTINGS: u8 = 0x45;
pub const DESFIRE_CMD_GET_KEY_VERSION: u8 = 0x64;
pub const DESFIRE_CMD_CREATE_APPLICATION: u8 = 0xCA;
pub const DESFIRE_CMD_DELETE_APPLICATION: u8 = 0xDA;
pub const DESFIRE_CMD_GET_APPLICATION_IDS: u8 = 0x6A;
pub const DESFIRE_CMD_SELECT_APPLICATION: u8 = 0x5A;
pub const DESFIRE_CMD_FORMAT_PICC: u8 = 0xFC;
pub const DESFIRE_CMD_GET_VERSION: u8 = 0x60;
pub const DESFIRE_CMD_GET_FILE_IDS: u8 = 0x6F;
pub const DESFIRE_CMD_READ_DATA: u8 = 0xBD;
pub const DESFIRE_CMD_WRITE_DATA: u8 = 0x3D;
pub const DESFIRE_CMD_GET_VALUE: u8 = 0x6C;
pub const DESFIRE_CMD_ADDITIONAL_FRAME: u8 = 0xAF;

/// DESFire PICC status codes
pub const DESFIRE_STATUS_OK: u8 = 0x00;
pub const DESFIRE_STATUS_ADDITIONAL_FRAME: u8 = 0xAF;

/// Largest data payload carried by the first / continuation frame of a write
pub const DESFIRE_WRITE_FIRST_CHUNK: usize = 52;
pub const DESFIRE_WRITE_NEXT_CHUNK: usize = 59;

/// MAD sector 0x00 / 0x10 key A and access bits
pub const MAD_KEY_A: [u8; 6] = [0xA0, 0xA1, 0xA2, 0xA3, 0xA4, 0xA5];
pub const MAD_CRC_INIT: u8 = 0xC7;
pub const MAD_CRC_POLYNOMIAL: u8 = 0x1D;
