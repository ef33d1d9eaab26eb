// freefare-rs/freefare/src/tag/classic/mod.rs

use log::{debug, warn};

use crate::constants::*;
use crate::device::{Device, Initialized};
use crate::tag::TagBase;
use crate::types::{BlockNumber, ClassicBlock, ClassicKey, KeyType, SectorNumber};
use crate::{Error, Result};

pub mod access;
pub mod sector;

pub use access::{
    AccessBits, DataPermission, SectorAccessBits, TrailerPermission, trailer_block,
};
pub use sector::{
    block_sector, first_sector_block, is_trailer_block, last_sector_block, sector_block_count,
    sector_first_block, sector_trailer_block,
};

use access::AccessBitsCache;

pub(crate) fn wrong_type() -> Error {
    Error::WrongDeviceType {
        expected: "MIFARE Classic",
    }
}

/// MIFARE Classic 1k / 4k tag.
#[derive(Debug)]
pub struct ClassicTag {
    base: TagBase,
    last_authentication_key_type: Option<KeyType>,
    cached_access_bits: AccessBitsCache,
}

impl ClassicTag {
    pub(crate) fn new(base: TagBase) -> Self {
        Self {
            base,
            last_authentication_key_type: None,
            cached_access_bits: AccessBitsCache::default(),
        }
    }

    pub fn base(&self) -> &TagBase {
        &self.base
    }

    /// State and family guard run before touching Classic-only fields.
    fn ensure_usable(&self) -> Result<()> {
        if !self.base.kind().is_classic() {
            return Err(wrong_type());
        }
        self.base.ensure_active()
    }

    pub fn connect(&mut self, device: &mut Device<Initialized>) -> Result<()> {
        if !self.base.kind().is_classic() {
            return Err(wrong_type());
        }
        self.base.connect(device)?;
        self.last_authentication_key_type = None;
        self.cached_access_bits.invalidate();
        Ok(())
    }

    pub fn disconnect(&mut self, device: &mut Device<Initialized>) -> Result<()> {
        if !self.base.kind().is_classic() {
            return Err(wrong_type());
        }
        self.base.disconnect(device)?;
        self.last_authentication_key_type = None;
        self.cached_access_bits.invalidate();
        Ok(())
    }

    /// Key type of the last successful authentication, if any.
    pub fn last_authentication_key_type(&self) -> Option<KeyType> {
        self.last_authentication_key_type
    }

    /// Cached (trailer block, access word) pair, if any.
    pub fn cached_sector_access_bits(&self) -> Option<(BlockNumber, SectorAccessBits)> {
        self.cached_access_bits.sector
    }

    pub fn cached_block_access_bits(&self) -> Option<(BlockNumber, AccessBits)> {
        self.cached_access_bits.block
    }

    /// Authenticate the sector containing `block`.
    pub fn authenticate(
        &mut self,
        device: &mut Device<Initialized>,
        block: BlockNumber,
        key: &ClassicKey,
        key_type: KeyType,
    ) -> Result<()> {
        self.ensure_usable()?;

        // A new sector is being opened: cached key type and access bits no
        // longer describe it.
        self.last_authentication_key_type = None;
        self.cached_access_bits.invalidate();

        // The key is bound to the last four UID bytes, which for a 4-byte
        // UID is the whole identifier.
        let uid = self.base.uid().as_bytes();
        let mut cmd = Vec::with_capacity(12);
        cmd.push(key_type.auth_command());
        cmd.push(block);
        cmd.extend_from_slice(key);
        cmd.extend_from_slice(&uid[uid.len().saturating_sub(4)..]);

        device.transceive(&cmd)?;
        self.last_authentication_key_type = Some(key_type);
        debug!("authenticated block {} with {:?}", block, key_type);
        Ok(())
    }

    pub fn read(&mut self, device: &mut Device<Initialized>, block: BlockNumber) -> Result<ClassicBlock> {
        self.ensure_usable()?;
        let resp = device.transceive(&[CLASSIC_CMD_READ, block])?;
        if resp.len() < 16 {
            return Err(Error::InvalidLength {
                expected: 16,
                actual: resp.len(),
            });
        }
        let mut data = [0u8; 16];
        data.copy_from_slice(&resp[..16]);
        Ok(data)
    }

    pub fn write(
        &mut self,
        device: &mut Device<Initialized>,
        block: BlockNumber,
        data: &ClassicBlock,
    ) -> Result<()> {
        self.ensure_usable()?;
        let mut cmd = Vec::with_capacity(18);
        cmd.push(CLASSIC_CMD_WRITE);
        cmd.push(block);
        cmd.extend_from_slice(data);
        device.transceive(&cmd)?;

        if is_trailer_block(block) {
            self.cached_access_bits.invalidate();
        }
        Ok(())
    }

    /// Format `block` as a value block holding `value`, with backup address `adr`.
    pub fn init_value(
        &mut self,
        device: &mut Device<Initialized>,
        block: BlockNumber,
        value: i32,
        adr: u8,
    ) -> Result<()> {
        let v = value.to_le_bytes();
        let inv = (!value).to_le_bytes();
        let mut data = [0u8; 16];
        data[..4].copy_from_slice(&v);
        data[4..8].copy_from_slice(&inv);
        data[8..12].copy_from_slice(&v);
        data[12] = adr;
        data[13] = !adr;
        data[14] = adr;
        data[15] = !adr;
        self.write(device, block, &data)
    }

    /// Read a value block, returning its value and backup address.
    pub fn read_value(
        &mut self,
        device: &mut Device<Initialized>,
        block: BlockNumber,
    ) -> Result<(i32, u8)> {
        let data = self.read(device, block)?;
        let word = |i: usize| i32::from_le_bytes([data[i], data[i + 1], data[i + 2], data[i + 3]]);
        let (value, inv, copy) = (word(0), word(4), word(8));
        let adr = data[12];
        if value != copy || value != !inv || adr != data[14] || adr != !data[13] || adr != !data[15] {
            warn!("block {} is not a valid value block", block);
            return Err(Error::CorruptData(format!(
                "block {} is not a value block",
                block
            )));
        }
        Ok((value, adr))
    }

    fn value_command(
        &mut self,
        device: &mut Device<Initialized>,
        command: u8,
        block: BlockNumber,
        amount: u32,
    ) -> Result<()> {
        self.ensure_usable()?;
        let mut cmd = Vec::with_capacity(6);
        cmd.push(command);
        cmd.push(block);
        cmd.extend_from_slice(&amount.to_le_bytes());
        device.transceive(&cmd)?;
        Ok(())
    }

    /// Add `amount` to the value block into the card's transfer buffer.
    pub fn increment(&mut self, device: &mut Device<Initialized>, block: BlockNumber, amount: u32) -> Result<()> {
        self.value_command(device, CLASSIC_CMD_INCREMENT, block, amount)
    }

    pub fn decrement(&mut self, device: &mut Device<Initialized>, block: BlockNumber, amount: u32) -> Result<()> {
        self.value_command(device, CLASSIC_CMD_DECREMENT, block, amount)
    }

    /// Load the value block into the transfer buffer unchanged.
    pub fn restore(&mut self, device: &mut Device<Initialized>, block: BlockNumber) -> Result<()> {
        self.value_command(device, CLASSIC_CMD_RESTORE, block, 0)
    }

    /// Write the transfer buffer to `block`.
    pub fn transfer(&mut self, device: &mut Device<Initialized>, block: BlockNumber) -> Result<()> {
        self.ensure_usable()?;
        device.transceive(&[CLASSIC_CMD_TRANSFER, block])?;
        Ok(())
    }

    /// Decoded access word of the sector whose trailer is `trailer`.
    ///
    /// Served from cache when the same trailer was decoded last; otherwise
    /// the trailer is read from the card and replaces the cached entry.
    pub fn get_sector_access_bits(
        &mut self,
        device: &mut Device<Initialized>,
        trailer: BlockNumber,
    ) -> Result<SectorAccessBits> {
        self.ensure_usable()?;
        if !is_trailer_block(trailer) {
            return Err(Error::InvalidArgument(format!(
                "block {} is not a sector trailer",
                trailer
            )));
        }
        if let Some(bits) = self.cached_access_bits.sector(trailer) {
            return Ok(bits);
        }

        debug!("access bits cache miss for trailer {}", trailer);
        let data = self.read(device, trailer)?;
        let bits = SectorAccessBits::decode(&[data[6], data[7], data[8]]).inspect_err(|_| {
            warn!("corrupt access bits in trailer {}", trailer);
        })?;
        self.cached_access_bits.sector = Some((trailer, bits));
        Ok(bits)
    }

    /// 3-bit access condition that applies to `block`.
    pub fn get_block_access_bits(
        &mut self,
        device: &mut Device<Initialized>,
        block: BlockNumber,
    ) -> Result<AccessBits> {
        self.ensure_usable()?;
        if let Some(bits) = self.cached_access_bits.block(block) {
            return Ok(bits);
        }
        let sector_bits = self.get_sector_access_bits(device, last_sector_block(block))?;
        let bits = sector_bits.group(sector::access_group(block));
        self.cached_access_bits.block = Some((block, bits));
        Ok(bits)
    }

    /// Whether `key_type` grants `permission` on data block `block`.
    pub fn get_data_block_permission(
        &mut self,
        device: &mut Device<Initialized>,
        block: BlockNumber,
        permission: DataPermission,
        key_type: KeyType,
    ) -> Result<bool> {
        self.ensure_usable()?;
        if is_trailer_block(block) {
            return Err(Error::InvalidArgument(format!(
                "block {} is a sector trailer",
                block
            )));
        }
        let ab = self.get_block_access_bits(device, block)?;
        Ok(access::data_block_permits(ab, permission, key_type))
    }

    /// Whether `key_type` grants `permission` on sector trailer `trailer`.
    pub fn get_trailer_block_permission(
        &mut self,
        device: &mut Device<Initialized>,
        trailer: BlockNumber,
        permission: TrailerPermission,
        key_type: KeyType,
    ) -> Result<bool> {
        self.ensure_usable()?;
        if !is_trailer_block(trailer) {
            return Err(Error::InvalidArgument(format!(
                "block {} is not a sector trailer",
                trailer
            )));
        }
        let ab = self.get_block_access_bits(device, trailer)?;
        Ok(access::trailer_block_permits(ab, permission, key_type))
    }

    /// Reset `sector` to factory state: zeroed data blocks, default keys
    /// and transport access bits. The sector must already be authenticated.
    pub fn format_sector(&mut self, device: &mut Device<Initialized>, sector: SectorNumber) -> Result<()> {
        self.ensure_usable()?;
        let first = sector_first_block(sector)
            .ok_or_else(|| Error::InvalidArgument(format!("no sector {}", sector)))?;
        let trailer = last_sector_block(first);

        for block in first..trailer {
            self.write(device, block, &[0u8; 16])?;
        }
        let tb = trailer_block(
            &CLASSIC_DEFAULT_KEY,
            None,
            None,
            None,
            None,
            0x00,
            &CLASSIC_DEFAULT_KEY,
        );
        self.write(device, trailer, &tb)
    }
}
