// freefare-rs/freefare/src/mad.rs

//! MIFARE Application Directory.
//!
//! Sector 0x00 (MAD v1) maps sectors 1-15 to 2-byte application IDs. MAD v2
//! adds sector 0x10, mapping sectors 17-39 on a 4k card. Each directory
//! sector starts with a CRC-8 over the rest of its data and an info byte
//! naming the card publisher sector.

use log::{debug, warn};

use crate::constants::MAD_KEY_A;
use crate::crypto::crc8;
use crate::device::{Device, Initialized};
use crate::tag::classic::{AccessBits, ClassicTag, trailer_block};
use crate::types::{ClassicKey, KeyType, SectorNumber};
use crate::{Error, Result};

/// General purpose byte: a MAD is present
const GPB_DA: u8 = 0x80;
/// General purpose byte: multi-application card
const GPB_MA: u8 = 0x40;
const GPB_VERSION_MASK: u8 = 0x03;

const SECTOR_0X00: SectorNumber = 0x00;
const SECTOR_0X10: SectorNumber = 0x10;
const V1_SLOTS: usize = 15;
const V2_SLOTS: usize = 23;
const LAST_V1_SECTOR: SectorNumber = 0x0F;
const LAST_V2_SECTOR: SectorNumber = 0x27;

/// Application ID as stored in the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MadAid {
    pub function_cluster_code: u8,
    pub application_code: u8,
}

impl MadAid {
    /// Marks an unallocated sector.
    pub const FREE: MadAid = MadAid {
        function_cluster_code: 0x00,
        application_code: 0x00,
    };

    pub const fn new(function_cluster_code: u8, application_code: u8) -> Self {
        Self {
            function_cluster_code,
            application_code,
        }
    }

    /// Decode the on-card `[application_code, function_cluster_code]` pair.
    pub fn from_bytes(bytes: [u8; 2]) -> Self {
        Self::new(bytes[1], bytes[0])
    }

    pub fn to_bytes(self) -> [u8; 2] {
        [self.application_code, self.function_cluster_code]
    }

    pub fn is_free(self) -> bool {
        self == Self::FREE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MadVersion {
    V1,
    V2,
}

impl MadVersion {
    fn from_gpb(gpb: u8) -> Result<Self> {
        match gpb & GPB_VERSION_MASK {
            1 => Ok(MadVersion::V1),
            2 => Ok(MadVersion::V2),
            v => Err(Error::CorruptData(format!("unknown MAD version {}", v))),
        }
    }

    fn bits(self) -> u8 {
        match self {
            MadVersion::V1 => 1,
            MadVersion::V2 => 2,
        }
    }

    fn last_sector(self) -> SectorNumber {
        match self {
            MadVersion::V1 => LAST_V1_SECTOR,
            MadVersion::V2 => LAST_V2_SECTOR,
        }
    }
}

/// One directory sector: info byte and AID slots.
#[derive(Debug, Clone, PartialEq, Eq)]
struct DirectorySector<const N: usize> {
    info: u8,
    aids: [MadAid; N],
}

impl<const N: usize> Default for DirectorySector<N> {
    fn default() -> Self {
        Self {
            info: 0,
            aids: [MadAid::FREE; N],
        }
    }
}

impl<const N: usize> DirectorySector<N> {
    /// Serialized payload after the CRC byte.
    fn payload(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + 2 * N);
        out.push(self.info);
        for aid in &self.aids {
            out.extend_from_slice(&aid.to_bytes());
        }
        out
    }

    /// CRC byte followed by the payload, padded to whole blocks.
    fn encode(&self) -> Vec<u8> {
        let payload = self.payload();
        let mut out = Vec::with_capacity(payload.len() + 1);
        out.push(crc8(&payload));
        out.extend_from_slice(&payload);
        out.resize(out.len().div_ceil(16) * 16, 0);
        out
    }

    fn decode(sector: SectorNumber, data: &[u8]) -> Result<Self> {
        let payload_len = 1 + 2 * N;
        let payload = &data[1..1 + payload_len];
        let crc = crc8(payload);
        if crc != data[0] {
            warn!(
                "MAD sector {:#04x}: CRC {:#04x}, expected {:#04x}",
                sector, data[0], crc
            );
            return Err(Error::CorruptData(format!(
                "MAD sector {:#04x} CRC mismatch",
                sector
            )));
        }
        let mut aids = [MadAid::FREE; N];
        for (slot, pair) in aids.iter_mut().zip(payload[1..].chunks_exact(2)) {
            *slot = MadAid::from_bytes([pair[0], pair[1]]);
        }
        Ok(Self {
            info: payload[0],
            aids,
        })
    }
}

/// In-memory MIFARE Application Directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mad {
    version: MadVersion,
    sector_0x00: DirectorySector<V1_SLOTS>,
    sector_0x10: DirectorySector<V2_SLOTS>,
}

fn read_blocks(
    tag: &mut ClassicTag,
    device: &mut Device<Initialized>,
    blocks: std::ops::Range<u8>,
) -> Result<Vec<u8>> {
    let mut data = Vec::with_capacity(blocks.len() * 16);
    for block in blocks {
        data.extend_from_slice(&tag.read(device, block)?);
    }
    Ok(data)
}

fn write_blocks(
    tag: &mut ClassicTag,
    device: &mut Device<Initialized>,
    first: u8,
    data: &[u8],
) -> Result<()> {
    for (block, chunk) in (first..).zip(data.chunks_exact(16)) {
        let mut buf = [0u8; 16];
        buf.copy_from_slice(chunk);
        tag.write(device, block, &buf)?;
    }
    Ok(())
}

fn mad_trailer(gpb: u8, key_b: &ClassicKey) -> [u8; 16] {
    trailer_block(
        &MAD_KEY_A,
        Some(AccessBits::C001),
        Some(AccessBits::C001),
        Some(AccessBits::C001),
        Some(AccessBits::C110),
        gpb,
        key_b,
    )
}

impl Mad {
    /// Empty directory of the given version.
    pub fn new(version: MadVersion) -> Self {
        Self {
            version,
            sector_0x00: DirectorySector::default(),
            sector_0x10: DirectorySector::default(),
        }
    }

    /// Read the directory from a connected Classic tag using the public MAD key A.
    pub fn read(tag: &mut ClassicTag, device: &mut Device<Initialized>) -> Result<Mad> {
        tag.authenticate(device, 0x00, &MAD_KEY_A, KeyType::KeyA)?;

        let trailer = tag.read(device, 0x03)?;
        let gpb = trailer[9];
        if gpb & GPB_DA == 0 {
            return Err(Error::CorruptData("card carries no MAD".into()));
        }
        let version = MadVersion::from_gpb(gpb)?;

        let data = read_blocks(tag, device, 0x01..0x03)?;
        let sector_0x00 = DirectorySector::decode(SECTOR_0X00, &data)?;

        let sector_0x10 = if version == MadVersion::V2 {
            tag.authenticate(device, 0x40, &MAD_KEY_A, KeyType::KeyA)?;
            let data = read_blocks(tag, device, 0x40..0x43)?;
            DirectorySector::decode(SECTOR_0X10, &data)?
        } else {
            DirectorySector::default()
        };

        debug!("read MAD {:?}", version);
        Ok(Mad {
            version,
            sector_0x00,
            sector_0x10,
        })
    }

    /// Write the directory, authenticating each MAD sector with its key B.
    ///
    /// Trailers receive the public key A, read-only access for key A and
    /// the given key B.
    pub fn write(
        &self,
        tag: &mut ClassicTag,
        device: &mut Device<Initialized>,
        key_b_sector_00: &ClassicKey,
        key_b_sector_10: &ClassicKey,
    ) -> Result<()> {
        if self.version == MadVersion::V2 {
            tag.authenticate(device, 0x40, key_b_sector_10, KeyType::KeyB)?;
            write_blocks(tag, device, 0x40, &self.sector_0x10.encode())?;
            tag.write(device, 0x43, &mad_trailer(0x00, key_b_sector_10))?;
        }

        tag.authenticate(device, 0x00, key_b_sector_00, KeyType::KeyB)?;
        write_blocks(tag, device, 0x01, &self.sector_0x00.encode())?;
        let gpb = GPB_DA | GPB_MA | self.version.bits();
        tag.write(device, 0x03, &mad_trailer(gpb, key_b_sector_00))?;

        debug!("wrote MAD {:?}", self.version);
        Ok(())
    }

    pub fn version(&self) -> MadVersion {
        self.version
    }

    pub fn set_version(&mut self, version: MadVersion) {
        if self.version == MadVersion::V1 && version == MadVersion::V2 {
            self.sector_0x10 = DirectorySector::default();
            self.sector_0x10.info = self.sector_0x00.info;
        }
        self.version = version;
    }

    pub fn card_publisher_sector(&self) -> SectorNumber {
        self.sector_0x00.info
    }

    /// Point the info byte at the card publisher sector; `0` means none.
    pub fn set_card_publisher_sector(&mut self, sector: SectorNumber) -> Result<()> {
        if sector > self.version.last_sector() || sector == SECTOR_0X10 {
            return Err(Error::InvalidArgument(format!(
                "sector {:#04x} cannot hold the card publisher",
                sector
            )));
        }
        self.sector_0x00.info = sector;
        self.sector_0x10.info = sector;
        Ok(())
    }

    fn slot(&self, sector: SectorNumber) -> Result<(bool, usize)> {
        match sector {
            1..=LAST_V1_SECTOR => Ok((false, usize::from(sector) - 1)),
            0x11..=LAST_V2_SECTOR if self.version == MadVersion::V2 => {
                Ok((true, usize::from(sector) - 0x11))
            }
            _ => Err(Error::InvalidArgument(format!(
                "sector {:#04x} has no {:?} directory entry",
                sector, self.version
            ))),
        }
    }

    pub fn aid(&self, sector: SectorNumber) -> Result<MadAid> {
        Ok(match self.slot(sector)? {
            (false, i) => self.sector_0x00.aids[i],
            (true, i) => self.sector_0x10.aids[i],
        })
    }

    pub fn set_aid(&mut self, sector: SectorNumber, aid: MadAid) -> Result<()> {
        match self.slot(sector)? {
            (false, i) => self.sector_0x00.aids[i] = aid,
            (true, i) => self.sector_0x10.aids[i] = aid,
        }
        Ok(())
    }

    /// Sectors covered by the directory, in ascending order.
    fn sectors(&self) -> impl Iterator<Item = SectorNumber> + '_ {
        (1..=self.version.last_sector()).filter(|s| *s != SECTOR_0X10)
    }

    /// Sectors allocated to `aid`, in ascending order.
    pub fn application_find(&self, aid: MadAid) -> Vec<SectorNumber> {
        self.sectors()
            .filter(|s| self.aid(*s).is_ok_and(|a| a == aid))
            .collect()
    }

    /// Allocate free sectors to `aid` until they hold at least `size` bytes.
    ///
    /// Nothing is allocated when the free sectors are too small.
    pub fn application_alloc(&mut self, aid: MadAid, size: usize) -> Result<Vec<SectorNumber>> {
        if aid.is_free() || size == 0 {
            return Err(Error::InvalidArgument(
                "allocation needs a non-free AID and a non-zero size".into(),
            ));
        }

        let mut picked = Vec::new();
        let mut capacity = 0usize;
        for sector in self.sectors() {
            if capacity >= size {
                break;
            }
            if self.aid(sector)?.is_free() {
                picked.push(sector);
                capacity += sector_data_size(sector);
            }
        }
        if capacity < size {
            return Err(Error::InvalidArgument(format!(
                "only {} free bytes for a {} byte application",
                capacity, size
            )));
        }
        for sector in &picked {
            self.set_aid(*sector, aid)?;
        }
        Ok(picked)
    }
}

/// Data bytes in `sector`, trailer excluded.
fn sector_data_size(sector: SectorNumber) -> usize {
    if sector < 32 { 3 * 16 } else { 15 * 16 }
}
