// freefare-rs/freefare/src/tag/ultralight.rs

//! MIFARE Ultralight: 16 pages of 4 bytes behind a read-ahead cache.
//!
//! The card's read command always returns four consecutive pages, wrapping
//! past page 15 to page 0. The cache keeps three extra slots so that a
//! wrapped answer can be stored contiguously, then folds them back onto
//! pages 0-2.

use log::debug;

use crate::constants::{
    ULTRALIGHT_CMD_READ, ULTRALIGHT_CMD_WRITE, ULTRALIGHT_PAGE_COUNT, ULTRALIGHT_PAGES_PER_READ,
};
use crate::device::{Device, Initialized};
use crate::tag::{TagBase, TagKind};
use crate::types::UltralightPage;
use crate::{Error, Result};

const CACHE_SLOTS: usize = ULTRALIGHT_PAGE_COUNT + ULTRALIGHT_PAGES_PER_READ - 1;
const READ_LEN: usize = ULTRALIGHT_PAGES_PER_READ * 4;

pub(crate) fn wrong_type() -> Error {
    Error::WrongDeviceType {
        expected: "MIFARE Ultralight",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PageCache {
    slots: [UltralightPage; CACHE_SLOTS],
    cached: [bool; ULTRALIGHT_PAGE_COUNT],
}

impl Default for PageCache {
    fn default() -> Self {
        Self {
            slots: [[0u8; 4]; CACHE_SLOTS],
            cached: [false; ULTRALIGHT_PAGE_COUNT],
        }
    }
}

impl PageCache {
    fn get(&self, page: usize) -> Option<UltralightPage> {
        self.cached[page].then_some(self.slots[page])
    }

    /// Store a 4-page answer read from `page`.
    fn fill(&mut self, page: usize, data: &[u8]) {
        for (i, chunk) in data.chunks_exact(4).take(ULTRALIGHT_PAGES_PER_READ).enumerate() {
            self.slots[page + i].copy_from_slice(chunk);
            self.cached[(page + i) % ULTRALIGHT_PAGE_COUNT] = true;
        }
        // Only the slots this answer wrapped into hold fresh data.
        let last = page + ULTRALIGHT_PAGES_PER_READ - 1;
        for slot in ULTRALIGHT_PAGE_COUNT..=last.min(CACHE_SLOTS - 1) {
            self.slots[slot - ULTRALIGHT_PAGE_COUNT] = self.slots[slot];
        }
    }

    fn invalidate(&mut self) {
        self.cached = [false; ULTRALIGHT_PAGE_COUNT];
    }
}

/// MIFARE Ultralight tag.
#[derive(Debug)]
pub struct UltralightTag {
    base: TagBase,
    cache: PageCache,
}

impl UltralightTag {
    pub(crate) fn new(base: TagBase) -> Self {
        Self {
            base,
            cache: PageCache::default(),
        }
    }

    pub fn base(&self) -> &TagBase {
        &self.base
    }

    fn ensure_usable(&self) -> Result<()> {
        if self.base.kind() != TagKind::Ultralight {
            return Err(wrong_type());
        }
        self.base.ensure_active()
    }

    fn check_page(page: u8) -> Result<usize> {
        let page = usize::from(page);
        if page >= ULTRALIGHT_PAGE_COUNT {
            return Err(Error::InvalidArgument(format!(
                "page {} out of range 0..{}",
                page, ULTRALIGHT_PAGE_COUNT
            )));
        }
        Ok(page)
    }

    pub fn connect(&mut self, device: &mut Device<Initialized>) -> Result<()> {
        if self.base.kind() != TagKind::Ultralight {
            return Err(wrong_type());
        }
        self.base.connect(device)?;
        self.cache.invalidate();
        Ok(())
    }

    pub fn disconnect(&mut self, device: &mut Device<Initialized>) -> Result<()> {
        if self.base.kind() != TagKind::Ultralight {
            return Err(wrong_type());
        }
        self.base.disconnect(device)?;
        self.cache.invalidate();
        Ok(())
    }

    /// Whether `page` would be served without talking to the card.
    pub fn is_page_cached(&self, page: u8) -> bool {
        usize::from(page) < ULTRALIGHT_PAGE_COUNT && self.cache.cached[usize::from(page)]
    }

    /// Read one page, fetching it and the three following pages on a miss.
    pub fn read(&mut self, device: &mut Device<Initialized>, page: u8) -> Result<UltralightPage> {
        self.ensure_usable()?;
        let index = Self::check_page(page)?;

        if let Some(data) = self.cache.get(index) {
            return Ok(data);
        }

        debug!("ultralight page {} not cached, reading", page);
        let resp = device.transceive(&[ULTRALIGHT_CMD_READ, page])?;
        if resp.len() < READ_LEN {
            return Err(Error::InvalidLength {
                expected: READ_LEN,
                actual: resp.len(),
            });
        }
        self.cache.fill(index, &resp[..READ_LEN]);
        Ok(self.cache.slots[index])
    }

    /// Write one page. Every cached page is dropped afterwards.
    pub fn write(
        &mut self,
        device: &mut Device<Initialized>,
        page: u8,
        data: &UltralightPage,
    ) -> Result<()> {
        self.ensure_usable()?;
        Self::check_page(page)?;

        let mut cmd = [0u8; 6];
        cmd[0] = ULTRALIGHT_CMD_WRITE;
        cmd[1] = page;
        cmd[2..].copy_from_slice(data);
        device.transceive(&cmd)?;

        self.cache.invalidate();
        Ok(())
    }
}
