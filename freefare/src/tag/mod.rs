// freefare-rs/freefare/src/tag/mod.rs

//! Tag identity, dispatch and the shared connection lifecycle.
//!
//! A discovered card becomes one [`Tag`] variant. Variant-specific
//! operations are reached through the checked accessors
//! ([`Tag::as_classic_mut`] etc.), which fail with
//! [`Error::WrongDeviceType`] instead of reinterpreting another variant.

use derive_more::Display;
use log::debug;

use crate::device::{Device, Initialized};
use crate::types::{Atqa, Iso14443aInfo, Uid};
use crate::{Error, Result};

pub mod classic;
pub mod desfire;
pub mod ultralight;

pub use classic::ClassicTag;
pub use desfire::DesfireTag;
pub use ultralight::UltralightTag;

/// MIFARE tag family member
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TagKind {
    #[display(fmt = "Mifare Classic 1k")]
    Classic1k,
    #[display(fmt = "Mifare Classic 4k")]
    Classic4k,
    #[display(fmt = "Mifare DESFire 4k")]
    Desfire4k,
    #[display(fmt = "Mifare UltraLight")]
    Ultralight,
}

/// One row of the discovery table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupportedTag {
    pub atqa: Atqa,
    pub sak: u8,
    pub kind: TagKind,
    pub friendly_name: &'static str,
}

pub const SUPPORTED_TAGS: &[SupportedTag] = &[
    SupportedTag {
        atqa: Atqa::from_bytes([0x00, 0x44]),
        sak: 0x00,
        kind: TagKind::Ultralight,
        friendly_name: "Mifare UltraLight",
    },
    SupportedTag {
        atqa: Atqa::from_bytes([0x00, 0x04]),
        sak: 0x08,
        kind: TagKind::Classic1k,
        friendly_name: "Mifare Classic 1k",
    },
    SupportedTag {
        atqa: Atqa::from_bytes([0x00, 0x02]),
        sak: 0x18,
        kind: TagKind::Classic4k,
        friendly_name: "Mifare Classic 4k",
    },
    SupportedTag {
        atqa: Atqa::from_bytes([0x03, 0x44]),
        sak: 0x20,
        kind: TagKind::Desfire4k,
        friendly_name: "Mifare DESFire 4k",
    },
];

impl TagKind {
    /// Match an ATQA/SAK pair against [`SUPPORTED_TAGS`].
    pub fn identify(atqa: Atqa, sak: u8) -> Option<TagKind> {
        SUPPORTED_TAGS
            .iter()
            .find(|t| t.atqa == atqa && t.sak == sak)
            .map(|t| t.kind)
    }

    pub fn friendly_name(self) -> &'static str {
        SUPPORTED_TAGS
            .iter()
            .find(|t| t.kind == self)
            .map(|t| t.friendly_name)
            .unwrap_or("Unknown")
    }

    pub fn is_classic(self) -> bool {
        matches!(self, TagKind::Classic1k | TagKind::Classic4k)
    }
}

/// State shared by every variant: identity, kind and the active flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagBase {
    info: Iso14443aInfo,
    kind: TagKind,
    active: bool,
}

impl TagBase {
    pub(crate) fn new(kind: TagKind, info: Iso14443aInfo) -> Self {
        Self {
            info,
            kind,
            active: false,
        }
    }

    pub fn info(&self) -> &Iso14443aInfo {
        &self.info
    }

    pub fn uid(&self) -> &Uid {
        &self.info.uid
    }

    pub fn kind(&self) -> TagKind {
        self.kind
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn ensure_active(&self) -> Result<()> {
        if self.active {
            Ok(())
        } else {
            Err(Error::WrongState {
                expected: "connected",
            })
        }
    }

    pub(crate) fn ensure_inactive(&self) -> Result<()> {
        if self.active {
            Err(Error::WrongState {
                expected: "disconnected",
            })
        } else {
            Ok(())
        }
    }

    /// Select the card on the reader and mark the tag active.
    pub(crate) fn connect(&mut self, device: &mut Device<Initialized>) -> Result<()> {
        self.ensure_inactive()?;
        device.select(&self.info.uid)?;
        self.active = true;
        debug!("connected to {} {}", self.kind, self.info.uid.to_hex());
        Ok(())
    }

    pub(crate) fn disconnect(&mut self, device: &mut Device<Initialized>) -> Result<()> {
        self.ensure_active()?;
        device.deselect()?;
        self.active = false;
        debug!("disconnected from {} {}", self.kind, self.info.uid.to_hex());
        Ok(())
    }
}

/// A discovered MIFARE tag.
#[derive(Debug)]
pub enum Tag {
    Classic(ClassicTag),
    Desfire(DesfireTag),
    Ultralight(UltralightTag),
}

impl Tag {
    /// Build the variant matching `kind`, with fresh variant state.
    pub fn instantiate(kind: TagKind, info: Iso14443aInfo) -> Tag {
        let base = TagBase::new(kind, info);
        match kind {
            TagKind::Classic1k | TagKind::Classic4k => Tag::Classic(ClassicTag::new(base)),
            TagKind::Desfire4k => Tag::Desfire(DesfireTag::new(base)),
            TagKind::Ultralight => Tag::Ultralight(UltralightTag::new(base)),
        }
    }

    /// Identify and instantiate in one step; `None` for unsupported cards.
    pub fn from_info(info: Iso14443aInfo) -> Option<Tag> {
        TagKind::identify(info.atqa, info.sak).map(|kind| Tag::instantiate(kind, info))
    }

    fn base(&self) -> &TagBase {
        match self {
            Tag::Classic(t) => t.base(),
            Tag::Desfire(t) => t.base(),
            Tag::Ultralight(t) => t.base(),
        }
    }

    pub fn kind(&self) -> TagKind {
        self.base().kind()
    }

    pub fn friendly_name(&self) -> &'static str {
        self.kind().friendly_name()
    }

    pub fn info(&self) -> &Iso14443aInfo {
        self.base().info()
    }

    pub fn uid(&self) -> &Uid {
        self.base().uid()
    }

    pub fn uid_hex(&self) -> String {
        self.uid().to_hex()
    }

    pub fn is_active(&self) -> bool {
        self.base().is_active()
    }

    /// Variant-specific connect.
    pub fn connect(&mut self, device: &mut Device<Initialized>) -> Result<()> {
        match self {
            Tag::Classic(t) => t.connect(device),
            Tag::Desfire(t) => t.connect(device),
            Tag::Ultralight(t) => t.connect(device),
        }
    }

    pub fn disconnect(&mut self, device: &mut Device<Initialized>) -> Result<()> {
        match self {
            Tag::Classic(t) => t.disconnect(device),
            Tag::Desfire(t) => t.disconnect(device),
            Tag::Ultralight(t) => t.disconnect(device),
        }
    }

    pub fn as_classic(&self) -> Result<&ClassicTag> {
        match self {
            Tag::Classic(t) => Ok(t),
            _ => Err(classic::wrong_type()),
        }
    }

    pub fn as_classic_mut(&mut self) -> Result<&mut ClassicTag> {
        match self {
            Tag::Classic(t) => Ok(t),
            _ => Err(classic::wrong_type()),
        }
    }

    pub fn as_desfire(&self) -> Result<&DesfireTag> {
        match self {
            Tag::Desfire(t) => Ok(t),
            _ => Err(desfire::wrong_type()),
        }
    }

    pub fn as_desfire_mut(&mut self) -> Result<&mut DesfireTag> {
        match self {
            Tag::Desfire(t) => Ok(t),
            _ => Err(desfire::wrong_type()),
        }
    }

    pub fn as_ultralight(&self) -> Result<&UltralightTag> {
        match self {
            Tag::Ultralight(t) => Ok(t),
            _ => Err(ultralight::wrong_type()),
        }
    }

    pub fn as_ultralight_mut(&mut self) -> Result<&mut UltralightTag> {
        match self {
            Tag::Ultralight(t) => Ok(t),
            _ => Err(ultralight::wrong_type()),
        }
    }
}
