// freefare-rs/freefare/src/prelude.rs

pub use crate::crypto::{DesfireKey, DesfireKeyKind};
pub use crate::device::{Device, DeviceBuilder, Initialized, Uninitialized};
pub use crate::mad::{Mad, MadAid, MadVersion};
pub use crate::tag::classic::{AccessBits, DataPermission, TrailerPermission};
pub use crate::tag::desfire::DesfireAid;
pub use crate::tag::{ClassicTag, DesfireTag, Tag, TagKind, UltralightTag};
pub use crate::transport::Transport;
pub use crate::{
    Atqa, BlockNumber, ClassicBlock, ClassicKey, Error, Iso14443aInfo, KeyType, Result,
    SectorNumber, Uid, UltralightPage,
};

pub use crate::utils::{bytes_to_hex, bytes_to_hex_spaced};
