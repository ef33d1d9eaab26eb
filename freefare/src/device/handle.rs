// freefare-rs/freefare/src/device/handle.rs

use std::marker::PhantomData;

use log::{debug, trace, warn};

use crate::Result;
use crate::tag::{Tag, TagKind};
use crate::transport::Transport;
use crate::types::Uid;
use crate::utils::bytes_to_hex_spaced;

/// Type-state markers
pub struct Uninitialized;
pub struct Initialized;

/// Reader session handle that enforces initialization state at compile time.
///
/// Tags never own the device: every tag operation borrows it for the
/// duration of one call.
pub struct Device<State = Uninitialized> {
    transport: Box<dyn Transport>,
    _state: PhantomData<State>,
}

impl Device<Uninitialized> {
    /// Create a Device from an existing Transport instance.
    pub fn new_with_transport(transport: Box<dyn Transport>) -> Result<Self> {
        Ok(Self {
            transport,
            _state: PhantomData,
        })
    }

    /// Reset the transport. Returns an initialized Device on success.
    pub fn initialize(self) -> Result<Device<Initialized>> {
        let mut this = self;
        this.transport.reset()?;

        Ok(Device {
            transport: this.transport,
            _state: PhantomData,
        })
    }
}

impl Device<Initialized> {
    /// Send one card-level command and return the raw answer.
    pub fn transceive(&mut self, command: &[u8]) -> Result<Vec<u8>> {
        trace!("PCD -> PICC: {}", bytes_to_hex_spaced(command));
        match self.transport.transceive(command) {
            Ok(resp) => {
                trace!("PICC -> PCD: {}", bytes_to_hex_spaced(&resp));
                Ok(resp)
            }
            Err(e) => {
                debug!("transceive failed: {}", e);
                Err(e)
            }
        }
    }

    pub fn select(&mut self, uid: &Uid) -> Result<()> {
        self.transport.select(uid)
    }

    pub fn deselect(&mut self) -> Result<()> {
        self.transport.deselect()
    }

    /// Discover the supported MIFARE tags currently in the field.
    ///
    /// Targets whose ATQA/SAK pair is not recognised are skipped.
    pub fn tags(&mut self) -> Result<Vec<Tag>> {
        let targets = self.transport.list_targets()?;
        let mut tags = Vec::with_capacity(targets.len());
        for info in targets {
            match TagKind::identify(info.atqa, info.sak) {
                Some(kind) => {
                    debug!("found {} with uid {}", kind, info.uid.to_hex());
                    tags.push(Tag::instantiate(kind, info));
                }
                None => warn!(
                    "skipping unsupported target uid={} atqa={} sak={:#04x}",
                    info.uid.to_hex(),
                    bytes_to_hex_spaced(info.atqa.as_bytes()),
                    info.sak
                ),
            }
        }
        Ok(tags)
    }
}
