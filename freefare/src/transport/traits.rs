// freefare-rs/freefare/src/transport/traits.rs

use crate::Result;
use crate::types::{Iso14443aInfo, Uid};

/// Transport trait abstracts the NFC reader away from tag logic.
///
/// One command is in flight at a time; implementations block until the
/// card answers or the link fails.
pub trait Transport {
    /// Send raw card-level command bytes to the selected target and return
    /// its answer.
    fn transceive(&mut self, command: &[u8]) -> Result<Vec<u8>>;

    /// List the ISO14443A targets currently in the field.
    fn list_targets(&mut self) -> Result<Vec<Iso14443aInfo>>;

    /// Select the target with the given UID so subsequent transceive calls
    /// reach it.
    fn select(&mut self, uid: &Uid) -> Result<()>;

    /// Release the currently selected target.
    fn deselect(&mut self) -> Result<()>;

    /// Perform a transport-level reset. Default implementation does nothing.
    fn reset(&mut self) -> Result<()> {
        Ok(())
    }
}
