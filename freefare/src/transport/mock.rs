// freefare-rs/freefare/src/transport/mock.rs

use std::cell::RefCell;
use std::rc::Rc;

use crate::transport::traits::Transport;
use crate::types::{Iso14443aInfo, Uid};
use crate::{Error, Result};

/// Mock transport for unit tests. It records sent commands and returns queued responses.
#[derive(Debug, Default)]
pub struct MockTransport {
    pub sent: Vec<Vec<u8>>,
    pub responses: Vec<Vec<u8>>,
    pub targets: Vec<Iso14443aInfo>,
    pub selected: Option<Uid>,
    /// Testing hook: number of transceive calls that should fail with Timeout
    pub transceive_failures: usize,
    /// Number of reset calls seen
    pub resets: usize,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_targets(targets: Vec<Iso14443aInfo>) -> Self {
        Self {
            targets,
            ..Self::default()
        }
    }

    /// Set how many subsequent transceive calls should fail (for tests).
    pub fn set_transceive_failures(&mut self, n: usize) {
        self.transceive_failures = n;
    }

    pub fn push_response(&mut self, resp: Vec<u8>) {
        self.responses.push(resp);
    }

    pub fn pop_sent(&mut self) -> Option<Vec<u8>> {
        self.sent.pop()
    }

    /// Number of commands that reached the card.
    pub fn transceive_count(&self) -> usize {
        self.sent.len()
    }

    /// Wrap into a shared handle so tests can inspect the mock after a
    /// Device has taken ownership of the transport.
    pub fn into_shared(self) -> Rc<RefCell<MockTransport>> {
        Rc::new(RefCell::new(self))
    }
}

impl Transport for MockTransport {
    fn transceive(&mut self, command: &[u8]) -> Result<Vec<u8>> {
        self.sent.push(command.to_vec());
        if self.transceive_failures > 0 {
            self.transceive_failures -= 1;
            return Err(Error::Timeout);
        }
        if self.responses.is_empty() {
            Err(Error::Timeout)
        } else {
            Ok(self.responses.remove(0))
        }
    }

    fn list_targets(&mut self) -> Result<Vec<Iso14443aInfo>> {
        Ok(self.targets.clone())
    }

    fn select(&mut self, uid: &Uid) -> Result<()> {
        if self.targets.is_empty() || self.targets.iter().any(|t| &t.uid == uid) {
            self.selected = Some(uid.clone());
            Ok(())
        } else {
            Err(Error::Transport(format!("no target with uid {}", uid.to_hex())))
        }
    }

    fn deselect(&mut self) -> Result<()> {
        self.selected = None;
        Ok(())
    }

    fn reset(&mut self) -> Result<()> {
        // Reset clears the sent log but keeps queued responses so tests can
        // pre-seed card answers before handing the transport to a Device.
        self.sent.clear();
        self.resets += 1;
        Ok(())
    }
}

impl Transport for Rc<RefCell<MockTransport>> {
    fn transceive(&mut self, command: &[u8]) -> Result<Vec<u8>> {
        self.borrow_mut().transceive(command)
    }

    fn list_targets(&mut self) -> Result<Vec<Iso14443aInfo>> {
        self.borrow_mut().list_targets()
    }

    fn select(&mut self, uid: &Uid) -> Result<()> {
        self.borrow_mut().select(uid)
    }

    fn deselect(&mut self) -> Result<()> {
        self.borrow_mut().deselect()
    }

    fn reset(&mut self) -> Result<()> {
        self.borrow_mut().reset()
    }
}
