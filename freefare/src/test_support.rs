// freefare-rs/freefare/src/test_support.rs

//! Test support helpers intended for use by unit and integration tests.
//!
//! Besides the device helpers, two card simulators answer frames the way a
//! real card would, so that multi-step exchanges (DESFire authentication,
//! MAD round trips) can be exercised without scripting every byte.
#![allow(dead_code)]

use crate::constants::*;
use crate::crypto::{Direction, DesfireKey, cbc_transform};
use crate::device::{Device, Initialized};
use crate::transport::Transport;
use crate::types::{Atqa, ClassicBlock, Iso14443aInfo, Uid};
use crate::{Error, Result};

/// UID used by [`sample_info`]
#[doc(hidden)]
pub const SAMPLE_UID: [u8; 4] = [0x04, 0x11, 0x22, 0x33];

/// Identity with [`SAMPLE_UID`] and the given ATQA/SAK.
#[doc(hidden)]
pub fn sample_info(atqa: [u8; 2], sak: u8) -> Iso14443aInfo {
    Iso14443aInfo::new(Uid::from(SAMPLE_UID), Atqa::from_bytes(atqa), sak)
}

/// Create and initialize a Device<Initialized> on top of `transport`.
///
/// Pass `MockTransport::new().into_shared()` (cloned) to keep a handle on
/// the mock for inspecting sent frames afterwards.
#[doc(hidden)]
pub fn initialized_mock_device<T: Transport + 'static>(
    transport: T,
) -> Result<Device<Initialized>> {
    let device = Device::new_with_transport(Box::new(transport))?;
    device.initialize()
}

/// Card side of a DESFire in its PICC application.
///
/// Answers the legacy authentication handshake with `key` and the fixed
/// challenge `rnd_b`; every other command is acknowledged with status 0x00.
#[doc(hidden)]
#[derive(Debug)]
pub struct DesfireCardSim {
    key: DesfireKey,
    rnd_b: [u8; 8],
    awaiting_token: bool,
    /// Answer the token with a proof the reader must reject
    pub forge_proof: bool,
    pub sent: Vec<Vec<u8>>,
}

impl DesfireCardSim {
    pub fn new(key: DesfireKey, rnd_b: [u8; 8]) -> Self {
        Self {
            key,
            rnd_b,
            awaiting_token: false,
            forge_proof: false,
            sent: Vec::new(),
        }
    }

    fn answer_token(&mut self, token: &[u8]) -> Result<Vec<u8>> {
        let mut token = token.to_vec();
        let mut iv = [0u8; 8];
        cbc_transform(&self.key, &mut token, &mut iv, Direction::Receive)?;

        let mut expected_b = self.rnd_b;
        expected_b.rotate_left(1);
        if token.len() != 16 || token[8..] != expected_b {
            return Ok(vec![0xAE]);
        }

        let mut proof = [0u8; 8];
        proof.copy_from_slice(&token[..8]);
        proof.rotate_left(1);
        if self.forge_proof {
            proof[0] ^= 0xFF;
        }
        let mut iv = [0u8; 8];
        cbc_transform(&self.key, &mut proof, &mut iv, Direction::Send)?;

        let mut resp = vec![DESFIRE_STATUS_OK];
        resp.extend_from_slice(&proof);
        Ok(resp)
    }
}

impl Transport for DesfireCardSim {
    fn transceive(&mut self, command: &[u8]) -> Result<Vec<u8>> {
        self.sent.push(command.to_vec());
        let awaiting = std::mem::take(&mut self.awaiting_token);
        match command {
            [DESFIRE_CMD_AUTHENTICATE, _] => {
                let mut challenge = self.rnd_b;
                let mut iv = [0u8; 8];
                cbc_transform(&self.key, &mut challenge, &mut iv, Direction::Send)?;
                self.awaiting_token = true;
                let mut resp = vec![DESFIRE_STATUS_ADDITIONAL_FRAME];
                resp.extend_from_slice(&challenge);
                Ok(resp)
            }
            [DESFIRE_CMD_ADDITIONAL_FRAME, token @ ..] if awaiting => self.answer_token(token),
            [] => Err(Error::Transport("empty frame".into())),
            _ => Ok(vec![DESFIRE_STATUS_OK]),
        }
    }

    fn list_targets(&mut self) -> Result<Vec<Iso14443aInfo>> {
        Ok(vec![sample_info([0x03, 0x44], 0x20)])
    }

    fn select(&mut self, _uid: &Uid) -> Result<()> {
        Ok(())
    }

    fn deselect(&mut self) -> Result<()> {
        self.awaiting_token = false;
        Ok(())
    }
}

/// Card side of a MIFARE Classic 4k: 256 blocks of memory, any key accepted.
#[doc(hidden)]
#[derive(Debug, Clone)]
pub struct ClassicCardSim {
    pub blocks: Vec<ClassicBlock>,
    pub sent: Vec<Vec<u8>>,
}

impl Default for ClassicCardSim {
    fn default() -> Self {
        Self {
            blocks: vec![[0u8; 16]; 256],
            sent: Vec::new(),
        }
    }
}

impl Transport for ClassicCardSim {
    fn transceive(&mut self, command: &[u8]) -> Result<Vec<u8>> {
        self.sent.push(command.to_vec());
        match command {
            [CLASSIC_CMD_AUTH_A | CLASSIC_CMD_AUTH_B, _block, ..] => Ok(Vec::new()),
            [CLASSIC_CMD_READ, block] => Ok(self.blocks[usize::from(*block)].to_vec()),
            [CLASSIC_CMD_WRITE, block, data @ ..] if data.len() == 16 => {
                self.blocks[usize::from(*block)].copy_from_slice(data);
                Ok(Vec::new())
            }
            _ => Err(Error::Transport(format!(
                "unsupported frame {}",
                crate::utils::bytes_to_hex_spaced(command)
            ))),
        }
    }

    fn list_targets(&mut self) -> Result<Vec<Iso14443aInfo>> {
        Ok(vec![sample_info([0x00, 0x02], 0x18)])
    }

    fn select(&mut self, _uid: &Uid) -> Result<()> {
        Ok(())
    }

    fn deselect(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Shared handle so tests can inspect the simulated card memory after the
/// device has taken ownership.
impl Transport for std::rc::Rc<std::cell::RefCell<ClassicCardSim>> {
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
}
