// freefare-rs/freefare/src/tag/desfire/mod.rs

//! MIFARE DESFire in native command mode.
//!
//! Frames are `[cmd, data...]` towards the card and `[status, data...]`
//! back. Status `0x00` ends an exchange, `0xAF` asks for a continuation
//! frame, anything else is a card error and is kept in
//! [`DesfireTag::last_picc_error`] until the next command starts.
//!
//! Only plain communication is implemented: the session key negotiated by
//! [`DesfireTag::authenticate`] is exposed but not applied to later frames.

use log::{debug, warn};

use crate::constants::*;
use crate::crypto::{Direction, DesfireKey, cbc_transform};
use crate::device::{Device, Initialized};
use crate::tag::{TagBase, TagKind};
use crate::{Error, Result};

pub mod aid;

pub use aid::DesfireAid;

pub(crate) fn wrong_type() -> Error {
    Error::WrongDeviceType {
        expected: "MIFARE DESFire",
    }
}

/// Largest offset or length a data command can carry (3 bytes)
const MAX_24_BIT: u32 = 0x00FF_FFFF;

/// Authentication state of a DESFire session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Authenticating {
        key_no: u8,
    },
    Authenticated {
        key_no: u8,
        session_key: DesfireKey,
    },
}

/// Hardware or software half of a `GetVersion` answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionInfo {
    pub vendor_id: u8,
    pub kind: u8,
    pub subtype: u8,
    pub version_major: u8,
    pub version_minor: u8,
    pub storage_size: u8,
    pub protocol: u8,
}

impl VersionInfo {
    fn parse(b: &[u8]) -> Self {
        Self {
            vendor_id: b[0],
            kind: b[1],
            subtype: b[2],
            version_major: b[3],
            version_minor: b[4],
            storage_size: b[5],
            protocol: b[6],
        }
    }
}

/// Decoded `GetVersion` answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DesfireVersion {
    pub hardware: VersionInfo,
    pub software: VersionInfo,
    pub uid: [u8; 7],
    pub batch_number: [u8; 5],
    pub production_week: u8,
    pub production_year: u8,
}

impl DesfireVersion {
    const LEN: usize = 28;

    fn parse(data: &[u8]) -> Result<Self> {
        if data.len() != Self::LEN {
            return Err(Error::InvalidLength {
                expected: Self::LEN,
                actual: data.len(),
            });
        }
        let mut uid = [0u8; 7];
        uid.copy_from_slice(&data[14..21]);
        let mut batch_number = [0u8; 5];
        batch_number.copy_from_slice(&data[21..26]);
        Ok(Self {
            hardware: VersionInfo::parse(&data[0..7]),
            software: VersionInfo::parse(&data[7..14]),
            uid,
            batch_number,
            production_week: data[26],
            production_year: data[27],
        })
    }
}

/// MIFARE DESFire tag.
#[derive(Debug)]
pub struct DesfireTag {
    base: TagBase,
    session: SessionState,
    selected_application: Option<DesfireAid>,
    last_picc_error: u8,
    last_pcd_error: Option<Error>,
}

fn rotate_left(block: [u8; 8]) -> [u8; 8] {
    let mut out = block;
    out.rotate_left(1);
    out
}

fn push_u24(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_le_bytes()[..3]);
}

fn check_u24(what: &str, value: u32) -> Result<()> {
    if value > MAX_24_BIT {
        return Err(Error::InvalidArgument(format!(
            "{} {:#x} does not fit in 24 bits",
            what, value
        )));
    }
    Ok(())
}

impl DesfireTag {
    pub(crate) fn new(base: TagBase) -> Self {
        Self {
            base,
            session: SessionState::Idle,
            selected_application: None,
            last_picc_error: DESFIRE_STATUS_OK,
            last_pcd_error: None,
        }
    }

    pub fn base(&self) -> &TagBase {
        &self.base
    }

    pub fn connect(&mut self, device: &mut Device<Initialized>) -> Result<()> {
        if self.base.kind() != TagKind::Desfire4k {
            return Err(wrong_type());
        }
        self.base.connect(device)?;
        self.reset_session();
        Ok(())
    }

    pub fn disconnect(&mut self, device: &mut Device<Initialized>) -> Result<()> {
        if self.base.kind() != TagKind::Desfire4k {
            return Err(wrong_type());
        }
        self.base.disconnect(device)?;
        self.reset_session();
        Ok(())
    }

    fn reset_session(&mut self) {
        self.session = SessionState::Idle;
        self.selected_application = None;
        self.last_picc_error = DESFIRE_STATUS_OK;
        self.last_pcd_error = None;
    }

    pub fn session_state(&self) -> &SessionState {
        &self.session
    }

    /// Key negotiated by the last successful authentication.
    pub fn session_key(&self) -> Option<&DesfireKey> {
        match &self.session {
            SessionState::Authenticated { session_key, .. } => Some(session_key),
            _ => None,
        }
    }

    pub fn authenticated_key_no(&self) -> Option<u8> {
        match self.session {
            SessionState::Authenticated { key_no, .. } => Some(key_no),
            _ => None,
        }
    }

    pub fn selected_application(&self) -> Option<DesfireAid> {
        self.selected_application
    }

    /// Status byte of the last card-side failure, `0x00` if none.
    pub fn last_picc_error(&self) -> u8 {
        self.last_picc_error
    }

    /// Reader-side failure of the last command, if any.
    pub fn last_pcd_error(&self) -> Option<&Error> {
        self.last_pcd_error.as_ref()
    }

    /// Guards run at the start of every command; clears the error slots.
    fn begin(&mut self) -> Result<()> {
        if self.base.kind() != TagKind::Desfire4k {
            return Err(wrong_type());
        }
        self.base.ensure_active()?;
        self.last_picc_error = DESFIRE_STATUS_OK;
        self.last_pcd_error = None;
        Ok(())
    }

    /// One frame round trip. Returns the status and the payload after it.
    fn exchange(&mut self, device: &mut Device<Initialized>, frame: &[u8]) -> Result<(u8, Vec<u8>)> {
        let resp = match device.transceive(frame) {
            Ok(resp) => resp,
            Err(e) => {
                self.last_pcd_error = Some(e.clone());
                return Err(e);
            }
        };
        let Some((&status, payload)) = resp.split_first() else {
            let e = Error::InvalidLength {
                expected: 1,
                actual: 0,
            };
            self.last_pcd_error = Some(e.clone());
            return Err(e);
        };
        match status {
            DESFIRE_STATUS_OK | DESFIRE_STATUS_ADDITIONAL_FRAME => Ok((status, payload.to_vec())),
            _ => {
                self.last_picc_error = status;
                debug!("card answered {:#04x} to command {:#04x}", status, frame[0]);
                Err(Error::Card { status })
            }
        }
    }

    /// Send `command` and gather every continuation frame of the answer.
    fn transact(&mut self, device: &mut Device<Initialized>, command: &[u8]) -> Result<Vec<u8>> {
        let (mut status, mut data) = self.exchange(device, command)?;
        while status == DESFIRE_STATUS_ADDITIONAL_FRAME {
            let (next_status, more) = self.exchange(device, &[DESFIRE_CMD_ADDITIONAL_FRAME])?;
            data.extend_from_slice(&more);
            status = next_status;
        }
        Ok(data)
    }

    /// Legacy DES / 3DES mutual authentication against key slot `key_no`.
    ///
    /// Both tokens sent to the card are CBC-enciphered, and both received
    /// tokens are deciphered. Legacy cards that expect the reader to
    /// decipher its outbound token as well will reject the second frame
    /// with an authentication error.
    pub fn authenticate(
        &mut self,
        device: &mut Device<Initialized>,
        key_no: u8,
        key: &DesfireKey,
    ) -> Result<()> {
        let rnd_a: [u8; 8] = rand::random();
        self.authenticate_with_challenge(device, key_no, key, rnd_a)
    }

    pub(crate) fn authenticate_with_challenge(
        &mut self,
        device: &mut Device<Initialized>,
        key_no: u8,
        key: &DesfireKey,
        rnd_a: [u8; 8],
    ) -> Result<()> {
        self.begin()?;
        self.session = SessionState::Authenticating { key_no };

        match self.handshake(device, key_no, key, rnd_a) {
            Ok(session_key) => {
                debug!("authenticated with key {}", key_no);
                self.session = SessionState::Authenticated {
                    key_no,
                    session_key,
                };
                Ok(())
            }
            Err(e) => {
                debug!("authentication with key {} failed: {}", key_no, e);
                self.session = SessionState::Idle;
                Err(e)
            }
        }
    }

    fn handshake(
        &mut self,
        device: &mut Device<Initialized>,
        key_no: u8,
        key: &DesfireKey,
        rnd_a: [u8; 8],
    ) -> Result<DesfireKey> {
        let (status, challenge) = self.exchange(device, &[DESFIRE_CMD_AUTHENTICATE, key_no])?;
        if status != DESFIRE_STATUS_ADDITIONAL_FRAME {
            return Err(Error::AuthenticationFailed);
        }
        let mut rnd_b: [u8; 8] = challenge.as_slice().try_into().map_err(|_| Error::InvalidLength {
            expected: 8,
            actual: challenge.len(),
        })?;
        let mut iv = [0u8; 8];
        cbc_transform(key, &mut rnd_b, &mut iv, Direction::Receive)?;

        let mut token = [0u8; 16];
        token[..8].copy_from_slice(&rnd_a);
        token[8..].copy_from_slice(&rotate_left(rnd_b));
        let mut iv = [0u8; 8];
        cbc_transform(key, &mut token, &mut iv, Direction::Send)?;

        let mut frame = Vec::with_capacity(17);
        frame.push(DESFIRE_CMD_ADDITIONAL_FRAME);
        frame.extend_from_slice(&token);
        let (status, answer) = self.exchange(device, &frame)?;
        if status != DESFIRE_STATUS_OK {
            return Err(Error::AuthenticationFailed);
        }
        let mut rnd_a_rotated: [u8; 8] = answer.as_slice().try_into().map_err(|_| Error::InvalidLength {
            expected: 8,
            actual: answer.len(),
        })?;
        let mut iv = [0u8; 8];
        cbc_transform(key, &mut rnd_a_rotated, &mut iv, Direction::Receive)?;

        if rnd_a_rotated != rotate_left(rnd_a) {
            warn!("card proof of key {} does not match our challenge", key_no);
            return Err(Error::AuthenticationFailed);
        }
        Ok(DesfireKey::session(key.kind(), &rnd_a, &rnd_b))
    }

    /// Select an application. Authentication does not survive the switch.
    pub fn select_application(&mut self, device: &mut Device<Initialized>, aid: DesfireAid) -> Result<()> {
        self.begin()?;
        self.session = SessionState::Idle;
        let mut cmd = vec![DESFIRE_CMD_SELECT_APPLICATION];
        cmd.extend_from_slice(aid.as_bytes());
        self.transact(device, &cmd)?;
        self.selected_application = Some(aid);
        Ok(())
    }

    pub fn application_ids(&mut self, device: &mut Device<Initialized>) -> Result<Vec<DesfireAid>> {
        self.begin()?;
        let data = self.transact(device, &[DESFIRE_CMD_GET_APPLICATION_IDS])?;
        if data.len() % 3 != 0 {
            return Err(Error::CorruptData(format!(
                "application id list of {} bytes",
                data.len()
            )));
        }
        Ok(data
            .chunks_exact(3)
            .map(|c| DesfireAid::new([c[0], c[1], c[2]]))
            .collect())
    }

    pub fn create_application(
        &mut self,
        device: &mut Device<Initialized>,
        aid: DesfireAid,
        settings: u8,
        key_count: u8,
    ) -> Result<()> {
        self.begin()?;
        let mut cmd = vec![DESFIRE_CMD_CREATE_APPLICATION];
        cmd.extend_from_slice(aid.as_bytes());
        cmd.push(settings);
        cmd.push(key_count);
        self.transact(device, &cmd)?;
        Ok(())
    }

    pub fn delete_application(&mut self, device: &mut Device<Initialized>, aid: DesfireAid) -> Result<()> {
        self.begin()?;
        let mut cmd = vec![DESFIRE_CMD_DELETE_APPLICATION];
        cmd.extend_from_slice(aid.as_bytes());
        self.transact(device, &cmd)?;
        Ok(())
    }

    /// Erase every application. Needs PICC master key authentication.
    pub fn format_picc(&mut self, device: &mut Device<Initialized>) -> Result<()> {
        self.begin()?;
        self.transact(device, &[DESFIRE_CMD_FORMAT_PICC])?;
        Ok(())
    }

    pub fn version(&mut self, device: &mut Device<Initialized>) -> Result<DesfireVersion> {
        self.begin()?;
        let data = self.transact(device, &[DESFIRE_CMD_GET_VERSION])?;
        DesfireVersion::parse(&data)
    }

    /// Key settings byte and number of keys of the selected application.
    pub fn key_settings(&mut self, device: &mut Device<Initialized>) -> Result<(u8, u8)> {
        self.begin()?;
        let data = self.transact(device, &[DESFIRE_CMD_GET_KEY_SETTINGS])?;
        match data.as_slice() {
            [settings, max_keys] => Ok((*settings, *max_keys)),
            _ => Err(Error::InvalidLength {
                expected: 2,
                actual: data.len(),
            }),
        }
    }

    pub fn key_version(&mut self, device: &mut Device<Initialized>, key_no: u8) -> Result<u8> {
        self.begin()?;
        let data = self.transact(device, &[DESFIRE_CMD_GET_KEY_VERSION, key_no])?;
        match data.as_slice() {
            [version] => Ok(*version),
            _ => Err(Error::InvalidLength {
                expected: 1,
                actual: data.len(),
            }),
        }
    }

    pub fn file_ids(&mut self, device: &mut Device<Initialized>) -> Result<Vec<u8>> {
        self.begin()?;
        self.transact(device, &[DESFIRE_CMD_GET_FILE_IDS])
    }

    /// Read `length` bytes of a data file from `offset`; `length == 0` reads
    /// to the end of the file.
    pub fn read_data(
        &mut self,
        device: &mut Device<Initialized>,
        file_no: u8,
        offset: u32,
        length: u32,
    ) -> Result<Vec<u8>> {
        self.begin()?;
        check_u24("offset", offset)?;
        check_u24("length", length)?;

        let mut cmd = Vec::with_capacity(8);
        cmd.push(DESFIRE_CMD_READ_DATA);
        cmd.push(file_no);
        push_u24(&mut cmd, offset);
        push_u24(&mut cmd, length);
        let data = self.transact(device, &cmd)?;

        if length != 0 && data.len() != length as usize {
            return Err(Error::InvalidLength {
                expected: length as usize,
                actual: data.len(),
            });
        }
        Ok(data)
    }

    /// Write `data` to a data file at `offset`, returning the byte count.
    pub fn write_data(
        &mut self,
        device: &mut Device<Initialized>,
        file_no: u8,
        offset: u32,
        data: &[u8],
    ) -> Result<usize> {
        self.begin()?;
        check_u24("offset", offset)?;
        let length = u32::try_from(data.len()).unwrap_or(u32::MAX);
        check_u24("length", length)?;

        let first = data.len().min(DESFIRE_WRITE_FIRST_CHUNK);
        let mut frame = Vec::with_capacity(8 + first);
        frame.push(DESFIRE_CMD_WRITE_DATA);
        frame.push(file_no);
        push_u24(&mut frame, offset);
        push_u24(&mut frame, length);
        frame.extend_from_slice(&data[..first]);

        let (mut status, _) = self.exchange(device, &frame)?;
        let mut rest = data[first..].chunks(DESFIRE_WRITE_NEXT_CHUNK);
        while status == DESFIRE_STATUS_ADDITIONAL_FRAME {
            let Some(chunk) = rest.next() else {
                return Err(Error::CorruptData(
                    "card expects more data than was written".into(),
                ));
            };
            let mut frame = Vec::with_capacity(1 + chunk.len());
            frame.push(DESFIRE_CMD_ADDITIONAL_FRAME);
            frame.extend_from_slice(chunk);
            status = self.exchange(device, &frame)?.0;
        }
        if rest.next().is_some() {
            return Err(Error::CorruptData(
                "card finished before all data was sent".into(),
            ));
        }
        Ok(data.len())
    }

    /// Current value of a value file.
    pub fn value(&mut self, device: &mut Device<Initialized>, file_no: u8) -> Result<i32> {
        self.begin()?;
        let data = self.transact(device, &[DESFIRE_CMD_GET_VALUE, file_no])?;
        let bytes: [u8; 4] = data.as_slice().try_into().map_err(|_| Error::InvalidLength {
            expected: 4,
            actual: data.len(),
        })?;
        Ok(i32::from_le_bytes(bytes))
    }
}
