// freefare-rs/freefare/src/crypto/key.rs

/// DESFire key algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DesfireKeyKind {
    Des,
    TripleDes,
}

/// DESFire DES / 3DES key.
///
/// Key material always occupies a 16 byte slot: a DES key is stored twice so
/// that it behaves as a 2-key 3DES key with identical halves. The least
/// significant bit of each of the first 8 bytes (the DES parity bit) carries
/// the key version.
#[derive(Clone, PartialEq, Eq)]
pub struct DesfireKey {
    data: [u8; 16],
    kind: DesfireKeyKind,
}

impl DesfireKey {
    /// DES key with its version bits cleared.
    pub fn des(value: [u8; 8]) -> Self {
        let mut key = Self::des_with_version(value);
        key.set_version(0);
        key
    }

    /// DES key keeping the version encoded in `value`'s parity bits.
    pub fn des_with_version(value: [u8; 8]) -> Self {
        let mut data = [0u8; 16];
        data[..8].copy_from_slice(&value);
        data[8..].copy_from_slice(&value);
        Self {
            data,
            kind: DesfireKeyKind::Des,
        }
    }

    /// 2-key 3DES key with its version bits cleared.
    pub fn triple_des(value: [u8; 16]) -> Self {
        let mut key = Self::triple_des_with_version(value);
        key.set_version(0);
        key
    }

    pub fn triple_des_with_version(value: [u8; 16]) -> Self {
        Self {
            data: value,
            kind: DesfireKeyKind::TripleDes,
        }
    }

    /// Derive the session key negotiated by an authentication handshake.
    pub fn session(kind: DesfireKeyKind, rnd_a: &[u8; 8], rnd_b: &[u8; 8]) -> Self {
        let mut buffer = [0u8; 16];
        buffer[..4].copy_from_slice(&rnd_a[..4]);
        buffer[4..8].copy_from_slice(&rnd_b[..4]);
        match kind {
            DesfireKeyKind::Des => {
                let mut half = [0u8; 8];
                half.copy_from_slice(&buffer[..8]);
                Self::des_with_version(half)
            }
            DesfireKeyKind::TripleDes => {
                buffer[8..12].copy_from_slice(&rnd_a[4..]);
                buffer[12..].copy_from_slice(&rnd_b[4..]);
                Self::triple_des_with_version(buffer)
            }
        }
    }

    pub fn kind(&self) -> DesfireKeyKind {
        self.kind
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.data
    }

    pub fn version(&self) -> u8 {
        self.data[..8]
            .iter()
            .enumerate()
            .fold(0u8, |v, (n, b)| v | ((b & 0x01) << (7 - n)))
    }

    pub fn set_version(&mut self, version: u8) {
        for n in 0..8 {
            let bit = (version >> (7 - n)) & 0x01;
            self.data[n] = (self.data[n] & 0xFE) | bit;
            match self.kind {
                DesfireKeyKind::Des => self.data[n + 8] = self.data[n],
                // Inverted in the second half so both halves never become equal
                DesfireKeyKind::TripleDes => {
                    self.data[n + 8] = (self.data[n + 8] & 0xFE) | (bit ^ 0x01)
                }
            }
        }
    }
}

impl std::fmt::Debug for DesfireKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DesfireKey")
            .field("kind", &self.kind)
            .field("version", &self.version())
            .finish_non_exhaustive()
    }
}
