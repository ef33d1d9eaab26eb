// freefare-rs/freefare/src/crypto/cbc.rs

use des::cipher::generic_array::GenericArray;
use des::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use des::{Des, TdesEde2};

use super::key::{DesfireKey, DesfireKeyKind};
use crate::{Error, Result};

pub const BLOCK_SIZE: usize = 8;

/// Which way a buffer travels between PCD and PICC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// PCD -> PICC: XOR with the IV, then encipher.
    Send,
    /// PICC -> PCD: decipher, then XOR with the previous ciphertext block.
    Receive,
}

enum BlockCipher {
    Single(Des),
    Double(TdesEde2),
}

impl BlockCipher {
    fn new(key: &DesfireKey) -> Self {
        let data = key.as_bytes();
        match key.kind() {
            DesfireKeyKind::Des => BlockCipher::Single(Des::new(GenericArray::from_slice(&data[..8]))),
            DesfireKeyKind::TripleDes => {
                BlockCipher::Double(TdesEde2::new(GenericArray::from_slice(&data[..])))
            }
        }
    }

    fn encrypt(&self, block: &mut [u8]) {
        let block = GenericArray::from_mut_slice(block);
        match self {
            BlockCipher::Single(c) => c.encrypt_block(block),
            BlockCipher::Double(c) => c.encrypt_block(block),
        }
    }

    fn decrypt(&self, block: &mut [u8]) {
        let block = GenericArray::from_mut_slice(block);
        match self {
            BlockCipher::Single(c) => c.decrypt_block(block),
            BlockCipher::Double(c) => c.decrypt_block(block),
        }
    }
}

fn xor_in_place(block: &mut [u8], iv: &[u8; BLOCK_SIZE]) {
    for (b, v) in block.iter_mut().zip(iv.iter()) {
        *b ^= v;
    }
}

/// Run DESFire CBC over `data` in place, chaining through `iv`.
///
/// On return `iv` holds the last ciphertext block of this direction so the
/// caller can continue the chain across frames.
pub fn cbc_transform(
    key: &DesfireKey,
    data: &mut [u8],
    iv: &mut [u8; BLOCK_SIZE],
    direction: Direction,
) -> Result<()> {
    if data.len() % BLOCK_SIZE != 0 {
        return Err(Error::InvalidArgument(format!(
            "CBC buffer length {} is not a multiple of {}",
            data.len(),
            BLOCK_SIZE
        )));
    }

    let cipher = BlockCipher::new(key);
    for block in data.chunks_exact_mut(BLOCK_SIZE) {
        match direction {
            Direction::Send => {
                xor_in_place(block, iv);
                cipher.encrypt(block);
                iv.copy_from_slice(block);
            }
            Direction::Receive => {
                let mut ciphertext = [0u8; BLOCK_SIZE];
                ciphertext.copy_from_slice(block);
                cipher.decrypt(block);
                xor_in_place(block, iv);
                *iv = ciphertext;
            }
        }
    }
    Ok(())
}
