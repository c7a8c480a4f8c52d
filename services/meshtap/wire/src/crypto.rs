//! Channel key derivation and the payload stream cipher.
//!
//! Payloads are encrypted with AES in counter mode. The key comes from the
//! channel's base64 key text, the counter block from the packet id and the
//! sending node, so the same function both encrypts and decrypts.

use aes::cipher::generic_array::GenericArray;
use aes::cipher::{KeyIvInit, StreamCipher};
use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use std::fmt;

type Aes128Ctr = ctr::Ctr128BE<aes::Aes128>;
type Aes256Ctr = ctr::Ctr128BE<aes::Aes256>;

/// Key used when a channel is configured with a single-byte key
pub const DEFAULT_PSK: [u8; 16] = [
    0xd4, 0xf1, 0xbb, 0x3a, 0x20, 0x29, 0x07, 0x59, 0xf0, 0xbc, 0xff, 0xab, 0xcf, 0x4e, 0x69, 0x01,
];

/// Key text of the default public channel
pub const DEFAULT_CHANNEL_KEY: &str = "AQ==";

/// Maximum raw channel key length in bytes
pub const MAX_KEY_LEN: usize = 32;

/// Counter block size in bytes
pub const IV_SIZE: usize = 16;

/// Concrete cipher key derived from a channel key
#[derive(Clone, PartialEq, Eq)]
pub enum ChannelKey {
    /// Channel is not encrypted; the cipher is a passthrough
    Unencrypted,
    /// AES-128 key
    Aes128([u8; 16]),
    /// AES-256 key
    Aes256([u8; 32]),
}

impl ChannelKey {
    /// Derive the key from its base64 text
    pub fn derive(base64_key: &str) -> Result<Self, crate::WireError> {
        let raw = BASE64_STANDARD.decode(base64_key.trim())?;
        Self::from_raw(&raw)
    }

    /// Derive the key from already-decoded key bytes
    pub fn from_raw(raw: &[u8]) -> Result<Self, crate::WireError> {
        match raw.len() {
            0 => Ok(ChannelKey::Unencrypted),
            1 => {
                // single byte selects a variant of the default key, 1 being the key itself
                let mut key = DEFAULT_PSK;
                key[15] = key[15].wrapping_add(raw[0].wrapping_sub(1));
                Ok(ChannelKey::Aes128(key))
            }
            2..=16 => {
                let mut key = [0u8; 16];
                key[..raw.len()].copy_from_slice(raw);
                Ok(ChannelKey::Aes128(key))
            }
            17..=MAX_KEY_LEN => {
                let mut key = [0u8; 32];
                key[..raw.len()].copy_from_slice(raw);
                Ok(ChannelKey::Aes256(key))
            }
            len => Err(crate::WireError::Key(len)),
        }
    }

    /// Whether payloads on this channel are encrypted
    pub fn is_encrypted(&self) -> bool {
        !matches!(self, ChannelKey::Unencrypted)
    }

    /// Key size in bits (0 when unencrypted)
    pub fn bits(&self) -> usize {
        match self {
            ChannelKey::Unencrypted => 0,
            ChannelKey::Aes128(_) => 128,
            ChannelKey::Aes256(_) => 256,
        }
    }

    /// Raw key bytes
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            ChannelKey::Unencrypted => &[],
            ChannelKey::Aes128(key) => &key[..],
            ChannelKey::Aes256(key) => &key[..],
        }
    }
}

impl Default for ChannelKey {
    fn default() -> Self {
        ChannelKey::Aes128(DEFAULT_PSK)
    }
}

// keys stay out of logs
impl fmt::Debug for ChannelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelKey::Unencrypted => write!(f, "ChannelKey::Unencrypted"),
            _ => write!(f, "ChannelKey::Aes{}(..)", self.bits()),
        }
    }
}

/// Build the counter block for a packet
pub fn packet_iv(packet_id: u32, src: u32) -> [u8; IV_SIZE] {
    let mut iv = [0u8; IV_SIZE];
    iv[0..4].copy_from_slice(&packet_id.to_le_bytes());
    iv[8..12].copy_from_slice(&src.to_le_bytes());
    iv
}

/// Encrypt or decrypt `data` in place for the given packet
pub fn apply_keystream(key: &ChannelKey, packet_id: u32, src: u32, data: &mut [u8]) {
    let iv = packet_iv(packet_id, src);
    let iv = GenericArray::from_slice(&iv);
    match key {
        ChannelKey::Unencrypted => {}
        ChannelKey::Aes128(k) => Aes128Ctr::new(GenericArray::from_slice(k), iv).apply_keystream(data),
        ChannelKey::Aes256(k) => Aes256Ctr::new(GenericArray::from_slice(k), iv).apply_keystream(data),
    }
}

/// Encrypt or decrypt a copy of `data` for the given packet
pub fn transform(key: &ChannelKey, packet_id: u32, src: u32, data: &[u8]) -> Vec<u8> {
    let mut out = data.to_vec();
    apply_keystream(key, packet_id, src, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_key_is_unencrypted() {
        assert_eq!(ChannelKey::derive("").unwrap(), ChannelKey::Unencrypted);
    }

    #[test]
    fn test_single_byte_keys() {
        // 0x01
        assert_eq!(ChannelKey::derive("AQ==").unwrap(), ChannelKey::Aes128(DEFAULT_PSK));

        // 0x02
        let mut expected = DEFAULT_PSK;
        expected[15] = 0x02;
        assert_eq!(ChannelKey::derive("Ag==").unwrap(), ChannelKey::Aes128(expected));

        // 0x00 wraps below the default last byte
        let mut expected = DEFAULT_PSK;
        expected[15] = 0x00;
        assert_eq!(ChannelKey::from_raw(&[0x00]).unwrap(), ChannelKey::Aes128(expected));

        // 0xFF wraps modulo 256
        let mut expected = DEFAULT_PSK;
        expected[15] = 0xFF;
        assert_eq!(ChannelKey::from_raw(&[0xFF]).unwrap(), ChannelKey::Aes128(expected));
    }

    #[test]
    fn test_short_keys_zero_padded() {
        let key = ChannelKey::from_raw(&[0xAB, 0xCD]).unwrap();
        let mut expected = [0u8; 16];
        expected[0] = 0xAB;
        expected[1] = 0xCD;
        assert_eq!(key, ChannelKey::Aes128(expected));

        let raw = [0x11u8; 16];
        assert_eq!(ChannelKey::from_raw(&raw).unwrap(), ChannelKey::Aes128(raw));
    }

    #[test]
    fn test_long_keys_zero_padded() {
        let raw = [0x22u8; 17];
        match ChannelKey::from_raw(&raw).unwrap() {
            ChannelKey::Aes256(key) => {
                assert_eq!(&key[..17], &raw[..]);
                assert!(key[17..].iter().all(|b| *b == 0));
            }
            other => panic!("unexpected key {:?}", other),
        }

        let raw = [0x33u8; 32];
        assert_eq!(ChannelKey::from_raw(&raw).unwrap(), ChannelKey::Aes256(raw));
    }

    #[test]
    fn test_oversized_key_rejected() {
        let text = BASE64_STANDARD.encode([0u8; 33]);
        let err = ChannelKey::derive(&text).unwrap_err();
        assert!(matches!(err, crate::WireError::Key(33)));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_invalid_base64_rejected() {
        assert!(matches!(
            ChannelKey::derive("not base64!"),
            Err(crate::WireError::Base64(_))
        ));
    }

    #[test]
    fn test_iv_layout() {
        let iv = packet_iv(0x01020304, 0xA1B2C3D4);
        assert_eq!(
            iv,
            [0x04, 0x03, 0x02, 0x01, 0, 0, 0, 0, 0xD4, 0xC3, 0xB2, 0xA1, 0, 0, 0, 0]
        );
    }

    #[test]
    fn test_cipher_is_symmetric() {
        let plaintext = b"a payload that spans more than one sixteen byte block".to_vec();
        let keys = [
            ChannelKey::default(),
            ChannelKey::from_raw(&[0x5Au8; 32]).unwrap(),
        ];

        for key in keys {
            let ciphertext = transform(&key, 0x0BADCAFE, 0x12345678, &plaintext);
            assert_eq!(ciphertext.len(), plaintext.len());
            assert_ne!(ciphertext, plaintext);
            assert_eq!(transform(&key, 0x0BADCAFE, 0x12345678, &ciphertext), plaintext);
        }
    }

    #[test]
    fn test_iv_inputs_change_keystream() {
        let key = ChannelKey::default();
        let data = [0u8; 16];
        assert_ne!(transform(&key, 1, 2, &data), transform(&key, 2, 2, &data));
        assert_ne!(transform(&key, 1, 2, &data), transform(&key, 1, 3, &data));
    }

    #[test]
    fn test_unencrypted_passthrough() {
        let data = b"plain".to_vec();
        assert_eq!(transform(&ChannelKey::Unencrypted, 9, 9, &data), data);
    }

    #[test]
    fn test_debug_hides_key() {
        let text = format!("{:?}", ChannelKey::default());
        assert_eq!(text, "ChannelKey::Aes128(..)");
    }
}
