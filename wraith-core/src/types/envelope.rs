//! The envelope wire format.
//!
//! The envelope carries the payment's ephemeral private key to the recipient.
//! It is embedded in the memo/label field of the on-chain payment and is the
//! only persisted artifact the protocol defines, so the layout is fixed:
//!
//! ```text
//! nonce (16) || ciphertext (64)
//! ciphertext = (eph_priv (32) || eph_pub (32)) XOR keystream
//! ```

use serde::{Deserialize, Serialize};

use crate::constants::{ENVELOPE_NONCE_SIZE, ENVELOPE_SIZE};
use crate::error::{Result, WraithError};

/// An encrypted ephemeral-key envelope.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Envelope {
    bytes: [u8; ENVELOPE_SIZE],
}

impl Envelope {
    /// Creates an envelope from raw bytes.
    ///
    /// # Errors
    /// Returns `InvalidEnvelopeSize` unless exactly `ENVELOPE_SIZE` bytes are given.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != ENVELOPE_SIZE {
            return Err(WraithError::InvalidEnvelopeSize {
                expected: ENVELOPE_SIZE,
                actual: bytes.len(),
            });
        }

        let mut arr = [0u8; ENVELOPE_SIZE];
        arr.copy_from_slice(bytes);
        Ok(Self { bytes: arr })
    }

    /// Assembles an envelope from its nonce and ciphertext halves.
    pub fn from_parts(
        nonce: &[u8; ENVELOPE_NONCE_SIZE],
        ciphertext: &[u8; ENVELOPE_SIZE - ENVELOPE_NONCE_SIZE],
    ) -> Self {
        let mut bytes = [0u8; ENVELOPE_SIZE];
        bytes[..ENVELOPE_NONCE_SIZE].copy_from_slice(nonce);
        bytes[ENVELOPE_NONCE_SIZE..].copy_from_slice(ciphertext);
        Self { bytes }
    }

    /// Returns the raw envelope bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the nonce prefix.
    pub fn nonce(&self) -> &[u8] {
        &self.bytes[..ENVELOPE_NONCE_SIZE]
    }

    /// Returns the encrypted payload.
    pub fn ciphertext(&self) -> &[u8] {
        &self.bytes[ENVELOPE_NONCE_SIZE..]
    }

    /// Returns the hex encoding (memo field format).
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    /// Parses a hex string (with or without 0x prefix).
    pub fn from_hex(s: &str) -> Result<Self> {
        let s = s.trim();
        let bytes = hex::decode(s.strip_prefix("0x").unwrap_or(s))?;
        Self::from_bytes(&bytes)
    }
}

impl std::fmt::Debug for Envelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Envelope({}...)", hex::encode(&self.bytes[..8]))
    }
}

impl Serialize for Envelope {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Envelope {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
