//! Public key types for WRAITH.
//!
//! - [`PublicKey`]: A compressed Edwards point (32 bytes), displayed as base58
//! - [`MetaAddress`]: The recipient's published (spend, view) public key pair
//!
//! Secret material never lives in this crate; see `wraith-crypto` for the
//! zeroizing containers.

use serde::{Deserialize, Serialize};

use crate::constants::{PROTOCOL_VERSION, PUBLIC_KEY_SIZE};
use crate::error::{Result, WraithError};

// ═══════════════════════════════════════════════════════════════════════════════
// PUBLIC KEY
// ═══════════════════════════════════════════════════════════════════════════════

/// A compressed Ed25519 point.
///
/// This type only checks the length. Curve membership is validated when the
/// point is decompressed in `wraith-crypto`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey {
    bytes: [u8; PUBLIC_KEY_SIZE],
}

impl PublicKey {
    /// Creates a public key from raw bytes.
    ///
    /// # Errors
    /// Returns error if bytes length doesn't match `PUBLIC_KEY_SIZE`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != PUBLIC_KEY_SIZE {
            return Err(WraithError::InvalidKeySize {
                expected: PUBLIC_KEY_SIZE,
                actual: bytes.len(),
            });
        }

        let mut arr = [0u8; PUBLIC_KEY_SIZE];
        arr.copy_from_slice(bytes);
        Ok(Self { bytes: arr })
    }

    /// Creates a public key from a fixed-size array.
    pub fn from_array(bytes: [u8; PUBLIC_KEY_SIZE]) -> Self {
        Self { bytes }
    }

    /// Returns the raw bytes of the public key.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the public key as a fixed-size array reference.
    pub fn as_array(&self) -> &[u8; PUBLIC_KEY_SIZE] {
        &self.bytes
    }

    /// Returns the base58 encoding (Solana address format).
    pub fn to_base58(&self) -> String {
        bs58::encode(&self.bytes).into_string()
    }

    /// Parses a base58 string.
    pub fn from_base58(s: &str) -> Result<Self> {
        let bytes = bs58::decode(s.trim()).into_vec()?;
        Self::from_bytes(&bytes)
    }

    /// Returns the hex encoding with 0x prefix (Sui address format).
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.bytes))
    }

    /// Parses a hex string (with or without 0x prefix).
    pub fn from_hex(s: &str) -> Result<Self> {
        let s = s.trim();
        let bytes = hex::decode(s.strip_prefix("0x").unwrap_or(s))?;
        Self::from_bytes(&bytes)
    }

    /// Parses either encoding: `0x`-prefixed hex or base58.
    pub fn parse(s: &str) -> Result<Self> {
        if s.trim().starts_with("0x") {
            Self::from_hex(s)
        } else {
            Self::from_base58(s)
        }
    }

    /// Returns true if all bytes are zero.
    pub fn is_zero(&self) -> bool {
        self.bytes.iter().all(|&b| b == 0)
    }
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PublicKey({})", self.to_base58())
    }
}

impl std::fmt::Display for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_base58())
    }
}

impl std::str::FromStr for PublicKey {
    type Err = WraithError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

// Serde implementation that uses base58 encoding
impl Serialize for PublicKey {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_base58())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// META-ADDRESS
// ═══════════════════════════════════════════════════════════════════════════════

/// A recipient's published meta-address.
///
/// Payers need both halves: `view_pub` for the ECDH that yields the tweak and
/// the envelope key, `spend_pub` as the base the tweak offsets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaAddress {
    /// Protocol version (for forward compatibility)
    pub version: u8,
    /// Spend public key, offset by the tweak into each stealth address
    pub spend_pub: PublicKey,
    /// View public key, target of the payer's ECDH
    pub view_pub: PublicKey,
}

impl MetaAddress {
    /// Creates a new meta-address with the current protocol version.
    pub fn new(spend_pub: PublicKey, view_pub: PublicKey) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            spend_pub,
            view_pub,
        }
    }

    /// Validates the meta-address structure.
    pub fn validate(&self) -> Result<()> {
        if self.version != PROTOCOL_VERSION {
            return Err(WraithError::VersionMismatch {
                expected: PROTOCOL_VERSION,
                actual: self.version,
            });
        }

        if self.spend_pub.is_zero() {
            return Err(WraithError::MalformedKey("spend key is all zeros".into()));
        }

        if self.view_pub.is_zero() {
            return Err(WraithError::MalformedKey("view key is all zeros".into()));
        }

        if self.spend_pub == self.view_pub {
            return Err(WraithError::MalformedKey(
                "spend and view keys must differ".into(),
            ));
        }

        Ok(())
    }

    /// Serializes to compact binary format.
    ///
    /// Format: version (1) || spend_pub (32) || view_pub (32)
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(1 + 2 * PUBLIC_KEY_SIZE);
        bytes.push(self.version);
        bytes.extend_from_slice(self.spend_pub.as_bytes());
        bytes.extend_from_slice(self.view_pub.as_bytes());
        bytes
    }

    /// Deserializes from compact binary format.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let expected = 1 + 2 * PUBLIC_KEY_SIZE;
        if bytes.len() != expected {
            return Err(WraithError::InvalidKeySize {
                expected,
                actual: bytes.len(),
            });
        }

        let meta = Self {
            version: bytes[0],
            spend_pub: PublicKey::from_bytes(&bytes[1..1 + PUBLIC_KEY_SIZE])?,
            view_pub: PublicKey::from_bytes(&bytes[1 + PUBLIC_KEY_SIZE..])?,
        };

        meta.validate()?;
        Ok(meta)
    }

    /// Encodes to a base58 string for sharing.
    pub fn to_base58(&self) -> String {
        bs58::encode(self.to_bytes()).into_string()
    }

    /// Decodes from a base58 string.
    pub fn from_base58(s: &str) -> Result<Self> {
        let bytes = bs58::decode(s.trim()).into_vec()?;
        Self::from_bytes(&bytes)
    }
}
