//! Ed25519 scalar and point primitives.
//!
//! Thin, typed layer over `curve25519-dalek`. Secret-dependent operations
//! (base-point and variable-base multiplication, scalar addition) use the
//! library's constant-time implementations.
//!
//! ## Key model
//!
//! Private keys are 32-byte ed25519 seeds. The scalar behind a seed is
//! derived the RFC 8032 way:
//!
//! ```text
//! scalar = clamp(SHA-512(seed)[0..32]) mod L
//! public = scalar · G
//! ```
//!
//! so a [`KeyPair`] built here has the same public key an ed25519 wallet
//! would show for that seed.

use curve25519_dalek::edwards::{CompressedEdwardsY, EdwardsPoint};
use curve25519_dalek::scalar::{clamp_integer, Scalar};
use rand::{CryptoRng, RngCore};
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

use wraith_core::constants::{PUBLIC_KEY_SIZE, SECRET_KEY_SIZE};
use wraith_core::error::{Result, WraithError};
use wraith_core::types::PublicKey;

use crate::hash::sha512;

// ═══════════════════════════════════════════════════════════════════════════════
// SCALARS
// ═══════════════════════════════════════════════════════════════════════════════

/// Clamps 32 bytes per RFC 8032 and reduces the result modulo `L`.
///
/// Clears the low three bits, clears bit 255, sets bit 254.
pub fn clamp_scalar(bytes: [u8; 32]) -> Scalar {
    Scalar::from_bytes_mod_order(clamp_integer(bytes))
}

/// Derives the signing scalar of an ed25519 seed (hash, then clamp).
pub fn scalar_from_seed(seed: &[u8; SECRET_KEY_SIZE]) -> Scalar {
    let mut digest = sha512(&[seed]);
    let mut lower = [0u8; 32];
    lower.copy_from_slice(&digest[..32]);
    let scalar = clamp_scalar(lower);
    digest.zeroize();
    lower.zeroize();
    scalar
}

/// Interprets 32 little-endian bytes as a scalar, reduced modulo `L`.
pub fn bytes_to_scalar_le(bytes: &[u8; 32]) -> Scalar {
    Scalar::from_bytes_mod_order(*bytes)
}

/// Canonical little-endian encoding of a scalar.
pub fn scalar_to_bytes_le(scalar: &Scalar) -> [u8; 32] {
    scalar.to_bytes()
}

// ═══════════════════════════════════════════════════════════════════════════════
// POINTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Computes `scalar · G`.
pub fn scalar_mult_base(scalar: &Scalar) -> EdwardsPoint {
    EdwardsPoint::mul_base(scalar)
}

/// Computes `P + Q`.
pub fn point_add(p: &EdwardsPoint, q: &EdwardsPoint) -> EdwardsPoint {
    p + q
}

/// Decompresses a public key into a curve point.
///
/// # Errors
/// `MalformedKey` if the bytes are not a valid encoding, or if the point has a
/// small-order component.
pub fn decode_point(key: &PublicKey) -> Result<EdwardsPoint> {
    let point = CompressedEdwardsY(*key.as_array())
        .decompress()
        .ok_or_else(|| WraithError::MalformedKey(format!("{key} is not on the curve")))?;

    if !point.is_torsion_free() {
        return Err(WraithError::MalformedKey(format!(
            "{key} is not in the prime-order subgroup"
        )));
    }

    Ok(point)
}

/// Compresses a curve point into a public key.
pub fn encode_point(point: &EdwardsPoint) -> PublicKey {
    PublicKey::from_array(point.compress().to_bytes())
}

/// Constant-time equality of two public keys.
pub fn keys_equal(a: &PublicKey, b: &PublicKey) -> bool {
    bool::from(a.as_array().ct_eq(b.as_array()))
}

// ═══════════════════════════════════════════════════════════════════════════════
// SECRET SEEDS & KEY PAIRS
// ═══════════════════════════════════════════════════════════════════════════════

/// A 32-byte ed25519 private seed, zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretSeed {
    bytes: [u8; SECRET_KEY_SIZE],
}

impl SecretSeed {
    /// Wraps raw seed bytes.
    pub fn from_bytes(bytes: [u8; SECRET_KEY_SIZE]) -> Self {
        Self { bytes }
    }

    /// Wraps a seed from a slice.
    ///
    /// # Errors
    /// `InvalidKeySize` unless exactly 32 bytes are given.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != SECRET_KEY_SIZE {
            return Err(WraithError::InvalidKeySize {
                expected: SECRET_KEY_SIZE,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; SECRET_KEY_SIZE];
        arr.copy_from_slice(bytes);
        Ok(Self { bytes: arr })
    }

    /// Draws a fresh seed from `rng`.
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let mut bytes = [0u8; SECRET_KEY_SIZE];
        rng.fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// Returns the raw seed bytes.
    pub fn as_bytes(&self) -> &[u8; SECRET_KEY_SIZE] {
        &self.bytes
    }

    /// Returns the signing scalar behind this seed.
    pub fn to_scalar(&self) -> Scalar {
        scalar_from_seed(&self.bytes)
    }

    /// Returns the public key for this seed.
    pub fn public_key(&self) -> PublicKey {
        encode_point(&scalar_mult_base(&self.to_scalar()))
    }
}

impl std::fmt::Debug for SecretSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecretSeed([REDACTED])")
    }
}

/// A seed together with its public key.
#[derive(Clone)]
pub struct KeyPair {
    /// Private seed (zeroized on drop)
    pub secret: SecretSeed,
    /// `scalar_from_seed(secret) · G`
    pub public: PublicKey,
}

impl KeyPair {
    /// Builds a key pair from a seed.
    pub fn from_seed(secret: SecretSeed) -> Self {
        let public = secret.public_key();
        Self { secret, public }
    }

    /// Generates a random key pair.
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Self::from_seed(SecretSeed::generate(rng))
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public", &self.public)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ECDH
// ═══════════════════════════════════════════════════════════════════════════════

/// Compressed ECDH output, zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SharedSecret {
    bytes: [u8; PUBLIC_KEY_SIZE],
}

impl SharedSecret {
    /// Returns the compressed shared point.
    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_SIZE] {
        &self.bytes
    }
}

impl PartialEq for SharedSecret {
    fn eq(&self, other: &Self) -> bool {
        bool::from(self.bytes.ct_eq(&other.bytes))
    }
}

impl Eq for SharedSecret {}

impl std::fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SharedSecret([REDACTED])")
    }
}

/// Computes `scalar_from_seed(secret) · public`.
///
/// Symmetric: `ecdh(a, B) == ecdh(b, A)`.
///
/// # Errors
/// `MalformedKey` if `public` does not decode.
pub fn ecdh(secret: &SecretSeed, public: &PublicKey) -> Result<SharedSecret> {
    let point = decode_point(public)?;
    let mut scalar = secret.to_scalar();
    let shared = (scalar * point).compress().to_bytes();
    scalar.zeroize();
    Ok(SharedSecret { bytes: shared })
}
