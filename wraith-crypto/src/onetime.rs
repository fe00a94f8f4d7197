//! One-time spending keys.
//!
//! A stealth account's private key is a bare scalar `s = spend + tweak`, not
//! an ed25519 seed, so it cannot go through `SigningKey`. Signing uses the
//! expanded-key path instead, with a deterministic nonce prefix derived from
//! the scalar:
//!
//! ```text
//! nonce_prefix = SHA-512(DOMAIN_ONETIME_NONCE || s)[0..32]
//! ```
//!
//! Signatures are standard ed25519 and verify against `s · G`.

use curve25519_dalek::scalar::Scalar;
use ed25519_dalek::hazmat::{raw_sign, ExpandedSecretKey};
use ed25519_dalek::VerifyingKey;
use sha2::Sha512;
use zeroize::Zeroize;

use wraith_core::constants::{DOMAIN_ONETIME_NONCE, SIGNATURE_SIZE};
use wraith_core::error::{Result, WraithError};
use wraith_core::types::PublicKey;

use crate::hash::tagged_sha512_32;
use crate::primitives::{encode_point, scalar_mult_base};

/// The private key of one stealth account.
///
/// Clone is not derived; the scalar is zeroized on drop.
pub struct OneTimeKey {
    scalar: Scalar,
    nonce_prefix: [u8; 32],
    public: PublicKey,
}

impl OneTimeKey {
    /// Wraps a one-time scalar.
    pub fn from_scalar(scalar: Scalar) -> Self {
        let mut scalar_bytes = scalar.to_bytes();
        let nonce_prefix = tagged_sha512_32(DOMAIN_ONETIME_NONCE, &[&scalar_bytes]);
        scalar_bytes.zeroize();

        let public = encode_point(&scalar_mult_base(&scalar));
        Self {
            scalar,
            nonce_prefix,
            public,
        }
    }

    /// The stealth address this key controls.
    pub fn public_key(&self) -> PublicKey {
        self.public
    }

    /// Returns the scalar encoding, for export to a chain wallet.
    pub fn scalar_bytes(&self) -> [u8; 32] {
        self.scalar.to_bytes()
    }

    /// Signs `message` with a standard ed25519 signature.
    ///
    /// # Errors
    /// `MalformedKey` if the public key cannot be loaded as a verifying key.
    pub fn sign(&self, message: &[u8]) -> Result<[u8; SIGNATURE_SIZE]> {
        let verifying = VerifyingKey::from_bytes(self.public.as_array())
            .map_err(|e| WraithError::MalformedKey(e.to_string()))?;

        let expanded = ExpandedSecretKey {
            scalar: self.scalar,
            hash_prefix: self.nonce_prefix,
        };
        let signature = raw_sign::<Sha512>(&expanded, message, &verifying);
        Ok(signature.to_bytes())
    }
}

impl Drop for OneTimeKey {
    fn drop(&mut self) {
        self.scalar.zeroize();
        self.nonce_prefix.zeroize();
    }
}

impl std::fmt::Debug for OneTimeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OneTimeKey")
            .field("public", &self.public)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::scalar_from_seed;
    use ed25519_dalek::{Signature, Verifier};

    fn key() -> OneTimeKey {
        let a = scalar_from_seed(&[1u8; 32]);
        let b = scalar_from_seed(&[2u8; 32]);
        OneTimeKey::from_scalar(a + b)
    }

    #[test]
    fn test_signature_verifies_with_ed25519_dalek() {
        let key = key();
        let message = b"withdraw 5 USDC";
        let sig = key.sign(message).unwrap();

        let verifying = VerifyingKey::from_bytes(key.public_key().as_array()).unwrap();
        assert!(verifying.verify(message, &Signature::from_bytes(&sig)).is_ok());
    }

    #[test]
    fn test_signature_rejects_other_message() {
        let key = key();
        let sig = key.sign(b"message one").unwrap();
        let verifying = VerifyingKey::from_bytes(key.public_key().as_array()).unwrap();
        assert!(verifying
            .verify(b"message two", &Signature::from_bytes(&sig))
            .is_err());
    }

    #[test]
    fn test_signing_is_deterministic() {
        let key = key();
        assert_eq!(key.sign(b"m").unwrap(), key.sign(b"m").unwrap());
    }

    #[test]
    fn test_debug_hides_scalar() {
        let key = key();
        let rendered = format!("{key:?}");
        assert!(!rendered.contains(&hex::encode(key.scalar_bytes())));
    }
}
