//! Ephemeral-key envelope.
//!
//! Carries the payment's ephemeral key pair to the holder of the view key.
//!
//! ```text
//! shared    = ECDH(eph_priv, view_pub) = ECDH(view_priv, eph_pub)
//! key       = SHA-512(DOMAIN_ENVELOPE_KEY || shared)[0..32]
//! keystream = SHA-512(DOMAIN_ENVELOPE_STREAM || key || nonce)     (64 bytes)
//! envelope  = nonce (16) || (eph_priv || eph_pub) XOR keystream
//! ```
//!
//! The XOR stream has no MAC. Integrity comes from the key relationship
//! instead: opening recomputes `scalar_from_seed(eph_priv) · G` and insists it
//! equals both the decrypted `eph_pub` and the one published with the payment.

use rand::{CryptoRng, RngCore};
use zeroize::Zeroize;

use wraith_core::constants::{
    DOMAIN_ENVELOPE_KEY, DOMAIN_ENVELOPE_STREAM, ENVELOPE_NONCE_SIZE, ENVELOPE_PLAINTEXT_SIZE,
    PUBLIC_KEY_SIZE, SECRET_KEY_SIZE,
};
use wraith_core::error::{Result, WraithError};
use wraith_core::types::{Envelope, PublicKey};

use crate::hash::{tagged_sha512, tagged_sha512_32};
use crate::primitives::{ecdh, keys_equal, KeyPair, SecretSeed, SharedSecret};

fn keystream(shared: &SharedSecret, nonce: &[u8]) -> [u8; ENVELOPE_PLAINTEXT_SIZE] {
    let mut key = tagged_sha512_32(DOMAIN_ENVELOPE_KEY, &[shared.as_bytes()]);
    let stream = tagged_sha512(DOMAIN_ENVELOPE_STREAM, &[&key, nonce]);
    key.zeroize();
    stream
}

/// Encrypts `ephemeral` for the holder of `view_pub`, drawing the nonce from `rng`.
///
/// # Errors
/// `MalformedKey` if `view_pub` does not decode.
pub fn seal_envelope_with_rng<R: RngCore + CryptoRng>(
    ephemeral: &KeyPair,
    view_pub: &PublicKey,
    rng: &mut R,
) -> Result<Envelope> {
    let shared = ecdh(&ephemeral.secret, view_pub)?;

    let mut nonce = [0u8; ENVELOPE_NONCE_SIZE];
    rng.fill_bytes(&mut nonce);

    let mut stream = keystream(&shared, &nonce);
    let mut ciphertext = [0u8; ENVELOPE_PLAINTEXT_SIZE];
    ciphertext[..SECRET_KEY_SIZE].copy_from_slice(ephemeral.secret.as_bytes());
    ciphertext[SECRET_KEY_SIZE..].copy_from_slice(ephemeral.public.as_bytes());
    for (byte, k) in ciphertext.iter_mut().zip(stream.iter()) {
        *byte ^= k;
    }
    stream.zeroize();

    Ok(Envelope::from_parts(&nonce, &ciphertext))
}

/// Encrypts `ephemeral` for the holder of `view_pub` with an OS-random nonce.
pub fn seal_envelope(ephemeral: &KeyPair, view_pub: &PublicKey) -> Result<Envelope> {
    seal_envelope_with_rng(ephemeral, view_pub, &mut rand::rngs::OsRng)
}

/// Decrypts an envelope with the view key.
///
/// `ephemeral_pub` is the key published next to the payment.
///
/// # Errors
/// - `MalformedKey` if `ephemeral_pub` does not decode
/// - `DecryptionIntegrityFailure` if the recovered keys do not match each
///   other or the published key
pub fn open_envelope(
    envelope: &Envelope,
    view_secret: &SecretSeed,
    ephemeral_pub: &PublicKey,
) -> Result<KeyPair> {
    let shared = ecdh(view_secret, ephemeral_pub)?;

    let mut plaintext = [0u8; ENVELOPE_PLAINTEXT_SIZE];
    plaintext.copy_from_slice(envelope.ciphertext());
    let mut stream = keystream(&shared, envelope.nonce());
    for (byte, k) in plaintext.iter_mut().zip(stream.iter()) {
        *byte ^= k;
    }
    stream.zeroize();

    let secret = SecretSeed::from_slice(&plaintext[..SECRET_KEY_SIZE]);
    let recovered_pub =
        PublicKey::from_bytes(&plaintext[SECRET_KEY_SIZE..SECRET_KEY_SIZE + PUBLIC_KEY_SIZE]);
    plaintext.zeroize();

    let (secret, recovered_pub) = match (secret, recovered_pub) {
        (Ok(secret), Ok(recovered_pub)) => (secret, recovered_pub),
        _ => {
            return Err(WraithError::DecryptionIntegrityFailure(
                "envelope plaintext has the wrong layout".into(),
            ))
        }
    };

    let pair = KeyPair::from_seed(secret);
    let consistent = keys_equal(&pair.public, &recovered_pub);
    let published = keys_equal(&pair.public, ephemeral_pub);

    if !(consistent && published) {
        return Err(WraithError::DecryptionIntegrityFailure(format!(
            "recovered key does not match ephemeral key {ephemeral_pub}"
        )));
    }

    Ok(pair)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::MetaKeyPair;
    use crate::stealth::generate_stealth_address_with_rng;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;
    use wraith_core::constants::ENVELOPE_SIZE;

    fn setup(seed: u64) -> (MetaKeyPair, KeyPair, Envelope) {
        let keys = MetaKeyPair::derive(&[0x33; 64], "1357").unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let out = generate_stealth_address_with_rng(&keys.meta_address(), &mut rng).unwrap();
        let envelope = seal_envelope_with_rng(&out.ephemeral, &keys.view_pub(), &mut rng).unwrap();
        (keys, out.ephemeral, envelope)
    }

    #[test]
    fn test_open_recovers_ephemeral_key() {
        let (keys, ephemeral, envelope) = setup(1);
        let opened = open_envelope(&envelope, &keys.view().secret, &ephemeral.public).unwrap();
        assert_eq!(opened.public, ephemeral.public);
        assert_eq!(opened.secret.as_bytes(), ephemeral.secret.as_bytes());
    }

    #[test]
    fn test_envelope_layout() {
        let (_, ephemeral, envelope) = setup(2);
        assert_eq!(envelope.as_bytes().len(), ENVELOPE_SIZE);
        // Ciphertext never carries the ephemeral key in the clear
        assert!(!envelope
            .ciphertext()
            .windows(32)
            .any(|w| w == ephemeral.secret.as_bytes()));
    }

    #[test]
    fn test_fresh_nonce_per_seal() {
        let (keys, ephemeral, _) = setup(3);
        let a = seal_envelope(&ephemeral, &keys.view_pub()).unwrap();
        let b = seal_envelope(&ephemeral, &keys.view_pub()).unwrap();
        assert_ne!(a.nonce(), b.nonce());
        assert_ne!(a.ciphertext(), b.ciphertext());
    }

    #[test]
    fn test_wrong_view_key_fails_integrity() {
        let (_, ephemeral, envelope) = setup(4);
        let stranger = MetaKeyPair::derive(&[0x44; 64], "1357").unwrap();
        assert!(matches!(
            open_envelope(&envelope, &stranger.view().secret, &ephemeral.public),
            Err(WraithError::DecryptionIntegrityFailure(_))
        ));
    }

    #[test]
    fn test_substituted_ephemeral_key_fails_integrity() {
        let (keys, _, envelope) = setup(5);
        let mut rng = ChaCha20Rng::seed_from_u64(99);
        let other = KeyPair::generate(&mut rng);
        assert!(matches!(
            open_envelope(&envelope, &keys.view().secret, &other.public),
            Err(WraithError::DecryptionIntegrityFailure(_))
        ));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_any_flipped_byte_is_detected(index in 0..ENVELOPE_SIZE, mask in 1u8..=255) {
            let (keys, ephemeral, envelope) = setup(6);
            let mut bytes = envelope.as_bytes().to_vec();
            bytes[index] ^= mask;
            let tampered = Envelope::from_bytes(&bytes).unwrap();

            let result = open_envelope(&tampered, &keys.view().secret, &ephemeral.public);
            prop_assert!(matches!(result, Err(WraithError::DecryptionIntegrityFailure(_))));
        }
    }
}
