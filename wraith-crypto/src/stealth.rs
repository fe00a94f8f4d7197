//! Stealth address derivation (DKSAP over Ed25519).
//!
//! ## Payer
//!
//! ```text
//! (r, R)  = fresh ephemeral key pair
//! shared  = r · V                          V = recipient view key
//! tweak   = SHA-512(DOMAIN_STEALTH_TWEAK || shared) mod L
//! S       = B + tweak · G                  B = recipient spend key
//! ```
//!
//! ## Recipient
//!
//! The view key alone recomputes `S` from `R` (`shared = v · R`), which is
//! enough to recognise a payment. Spending needs the one-time scalar
//! `s = b + tweak`, with `s · G == S`.

use curve25519_dalek::scalar::Scalar;
use rand::{CryptoRng, RngCore};
use zeroize::Zeroize;

use wraith_core::constants::DOMAIN_STEALTH_TWEAK;
use wraith_core::error::{Result, WraithError};
use wraith_core::types::{MetaAddress, PublicKey};

use crate::hash::hash_to_scalar;
use crate::onetime::OneTimeKey;
use crate::primitives::{
    decode_point, ecdh, encode_point, keys_equal, point_add, scalar_mult_base, KeyPair,
    SecretSeed, SharedSecret,
};

/// Output of payer-side stealth address generation.
#[derive(Debug)]
pub struct StealthAddressOutput {
    /// One-time address that receives the payment
    pub stealth_pub: PublicKey,
    /// Ephemeral key pair; the public half is published, the private half
    /// goes into the envelope
    pub ephemeral: KeyPair,
}

/// Hashes a shared secret into the address tweak.
pub fn compute_tweak(shared: &SharedSecret) -> Scalar {
    hash_to_scalar(DOMAIN_STEALTH_TWEAK, &[shared.as_bytes()])
}

/// Computes `S = spend_pub + tweak · G`.
///
/// # Errors
/// `MalformedKey` if `spend_pub` does not decode.
pub fn derive_stealth_public_key(spend_pub: &PublicKey, tweak: &Scalar) -> Result<PublicKey> {
    let spend_point = decode_point(spend_pub)?;
    let stealth = point_add(&spend_point, &scalar_mult_base(tweak));
    Ok(encode_point(&stealth))
}

/// Generates a fresh stealth address for `meta` using `rng`.
///
/// Every call draws a new ephemeral key, so repeated payments to the same
/// meta-address land on unlinkable addresses.
pub fn generate_stealth_address_with_rng<R: RngCore + CryptoRng>(
    meta: &MetaAddress,
    rng: &mut R,
) -> Result<StealthAddressOutput> {
    meta.validate()?;

    let ephemeral = KeyPair::generate(rng);
    let shared = ecdh(&ephemeral.secret, &meta.view_pub)?;
    let mut tweak = compute_tweak(&shared);
    let stealth_pub = derive_stealth_public_key(&meta.spend_pub, &tweak);
    tweak.zeroize();

    Ok(StealthAddressOutput {
        stealth_pub: stealth_pub?,
        ephemeral,
    })
}

/// Generates a fresh stealth address for `meta` from OS randomness.
pub fn generate_stealth_address(meta: &MetaAddress) -> Result<StealthAddressOutput> {
    generate_stealth_address_with_rng(meta, &mut rand::rngs::OsRng)
}

/// Recomputes the stealth address of a payment with the view key only.
pub fn stealth_address_for_view(
    view_secret: &SecretSeed,
    spend_pub: &PublicKey,
    ephemeral_pub: &PublicKey,
) -> Result<PublicKey> {
    let shared = ecdh(view_secret, ephemeral_pub)?;
    let mut tweak = compute_tweak(&shared);
    let stealth = derive_stealth_public_key(spend_pub, &tweak);
    tweak.zeroize();
    stealth
}

/// Reconstructs the one-time key of a stealth account.
///
/// `ephemeral_secret` comes out of the payment's envelope. The tweak is
/// recomputed as `ECDH(ephemeral_secret, view_pub)`, the same value the payer
/// used.
///
/// # Errors
/// `DerivationMismatch` if `s · G` differs from `spend_pub + tweak · G`.
pub fn reconstruct_stealth_key(
    spend: &KeyPair,
    view_pub: &PublicKey,
    ephemeral_secret: &SecretSeed,
) -> Result<OneTimeKey> {
    let shared = ecdh(ephemeral_secret, view_pub)?;
    let mut tweak = compute_tweak(&shared);

    let expected = derive_stealth_public_key(&spend.public, &tweak)?;

    let mut spend_scalar = spend.secret.to_scalar();
    let one_time = OneTimeKey::from_scalar(spend_scalar + tweak);
    spend_scalar.zeroize();
    tweak.zeroize();

    let derived = one_time.public_key();
    if !keys_equal(&derived, &expected) {
        return Err(WraithError::DerivationMismatch {
            expected: expected.to_base58(),
            derived: derived.to_base58(),
        });
    }

    Ok(one_time)
}
