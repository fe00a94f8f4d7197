//! # WRAITH Cryptography
//!
//! Ed25519 stealth-address primitives for the WRAITH protocol.
//!
//! This crate provides:
//!
//! - **Primitives**: clamping, seed-to-scalar, point encode/decode, ECDH
//! - **Hash**: SHA-512 with domain separation
//! - **Meta keys**: (spend, view) derivation from a wallet signature and PIN
//! - **Stealth**: payer-side address generation, recipient-side reconstruction
//! - **Envelope**: encryption of the ephemeral key for the view-key holder
//! - **One-time keys**: ed25519 signing with a raw stealth scalar
//!
//! ## Security Properties
//!
//! - Curve arithmetic goes through `curve25519-dalek`'s constant-time backend
//! - Seeds, scalars and shared secrets are zeroized on drop
//! - Points outside the prime-order subgroup are rejected on decode
//!
//! ## Example
//!
//! ```rust
//! use wraith_crypto::{
//!     generate_stealth_address, open_envelope, reconstruct_stealth_key, seal_envelope,
//!     MetaKeyPair,
//! };
//!
//! // Recipient derives long-term keys from a wallet signature and a PIN
//! let recipient = MetaKeyPair::derive(&[7u8; 64], "1234")?;
//!
//! // Payer creates a one-time address and seals the ephemeral key
//! let out = generate_stealth_address(&recipient.meta_address())?;
//! let envelope = seal_envelope(&out.ephemeral, &recipient.view_pub())?;
//!
//! // Recipient opens the envelope and rebuilds the spending key
//! let ephemeral = open_envelope(&envelope, &recipient.view().secret, &out.ephemeral.public)?;
//! let key = reconstruct_stealth_key(recipient.spend(), &recipient.view_pub(), &ephemeral.secret)?;
//! assert_eq!(key.public_key(), out.stealth_pub);
//! # Ok::<(), wraith_core::WraithError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod envelope;
pub mod hash;
pub mod meta;
pub mod onetime;
pub mod primitives;
pub mod stealth;

// Re-export main functions at crate root
pub use envelope::{open_envelope, seal_envelope, seal_envelope_with_rng};
pub use meta::{validate_pin, MetaKeyPair, Registration};
pub use onetime::OneTimeKey;
pub use primitives::{ecdh, KeyPair, SecretSeed, SharedSecret};
pub use stealth::{
    generate_stealth_address, generate_stealth_address_with_rng, reconstruct_stealth_key,
    stealth_address_for_view, StealthAddressOutput,
};
