//! Meta-key derivation from a wallet signature and a PIN.
//!
//! The wallet signs a fixed per-chain message (see [`Chain::key_message`]);
//! the signature, the PIN and a role label are hashed into each seed:
//!
//! ```text
//! spend_seed = SHA-512(signature || pin || DOMAIN_META_SPEND)[0..32]
//! view_seed  = SHA-512(signature || pin || DOMAIN_META_VIEW)[0..32]
//! ```
//!
//! Ed25519 wallets sign deterministically, so the same wallet and PIN always
//! give back the same keys.
//!
//! [`Chain::key_message`]: wraith_core::types::Chain::key_message

use zeroize::Zeroize;

use wraith_core::constants::{DOMAIN_META_SPEND, DOMAIN_META_VIEW, PIN_LENGTH};
use wraith_core::error::{Result, WraithError};
use wraith_core::types::{MetaAddress, PublicKey};

use crate::hash::sha512;
use crate::primitives::{keys_equal, KeyPair, SecretSeed};

/// Checks that a PIN is exactly four ASCII digits.
pub fn validate_pin(pin: &str) -> Result<()> {
    if pin.len() != PIN_LENGTH || !pin.bytes().all(|b| b.is_ascii_digit()) {
        return Err(WraithError::InvalidPin(format!(
            "expected {PIN_LENGTH} digits, got {} characters",
            pin.chars().count()
        )));
    }
    Ok(())
}

/// Outcome of comparing freshly derived keys against the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Registration {
    /// Nothing registered yet; the keys should be published.
    New,
    /// Registered keys match.
    Existing,
}

/// A recipient's long-term (spend, view) key pairs.
///
/// Clone is not derived.
pub struct MetaKeyPair {
    spend: KeyPair,
    view: KeyPair,
}

impl MetaKeyPair {
    /// Derives the meta keys from a wallet signature and PIN.
    ///
    /// # Errors
    /// - `InvalidSignature` if the signature is empty
    /// - `InvalidPin` if the PIN is not four digits
    pub fn derive(signature: &[u8], pin: &str) -> Result<Self> {
        if signature.is_empty() {
            return Err(WraithError::InvalidSignature("empty signature".into()));
        }
        validate_pin(pin)?;

        let spend = derive_role(signature, pin, DOMAIN_META_SPEND);
        let view = derive_role(signature, pin, DOMAIN_META_VIEW);

        Ok(Self { spend, view })
    }

    /// Rebuilds meta keys from stored seeds.
    pub fn from_seeds(spend: SecretSeed, view: SecretSeed) -> Self {
        Self {
            spend: KeyPair::from_seed(spend),
            view: KeyPair::from_seed(view),
        }
    }

    /// Spend key pair.
    pub fn spend(&self) -> &KeyPair {
        &self.spend
    }

    /// View key pair.
    pub fn view(&self) -> &KeyPair {
        &self.view
    }

    /// Spend public key.
    pub fn spend_pub(&self) -> PublicKey {
        self.spend.public
    }

    /// View public key.
    pub fn view_pub(&self) -> PublicKey {
        self.view.public
    }

    /// Returns the publishable meta-address.
    pub fn meta_address(&self) -> MetaAddress {
        MetaAddress::new(self.spend.public, self.view.public)
    }

    /// Compares these keys with what is registered for the wallet.
    ///
    /// # Errors
    /// `WrongPin` if a registration exists and differs.
    pub fn check_registration(&self, registered: Option<&MetaAddress>) -> Result<Registration> {
        let Some(registered) = registered else {
            return Ok(Registration::New);
        };

        let spend_ok = keys_equal(&registered.spend_pub, &self.spend.public);
        let view_ok = keys_equal(&registered.view_pub, &self.view.public);

        if spend_ok & view_ok {
            Ok(Registration::Existing)
        } else {
            Err(WraithError::WrongPin)
        }
    }
}

impl std::fmt::Debug for MetaKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetaKeyPair")
            .field("spend_pub", &self.spend.public)
            .field("view_pub", &self.view.public)
            .finish_non_exhaustive()
    }
}

fn derive_role(signature: &[u8], pin: &str, domain: &[u8]) -> KeyPair {
    let mut digest = sha512(&[signature, pin.as_bytes(), domain]);
    let mut seed = [0u8; 32];
    seed.copy_from_slice(&digest[..32]);
    digest.zeroize();
    let pair = KeyPair::from_seed(SecretSeed::from_bytes(seed));
    seed.zeroize();
    pair
}
