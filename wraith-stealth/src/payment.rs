//! Stealth payment creation (payer side).

use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::debug;

use wraith_core::error::{Result, WraithError};
use wraith_core::types::{Envelope, MetaAddress, PublicKey, StealthBalance, TransferRequest};
use wraith_crypto::{generate_stealth_address_with_rng, seal_envelope_with_rng};

/// Stealth payment: where to send and what to publish alongside.
///
/// The ephemeral private key only exists inside `envelope`; the plaintext copy
/// is wiped before this value is returned.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StealthPayment {
    /// One-time address that receives the funds
    pub stealth_address: PublicKey,
    /// Ephemeral public key, published with the payment
    pub ephemeral_pubkey: PublicKey,
    /// Encrypted ephemeral key, written into the memo field
    pub envelope: Envelope,
    /// Optional link label bound into the transfer, not the address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl StealthPayment {
    /// Builds the transfer that funds this payment.
    pub fn transfer_request(
        &self,
        from: PublicKey,
        mint: impl Into<String>,
        amount: u64,
    ) -> TransferRequest {
        TransferRequest {
            from,
            to: self.stealth_address,
            mint: mint.into(),
            amount,
            label: self.label.clone(),
        }
    }

    /// The balance record an indexer would observe once the transfer lands.
    pub fn into_balance(self, mint: impl Into<String>, amount: u64) -> StealthBalance {
        StealthBalance {
            address: self.stealth_address,
            ephemeral_pubkey: self.ephemeral_pubkey,
            memo: self.envelope,
            mint: mint.into(),
            amount,
        }
    }
}

/// Creates a stealth payment to `meta_address` using `rng`.
pub fn create_stealth_payment_with_rng<R: RngCore + CryptoRng>(
    meta_address: &MetaAddress,
    label: Option<String>,
    rng: &mut R,
) -> Result<StealthPayment> {
    let out = generate_stealth_address_with_rng(meta_address, rng)?;
    let envelope = seal_envelope_with_rng(&out.ephemeral, &meta_address.view_pub, rng)?;

    debug!(stealth_address = %out.stealth_pub, labelled = label.is_some(), "created stealth payment");

    Ok(StealthPayment {
        stealth_address: out.stealth_pub,
        ephemeral_pubkey: out.ephemeral.public,
        envelope,
        label,
    })
}

/// Creates a stealth payment to `meta_address` from OS randomness.
///
/// # Example
///
/// ```rust
/// use wraith_crypto::MetaKeyPair;
/// use wraith_stealth::create_stealth_payment;
///
/// let recipient = MetaKeyPair::derive(&[1u8; 64], "1234")?;
/// let payment = create_stealth_payment(&recipient.meta_address())?;
/// assert_ne!(payment.stealth_address, recipient.spend_pub());
/// # Ok::<(), wraith_core::WraithError>(())
/// ```
pub fn create_stealth_payment(meta_address: &MetaAddress) -> Result<StealthPayment> {
    create_stealth_payment_with_rng(meta_address, None, &mut rand::rngs::OsRng)
}

/// Builder for payments that carry a link label.
#[derive(Debug, Default)]
pub struct StealthPaymentBuilder {
    meta_address: Option<MetaAddress>,
    label: Option<String>,
}

impl StealthPaymentBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the recipient.
    pub fn recipient(mut self, meta_address: MetaAddress) -> Self {
        self.meta_address = Some(meta_address);
        self
    }

    /// Sets the link label.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Builds the payment.
    pub fn build(self) -> Result<StealthPayment> {
        let meta_address = self.meta_address.ok_or_else(|| {
            WraithError::ValidationError("recipient meta-address is required".into())
        })?;
        create_stealth_payment_with_rng(&meta_address, self.label, &mut rand::rngs::OsRng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;
    use wraith_crypto::{open_envelope, MetaKeyPair};

    fn recipient() -> MetaKeyPair {
        MetaKeyPair::derive(&[0x77; 64], "1111").unwrap()
    }

    #[test]
    fn test_payment_envelope_opens_for_recipient() {
        let keys = recipient();
        let payment = create_stealth_payment(&keys.meta_address()).unwrap();
        let opened = open_envelope(
            &payment.envelope,
            &keys.view().secret,
            &payment.ephemeral_pubkey,
        )
        .unwrap();
        assert_eq!(opened.public, payment.ephemeral_pubkey);
    }

    #[test]
    fn test_label_does_not_change_address_derivation() {
        let meta = recipient().meta_address();
        let plain =
            create_stealth_payment_with_rng(&meta, None, &mut ChaCha20Rng::seed_from_u64(5)).unwrap();
        let labelled = create_stealth_payment_with_rng(
            &meta,
            Some("invoice-42".into()),
            &mut ChaCha20Rng::seed_from_u64(5),
        )
        .unwrap();
        assert_eq!(plain.stealth_address, labelled.stealth_address);
        assert_eq!(labelled.label.as_deref(), Some("invoice-42"));
    }

    #[test]
    fn test_builder_requires_recipient() {
        let result = StealthPaymentBuilder::new().label("x").build();
        assert!(matches!(result, Err(WraithError::ValidationError(_))));
    }

    #[test]
    fn test_builder_propagates_label_to_transfer() {
        let keys = recipient();
        let payment = StealthPaymentBuilder::new()
            .recipient(keys.meta_address())
            .label("coffee")
            .build()
            .unwrap();
        let payer = PublicKey::from_array([9u8; 32]);
        let request = payment.transfer_request(payer, "USDC", 5);
        assert_eq!(request.to, payment.stealth_address);
        assert_eq!(request.label.as_deref(), Some("coffee"));
    }

    #[test]
    fn test_payment_json_roundtrip() {
        let payment = create_stealth_payment(&recipient().meta_address()).unwrap();
        let json = serde_json::to_string(&payment).unwrap();
        assert!(json.contains("ephemeralPubkey"));
        let back: StealthPayment = serde_json::from_str(&json).unwrap();
        assert_eq!(back, payment);
    }
}
