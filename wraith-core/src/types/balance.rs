//! Off-chain records the indexer hands out and the withdrawal path consumes.
//!
//! Field names follow the indexer's camelCase JSON.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{Chain, Envelope, MetaAddress, PublicKey};

// ═══════════════════════════════════════════════════════════════════════════════
// RECIPIENT LOOKUP
// ═══════════════════════════════════════════════════════════════════════════════

/// What the indexer returns for a recipient identifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipientRecord {
    /// Long-term spend public key
    pub meta_spend_pub: PublicKey,
    /// Long-term view public key
    pub meta_view_pub: PublicKey,
    /// Chain the recipient registered on
    pub source_chain: Chain,
    /// Free-form link payload (label, amount hints)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_data: Option<String>,
}

impl RecipientRecord {
    /// Returns the record's keys as a validated meta-address.
    pub fn meta_address(&self) -> Result<MetaAddress> {
        let meta = MetaAddress::new(self.meta_spend_pub, self.meta_view_pub);
        meta.validate()?;
        Ok(meta)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// STEALTH BALANCES
// ═══════════════════════════════════════════════════════════════════════════════

/// One payment received into a distinct stealth account.
///
/// Records are historical and never mutated; spending moves the on-chain funds
/// while the record stays as it was observed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StealthBalance {
    /// Stealth account holding the funds
    pub address: PublicKey,
    /// Ephemeral public key published with the payment
    pub ephemeral_pubkey: PublicKey,
    /// Envelope carrying the ephemeral private key
    pub memo: Envelope,
    /// Token mint / coin type
    pub mint: String,
    /// Amount in base units
    pub amount: u64,
}

/// A balance chosen by the coin selector together with the amount to move.
///
/// `amount_to_take` never exceeds `balance.amount`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalPick {
    /// Source balance
    pub balance: StealthBalance,
    /// Amount to move out of it
    pub amount_to_take: u64,
}

impl WithdrawalPick {
    /// Returns true if the pick drains the whole balance.
    pub fn drains_balance(&self) -> bool {
        self.amount_to_take == self.balance.amount
    }
}

/// Record posted to the indexer after a multi-pick withdrawal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalRecord {
    /// Successful transaction refs joined by the withdrawal delimiter
    pub withdrawal_id: String,
    /// Chain the withdrawal ran on
    pub chain: Chain,
    /// Token mint / coin type
    pub mint: String,
    /// Amount actually moved
    pub amount: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stealth_balance_json_shape() {
        let balance = StealthBalance {
            address: PublicKey::from_array([1u8; 32]),
            ephemeral_pubkey: PublicKey::from_array([2u8; 32]),
            memo: Envelope::from_bytes(&[0u8; 80]).unwrap(),
            mint: "USDC".into(),
            amount: 5,
        };
        let json = serde_json::to_value(&balance).unwrap();
        assert!(json.get("ephemeralPubkey").is_some());
        assert_eq!(json["amount"], 5);

        let back: StealthBalance = serde_json::from_value(json).unwrap();
        assert_eq!(back, balance);
    }

    #[test]
    fn test_recipient_record_meta_address() {
        let json = serde_json::json!({
            "metaSpendPub": PublicKey::from_array([1u8; 32]).to_base58(),
            "metaViewPub": PublicKey::from_array([2u8; 32]).to_base58(),
            "sourceChain": "sui",
        });
        let record: RecipientRecord = serde_json::from_value(json).unwrap();
        assert_eq!(record.source_chain, Chain::Sui);
        assert!(record.link_data.is_none());
        assert!(record.meta_address().is_ok());
    }

    #[test]
    fn test_pick_drains_balance() {
        let balance = StealthBalance {
            address: PublicKey::from_array([1u8; 32]),
            ephemeral_pubkey: PublicKey::from_array([2u8; 32]),
            memo: Envelope::from_bytes(&[0u8; 80]).unwrap(),
            mint: "USDC".into(),
            amount: 3,
        };
        let full = WithdrawalPick {
            balance: balance.clone(),
            amount_to_take: 3,
        };
        let partial = WithdrawalPick {
            balance,
            amount_to_take: 2,
        };
        assert!(full.drains_balance());
        assert!(!partial.drains_balance());
    }
}
