//! Chain-facing types.
//!
//! The protocol never builds chain bytecode itself. Transactions are opaque
//! message bytes plus the signatures collected for them; a [`TransferBuilder`]
//! implementation per chain fills in the message.
//!
//! [`TransferBuilder`]: crate::traits::TransferBuilder

use serde::{Deserialize, Serialize};

use crate::constants::{SOLANA_KEY_MESSAGE, SUI_KEY_MESSAGE};
use crate::error::{Result, WraithError};
use crate::types::PublicKey;

// ═══════════════════════════════════════════════════════════════════════════════
// CHAIN
// ═══════════════════════════════════════════════════════════════════════════════

/// Target chains that share the Ed25519 stealth scheme.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    /// Solana mainnet/devnet
    Solana,
    /// Sui mainnet/testnet
    Sui,
}

impl Chain {
    /// Returns the fixed message the wallet signs to seed meta-key derivation.
    pub fn key_message(&self) -> &'static str {
        match self {
            Chain::Solana => SOLANA_KEY_MESSAGE,
            Chain::Sui => SUI_KEY_MESSAGE,
        }
    }

    /// Formats a public key the way this chain displays addresses.
    pub fn format_address(&self, key: &PublicKey) -> String {
        match self {
            Chain::Solana => key.to_base58(),
            Chain::Sui => key.to_hex(),
        }
    }

    /// Returns the lowercase chain name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Chain::Solana => "solana",
            Chain::Sui => "sui",
        }
    }
}

impl std::fmt::Display for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Chain {
    type Err = WraithError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "solana" | "sol" => Ok(Chain::Solana),
            "sui" => Ok(Chain::Sui),
            other => Err(WraithError::ValidationError(format!(
                "unknown chain: {other}"
            ))),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TRANSACTIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// A signature attached to a transaction by one signer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxSignature {
    /// Public key of the signer
    pub signer: PublicKey,
    /// Raw signature bytes
    #[serde(with = "hex")]
    pub signature: Vec<u8>,
}

/// An unsigned or partially signed transaction.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Serialized transaction message, as produced by the chain's builder
    #[serde(with = "hex")]
    pub message: Vec<u8>,
    /// Signatures collected so far
    #[serde(default)]
    pub signatures: Vec<TxSignature>,
    /// Account paying fees, when it differs from the funds' owner
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_payer: Option<PublicKey>,
}

impl Transaction {
    /// Creates an unsigned transaction over the given message bytes.
    pub fn new(message: Vec<u8>) -> Self {
        Self {
            message,
            signatures: Vec::new(),
            fee_payer: None,
        }
    }

    /// Sets the fee payer.
    pub fn with_fee_payer(mut self, fee_payer: PublicKey) -> Self {
        self.fee_payer = Some(fee_payer);
        self
    }

    /// Appends a signature.
    pub fn add_signature(&mut self, signer: PublicKey, signature: Vec<u8>) {
        self.signatures.push(TxSignature { signer, signature });
    }

    /// Returns true if `signer` has already signed.
    pub fn is_signed_by(&self, signer: &PublicKey) -> bool {
        self.signatures.iter().any(|s| &s.signer == signer)
    }
}

/// Reference to a submitted transaction (signature or digest).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxRef(pub String);

impl TxRef {
    /// Returns the reference as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TxRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TxRef {
    fn from(s: &str) -> Self {
        TxRef(s.to_string())
    }
}

/// Outcome of waiting for a transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum TxStatus {
    /// Included and final
    Confirmed,
    /// Rejected or reverted on chain
    Failed(String),
}

impl TxStatus {
    /// Turns a failed status into a `ChainSubmissionError`.
    pub fn into_result(self, tx: &TxRef) -> Result<()> {
        match self {
            TxStatus::Confirmed => Ok(()),
            TxStatus::Failed(reason) => Err(WraithError::ChainSubmissionError(format!(
                "{tx} failed: {reason}"
            ))),
        }
    }
}

/// A token movement for a chain builder to encode.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    /// Account the funds leave (a stealth account when withdrawing)
    pub from: PublicKey,
    /// Destination address
    pub to: PublicKey,
    /// Token mint / coin type
    pub mint: String,
    /// Amount in base units
    pub amount: u64,
    /// Optional link label bound into the transaction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// ATTESTATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Answer of the attestation service for one burn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttestationStatus {
    /// Burn seen but not yet attested
    Pending,
    /// Final attestation bytes, ready to be claimed
    Ready(Vec<u8>),
}

impl AttestationStatus {
    /// Returns true while the burn is still awaiting attestation.
    pub fn is_pending(&self) -> bool {
        matches!(self, AttestationStatus::Pending)
    }
}
