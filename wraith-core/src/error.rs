//! Error types for WRAITH.
//!
//! One `thiserror` hierarchy covers every layer, from point decoding up to the
//! bridge state machine. Variants carry enough context to tell the user which
//! payment, pick, or burn failed and why.

use thiserror::Error;

/// Result type alias using `WraithError`.
pub type Result<T> = std::result::Result<T, WraithError>;

/// Main error type for all WRAITH operations.
#[derive(Debug, Error)]
pub enum WraithError {
    // ═══════════════════════════════════════════════════════════════════════════
    // CRYPTOGRAPHIC ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Bytes do not encode a usable curve point (bad encoding, off-curve, or small order).
    #[error("Malformed key: {0}")]
    MalformedKey(String),

    /// Invalid key size or format.
    #[error("Invalid key: expected {expected} bytes, got {actual}")]
    InvalidKeySize { expected: usize, actual: usize },

    /// Envelope has the wrong length for the fixed wire layout.
    #[error("Invalid envelope: expected {expected} bytes, got {actual}")]
    InvalidEnvelopeSize { expected: usize, actual: usize },

    /// Envelope decrypted to keys that do not match each other or the published key.
    #[error("Envelope integrity check failed: {0}")]
    DecryptionIntegrityFailure(String),

    /// Reconstructed one-time key does not match the expected stealth address.
    #[error("Stealth key derivation mismatch: expected {expected}, derived {derived}")]
    DerivationMismatch { expected: String, derived: String },

    // ═══════════════════════════════════════════════════════════════════════════
    // META-KEY ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// PIN is not exactly four ASCII digits.
    #[error("Invalid PIN: {0}")]
    InvalidPin(String),

    /// Re-derived keys differ from the registered ones.
    #[error("Wrong PIN: derived keys do not match the registered meta-address")]
    WrongPin,

    /// Wallet signature is empty or has an unexpected shape.
    #[error("Invalid wallet signature: {0}")]
    InvalidSignature(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // WITHDRAWAL ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Requested amount exceeds the spendable balances. Raised before any dispatch.
    #[error("Insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds { requested: u64, available: u64 },

    /// Network or confirmation failure while submitting a transaction.
    #[error("Chain submission failed: {0}")]
    ChainSubmissionError(String),

    /// Every pick of a withdrawal failed.
    #[error("Withdrawal failed: all {0} picks failed")]
    WithdrawalFailed(usize),

    // ═══════════════════════════════════════════════════════════════════════════
    // BRIDGE ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Attestation stayed pending past the polling budget.
    #[error("Attestation timeout after {attempts} attempts (domain {source_domain}, tx {tx_hash})")]
    AttestationTimeout {
        source_domain: u32,
        tx_hash: String,
        attempts: u32,
    },

    /// The caller cancelled a long-running operation.
    #[error("Operation cancelled: {0}")]
    Cancelled(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // SERIALIZATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid hex encoding.
    #[error("Invalid hex encoding: {0}")]
    HexError(#[from] hex::FromHexError),

    /// Invalid base58 encoding.
    #[error("Invalid base58 encoding: {0}")]
    Base58Error(String),

    /// Protocol version mismatch.
    #[error("Protocol version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: u8, actual: u8 },

    // ═══════════════════════════════════════════════════════════════════════════
    // NETWORK ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Connection timeout.
    #[error("Connection timeout: {0}")]
    ConnectionTimeout(String),

    /// Requested record does not exist on the remote side.
    #[error("Not found: {0}")]
    NotFound(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // STORAGE ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// File I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    // ═══════════════════════════════════════════════════════════════════════════
    // VALIDATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Input validation failed.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // INTERNAL ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Internal invariant violation (should never happen).
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl WraithError {
    /// Returns true if this error is recoverable (can retry).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            WraithError::HttpError(_)
                | WraithError::ConnectionTimeout(_)
                | WraithError::ChainSubmissionError(_)
        )
    }

    /// Returns true if this is a cryptographic error.
    pub fn is_crypto_error(&self) -> bool {
        matches!(
            self,
            WraithError::MalformedKey(_)
                | WraithError::InvalidKeySize { .. }
                | WraithError::InvalidEnvelopeSize { .. }
                | WraithError::DecryptionIntegrityFailure(_)
                | WraithError::DerivationMismatch { .. }
        )
    }

    /// Returns true if this is a validation error.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            WraithError::ValidationError(_)
                | WraithError::InvalidPin(_)
                | WraithError::InvalidSignature(_)
                | WraithError::VersionMismatch { .. }
        )
    }

    /// Returns true if this error only sinks the current pick or payment.
    ///
    /// Batch operations record these and move on to the next item.
    pub fn is_pick_scoped(&self) -> bool {
        matches!(
            self,
            WraithError::DecryptionIntegrityFailure(_)
                | WraithError::DerivationMismatch { .. }
                | WraithError::InvalidEnvelopeSize { .. }
                | WraithError::MalformedKey(_)
                | WraithError::ChainSubmissionError(_)
                | WraithError::HttpError(_)
                | WraithError::ConnectionTimeout(_)
        )
    }
}

impl From<bs58::decode::Error> for WraithError {
    fn from(err: bs58::decode::Error) -> Self {
        WraithError::Base58Error(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = WraithError::InsufficientFunds {
            requested: 700,
            available: 500,
        };
        assert!(err.to_string().contains("700"));
        assert!(err.to_string().contains("500"));
    }

    #[test]
    fn test_error_classification() {
        assert!(WraithError::HttpError("test".into()).is_recoverable());
        assert!(WraithError::ChainSubmissionError("test".into()).is_recoverable());
        assert!(!WraithError::WrongPin.is_recoverable());

        assert!(WraithError::MalformedKey("test".into()).is_crypto_error());
        assert!(WraithError::DecryptionIntegrityFailure("test".into()).is_crypto_error());
        assert!(!WraithError::HttpError("test".into()).is_crypto_error());

        assert!(WraithError::InvalidPin("12".into()).is_validation_error());
    }

    #[test]
    fn test_pick_scoped_errors() {
        assert!(WraithError::DecryptionIntegrityFailure("x".into()).is_pick_scoped());
        assert!(WraithError::DerivationMismatch {
            expected: "a".into(),
            derived: "b".into()
        }
        .is_pick_scoped());
        assert!(!WraithError::InsufficientFunds {
            requested: 1,
            available: 0
        }
        .is_pick_scoped());
        assert!(!WraithError::WrongPin.is_pick_scoped());
    }

    #[test]
    fn test_attestation_timeout_keeps_receipt_fields() {
        let err = WraithError::AttestationTimeout {
            source_domain: 5,
            tx_hash: "abc123".into(),
            attempts: 12,
        };
        let msg = err.to_string();
        assert!(msg.contains("abc123"));
        assert!(msg.contains("domain 5"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_result: std::result::Result<serde_json::Value, _> = serde_json::from_str("invalid");
        let wraith_result: Result<serde_json::Value> = json_result.map_err(WraithError::from);
        assert!(matches!(wraith_result, Err(WraithError::JsonError(_))));
    }
}
