//! Protocol constants for WRAITH.
//!
//! Curve sizes follow Ed25519 (RFC 8032). The envelope layout is the only
//! persisted wire format the protocol defines, so its sizes are fixed here and
//! shared by every chain that speaks the scheme.

// ═══════════════════════════════════════════════════════════════════════════════
// ED25519 SIZES
// ═══════════════════════════════════════════════════════════════════════════════

/// Size of a compressed Edwards point (public key) in bytes.
pub const PUBLIC_KEY_SIZE: usize = 32;

/// Size of a private seed or scalar encoding in bytes.
pub const SECRET_KEY_SIZE: usize = 32;

/// Size of an ed25519 signature in bytes.
pub const SIGNATURE_SIZE: usize = 64;

// ═══════════════════════════════════════════════════════════════════════════════
// ENVELOPE LAYOUT
// ═══════════════════════════════════════════════════════════════════════════════

/// Random nonce prefix of every envelope.
pub const ENVELOPE_NONCE_SIZE: usize = 16;

/// Plaintext: ephemeral private seed (32) || ephemeral public point (32).
pub const ENVELOPE_PLAINTEXT_SIZE: usize = SECRET_KEY_SIZE + PUBLIC_KEY_SIZE;

/// Full envelope: nonce (16) || ciphertext (64) = 80 bytes.
pub const ENVELOPE_SIZE: usize = ENVELOPE_NONCE_SIZE + ENVELOPE_PLAINTEXT_SIZE;

// ═══════════════════════════════════════════════════════════════════════════════
// DOMAIN SEPARATORS
// ═══════════════════════════════════════════════════════════════════════════════
// Every SHA-512 invocation mixes in its own label so that outputs from
// different operations never collide, even over the same input.

/// Context appended when deriving the spend seed from signature || PIN.
pub const DOMAIN_META_SPEND: &[u8] = b"wraith:meta:spend:v1";

/// Context appended when deriving the view seed from signature || PIN.
pub const DOMAIN_META_VIEW: &[u8] = b"wraith:meta:view:v1";

/// Label for hashing the ECDH shared secret into the address tweak.
pub const DOMAIN_STEALTH_TWEAK: &[u8] = b"wraith:stealth:tweak:v1";

/// Label for hashing the ECDH shared secret into the envelope stream key.
pub const DOMAIN_ENVELOPE_KEY: &[u8] = b"wraith:envelope:key:v1";

/// Label for expanding stream key + nonce into the 64-byte keystream.
pub const DOMAIN_ENVELOPE_STREAM: &[u8] = b"wraith:envelope:stream:v1";

/// Label for deriving the deterministic nonce prefix of one-time signing keys.
pub const DOMAIN_ONETIME_NONCE: &[u8] = b"wraith:onetime:nonce:v1";

// ═══════════════════════════════════════════════════════════════════════════════
// META-KEY DERIVATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Number of digits in a user PIN.
pub const PIN_LENGTH: usize = 4;

/// Message the Solana wallet signs to seed meta-key derivation.
pub const SOLANA_KEY_MESSAGE: &str =
    "WRAITH stealth keys for Solana.\nSigning this message does not authorize any transfer.";

/// Message the Sui wallet signs to seed meta-key derivation.
pub const SUI_KEY_MESSAGE: &str =
    "WRAITH stealth keys for Sui.\nSigning this message does not authorize any transfer.";

// ═══════════════════════════════════════════════════════════════════════════════
// PROTOCOL VERSIONING
// ═══════════════════════════════════════════════════════════════════════════════

/// Current protocol version.
pub const PROTOCOL_VERSION: u8 = 1;

// ═══════════════════════════════════════════════════════════════════════════════
// WITHDRAWAL & BRIDGE
// ═══════════════════════════════════════════════════════════════════════════════

/// Delimiter joining successful transaction refs into one withdrawal id.
pub const WITHDRAWAL_ID_DELIMITER: &str = ",";

/// Seconds between attestation polls.
pub const DEFAULT_ATTESTATION_INTERVAL_SECS: u64 = 15;

/// Attestation polls before giving up (~3 minutes at the default interval).
pub const DEFAULT_ATTESTATION_ATTEMPTS: u32 = 12;

/// Sentinel the attestation service returns while a burn is not yet attested.
pub const ATTESTATION_PENDING: &str = "PENDING";

/// Default HTTP timeout for indexer and attestation requests.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_layout() {
        assert_eq!(ENVELOPE_PLAINTEXT_SIZE, 64);
        assert_eq!(ENVELOPE_SIZE, 80);
    }

    #[test]
    fn test_attestation_budget_is_three_minutes() {
        assert_eq!(
            DEFAULT_ATTESTATION_INTERVAL_SECS * DEFAULT_ATTESTATION_ATTEMPTS as u64,
            180
        );
    }

    #[test]
    fn test_domain_separators_unique() {
        let domains = [
            DOMAIN_META_SPEND,
            DOMAIN_META_VIEW,
            DOMAIN_STEALTH_TWEAK,
            DOMAIN_ENVELOPE_KEY,
            DOMAIN_ENVELOPE_STREAM,
            DOMAIN_ONETIME_NONCE,
        ];

        for (i, a) in domains.iter().enumerate() {
            for (j, b) in domains.iter().enumerate() {
                if i != j {
                    assert_ne!(a, b, "Domain separators must be unique");
                }
            }
        }
    }

    #[test]
    fn test_key_messages_differ_per_chain() {
        assert_ne!(SOLANA_KEY_MESSAGE, SUI_KEY_MESSAGE);
    }
}
