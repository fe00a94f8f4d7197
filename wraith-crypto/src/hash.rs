//! SHA-512 helpers with domain separation.
//!
//! Every hash in the protocol is SHA-512 over a concatenation of parts, with a
//! label from `wraith_core::constants` mixed in so that two operations over
//! the same input (the tweak and the envelope key, notably) never agree.
//!
//! ```text
//! tagged(domain, parts) = SHA-512(domain || parts[0] || parts[1] || ...)
//! ```

use curve25519_dalek::scalar::Scalar;
use sha2::{Digest, Sha512};
use zeroize::Zeroize;

/// SHA-512 over the concatenation of `parts`.
pub fn sha512(parts: &[&[u8]]) -> [u8; 64] {
    let mut hasher = Sha512::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// SHA-512 with `domain` prepended.
pub fn tagged_sha512(domain: &[u8], parts: &[&[u8]]) -> [u8; 64] {
    let mut hasher = Sha512::new();
    hasher.update(domain);
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// First 32 bytes of [`tagged_sha512`].
pub fn tagged_sha512_32(domain: &[u8], parts: &[&[u8]]) -> [u8; 32] {
    let mut wide = tagged_sha512(domain, parts);
    let mut out = [0u8; 32];
    out.copy_from_slice(&wide[..32]);
    wide.zeroize();
    out
}

/// Hashes into a scalar by reducing the full 512-bit digest modulo `L`.
///
/// Wide reduction keeps the result uniform over the group order.
pub fn hash_to_scalar(domain: &[u8], parts: &[&[u8]]) -> Scalar {
    let mut wide = tagged_sha512(domain, parts);
    let scalar = Scalar::from_bytes_mod_order_wide(&wide);
    wide.zeroize();
    scalar
}

#[cfg(test)]
mod tests {
    use super::*;
    use wraith_core::constants::*;

    #[test]
    fn test_sha512_known_vector() {
        let digest = sha512(&[b"abc"]);
        assert_eq!(
            hex::encode(&digest[..16]),
            "ddaf35a193617abacc417349ae204131"
        );
    }

    #[test]
    fn test_parts_concatenate() {
        assert_eq!(sha512(&[b"ab", b"c"]), sha512(&[b"abc"]));
        assert_eq!(
            tagged_sha512(b"dom", &[b"x"]),
            sha512(&[b"dom", b"x"])
        );
    }

    #[test]
    fn test_domains_produce_different_outputs() {
        let shared = [7u8; 32];
        let tweak = tagged_sha512(DOMAIN_STEALTH_TWEAK, &[&shared]);
        let key = tagged_sha512(DOMAIN_ENVELOPE_KEY, &[&shared]);
        assert_ne!(tweak, key);
    }

    #[test]
    fn test_hash_to_scalar_is_canonical() {
        let s = hash_to_scalar(DOMAIN_STEALTH_TWEAK, &[b"input"]);
        let canonical: Option<Scalar> = Scalar::from_canonical_bytes(s.to_bytes()).into();
        assert_eq!(canonical, Some(s));
    }

    #[test]
    fn test_truncated_matches_prefix() {
        let full = tagged_sha512(b"d", &[b"i"]);
        let short = tagged_sha512_32(b"d", &[b"i"]);
        assert_eq!(&full[..32], &short);
    }
}
