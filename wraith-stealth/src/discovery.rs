//! Payment discovery and spend-key recovery (recipient side).

use tracing::{debug, warn};

use wraith_core::error::{Result, WraithError};
use wraith_core::types::StealthBalance;
use wraith_crypto::primitives::keys_equal;
use wraith_crypto::{open_envelope, reconstruct_stealth_key, stealth_address_for_view};
use wraith_crypto::{MetaKeyPair, OneTimeKey};

/// Result of checking one balance record against our keys.
#[derive(Debug)]
pub enum ScanResult {
    /// Address does not derive from our keys
    NotForUs,
    /// Address matches and the envelope opened cleanly
    Discovered,
    /// Address matches but the record is unusable
    Failed(WraithError),
}

impl ScanResult {
    /// Returns true if the payment is ours and spendable.
    pub fn is_discovered(&self) -> bool {
        matches!(self, ScanResult::Discovered)
    }
}

/// Statistics for a batch scan.
#[derive(Debug, Clone, Default)]
pub struct ScanStats {
    /// Records examined
    pub total_scanned: u64,
    /// Records that belong to us
    pub discoveries: u64,
    /// Records that matched but failed integrity checks
    pub errors: u64,
}

impl ScanStats {
    /// Records a scan result.
    pub fn record(&mut self, result: &ScanResult) {
        self.total_scanned += 1;
        match result {
            ScanResult::Discovered => self.discoveries += 1,
            ScanResult::Failed(_) => self.errors += 1,
            ScanResult::NotForUs => {}
        }
    }
}

/// Checks whether `balance` was paid to `keys`.
///
/// Uses the view key to recompute the address, then opens the envelope to
/// make sure the payment is spendable.
pub fn scan_balance(keys: &MetaKeyPair, balance: &StealthBalance) -> ScanResult {
    let expected = match stealth_address_for_view(
        &keys.view().secret,
        &keys.spend_pub(),
        &balance.ephemeral_pubkey,
    ) {
        Ok(address) => address,
        Err(_) => return ScanResult::NotForUs,
    };

    if !keys_equal(&expected, &balance.address) {
        return ScanResult::NotForUs;
    }

    match open_envelope(&balance.memo, &keys.view().secret, &balance.ephemeral_pubkey) {
        Ok(_) => ScanResult::Discovered,
        Err(e) => ScanResult::Failed(e),
    }
}

/// Filters `balances` down to the spendable ones that belong to `keys`.
pub fn scan_balances(
    keys: &MetaKeyPair,
    balances: Vec<StealthBalance>,
) -> (Vec<StealthBalance>, ScanStats) {
    let mut stats = ScanStats::default();
    let mut ours = Vec::new();

    for balance in balances {
        let result = scan_balance(keys, &balance);
        stats.record(&result);
        match result {
            ScanResult::Discovered => ours.push(balance),
            ScanResult::Failed(e) => {
                warn!(address = %balance.address, error = %e, "skipping unusable stealth balance");
            }
            ScanResult::NotForUs => {}
        }
    }

    debug!(
        scanned = stats.total_scanned,
        discovered = stats.discoveries,
        errors = stats.errors,
        "scan complete"
    );
    (ours, stats)
}

/// Recovers the one-time spending key of `balance`.
///
/// # Errors
/// - `DecryptionIntegrityFailure` if the envelope does not open cleanly
/// - `DerivationMismatch` if the reconstructed key controls a different
///   address than the one recorded
pub fn recover_spend_key(keys: &MetaKeyPair, balance: &StealthBalance) -> Result<OneTimeKey> {
    let ephemeral = open_envelope(&balance.memo, &keys.view().secret, &balance.ephemeral_pubkey)?;
    let one_time = reconstruct_stealth_key(keys.spend(), &keys.view_pub(), &ephemeral.secret)?;

    let derived = one_time.public_key();
    if !keys_equal(&derived, &balance.address) {
        return Err(WraithError::DerivationMismatch {
            expected: balance.address.to_base58(),
            derived: derived.to_base58(),
        });
    }

    Ok(one_time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payment::create_stealth_payment;
    use wraith_core::types::PublicKey;

    fn recipient() -> MetaKeyPair {
        MetaKeyPair::derive(&[0x21; 64], "8642").unwrap()
    }

    fn balance_for(keys: &MetaKeyPair, amount: u64) -> StealthBalance {
        create_stealth_payment(&keys.meta_address())
            .unwrap()
            .into_balance("USDC", amount)
    }

    #[test]
    fn test_recover_spend_key_matches_address() {
        let keys = recipient();
        let balance = balance_for(&keys, 10);
        let key = recover_spend_key(&keys, &balance).unwrap();
        assert_eq!(key.public_key(), balance.address);
    }

    #[test]
    fn test_recover_rejects_wrong_recorded_address() {
        let keys = recipient();
        let mut balance = balance_for(&keys, 10);
        balance.address = balance_for(&keys, 10).address;
        assert!(matches!(
            recover_spend_key(&keys, &balance),
            Err(WraithError::DerivationMismatch { .. })
        ));
    }

    #[test]
    fn test_recover_rejects_tampered_memo() {
        let keys = recipient();
        let mut balance = balance_for(&keys, 10);
        let mut bytes = balance.memo.as_bytes().to_vec();
        bytes[40] ^= 0x01;
        balance.memo = wraith_core::types::Envelope::from_bytes(&bytes).unwrap();
        assert!(matches!(
            recover_spend_key(&keys, &balance),
            Err(WraithError::DecryptionIntegrityFailure(_))
        ));
    }

    #[test]
    fn test_scan_separates_ours_from_others() {
        let keys = recipient();
        let stranger = MetaKeyPair::derive(&[0x99; 64], "8642").unwrap();

        let mine = balance_for(&keys, 3);
        let theirs = balance_for(&stranger, 4);
        let mut broken = balance_for(&keys, 5);
        let mut bytes = broken.memo.as_bytes().to_vec();
        bytes[0] ^= 0xFF;
        broken.memo = wraith_core::types::Envelope::from_bytes(&bytes).unwrap();

        let (ours, stats) = scan_balances(&keys, vec![mine.clone(), theirs, broken]);
        assert_eq!(ours, vec![mine]);
        assert_eq!(stats.total_scanned, 3);
        assert_eq!(stats.discoveries, 1);
        assert_eq!(stats.errors, 1);
    }

    #[test]
    fn test_scan_malformed_ephemeral_is_not_ours() {
        let keys = recipient();
        let mut balance = balance_for(&keys, 1);
        let mut bytes = [0u8; 32];
        bytes[0] = 2;
        balance.ephemeral_pubkey = PublicKey::from_array(bytes);
        assert!(matches!(scan_balance(&keys, &balance), ScanResult::NotForUs));
    }
}
