//! In-memory indexer.
//!
//! Thread-safe stand-in for the indexer backend, for tests and offline CLI
//! runs.

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::{debug, instrument};

use wraith_core::error::{Result, WraithError};
use wraith_core::traits::Indexer;
use wraith_core::types::{RecipientRecord, StealthBalance, WithdrawalRecord};

/// In-memory indexer.
///
/// # Indexing
///
/// - Recipient id → published keys
/// - Owner id → observed stealth balances, in arrival order
/// - Withdrawal records, in submission order (ids are unique)
#[derive(Debug, Default)]
pub struct MemoryIndexer {
    recipients: DashMap<String, RecipientRecord>,
    balances: DashMap<String, Vec<StealthBalance>>,
    withdrawals: RwLock<Vec<WithdrawalRecord>>,
}

impl MemoryIndexer {
    /// Creates an empty indexer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes a recipient's keys under `id`, replacing any previous record.
    pub fn register(&self, id: impl Into<String>, record: RecipientRecord) {
        let id = id.into();
        debug!(%id, "registering recipient");
        self.recipients.insert(id, record);
    }

    /// Records a payment observed for `owner`.
    pub fn add_balance(&self, owner: impl Into<String>, balance: StealthBalance) {
        self.balances.entry(owner.into()).or_default().push(balance);
    }

    /// Returns every withdrawal submitted so far.
    pub fn withdrawals(&self) -> Vec<WithdrawalRecord> {
        self.withdrawals.read().clone()
    }

    /// Number of registered recipients.
    pub fn recipient_count(&self) -> usize {
        self.recipients.len()
    }

    /// Removes everything.
    pub fn clear(&self) {
        self.recipients.clear();
        self.balances.clear();
        self.withdrawals.write().clear();
    }
}

#[async_trait]
impl Indexer for MemoryIndexer {
    async fn lookup_address(&self, recipient: &str) -> Result<RecipientRecord> {
        self.recipients
            .get(recipient)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| WraithError::NotFound(format!("recipient {recipient}")))
    }

    async fn balances(&self, recipient: &str) -> Result<Vec<StealthBalance>> {
        Ok(self
            .balances
            .get(recipient)
            .map(|entry| entry.value().clone())
            .unwrap_or_default())
    }

    #[instrument(skip(self, record), fields(withdrawal_id = %record.withdrawal_id))]
    async fn submit_withdrawal(&self, record: &WithdrawalRecord) -> Result<()> {
        if record.withdrawal_id.is_empty() {
            return Err(WraithError::ValidationError(
                "withdrawal id cannot be empty".into(),
            ));
        }

        let mut withdrawals = self.withdrawals.write();
        if withdrawals
            .iter()
            .any(|w| w.withdrawal_id == record.withdrawal_id)
        {
            return Err(WraithError::ValidationError(format!(
                "withdrawal {} already recorded",
                record.withdrawal_id
            )));
        }
        withdrawals.push(record.clone());
        debug!(total = withdrawals.len(), "withdrawal recorded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wraith_core::types::{Chain, Envelope, PublicKey};

    fn record(id: &str) -> WithdrawalRecord {
        WithdrawalRecord {
            withdrawal_id: id.into(),
            chain: Chain::Solana,
            mint: "USDC".into(),
            amount: 1,
        }
    }

    #[tokio::test]
    async fn test_register_and_lookup() {
        let indexer = MemoryIndexer::new();
        let rec = RecipientRecord {
            meta_spend_pub: PublicKey::from_array([1; 32]),
            meta_view_pub: PublicKey::from_array([2; 32]),
            source_chain: Chain::Sui,
            link_data: None,
        };
        indexer.register("bob", rec.clone());

        assert_eq!(indexer.lookup_address("bob").await.unwrap(), rec);
        assert!(matches!(
            indexer.lookup_address("carol").await,
            Err(WraithError::NotFound(_))
        ));
        assert_eq!(indexer.recipient_count(), 1);
    }

    #[tokio::test]
    async fn test_balances_in_arrival_order() {
        let indexer = MemoryIndexer::new();
        for amount in [3, 5] {
            indexer.add_balance(
                "bob",
                StealthBalance {
                    address: PublicKey::from_array([amount as u8; 32]),
                    ephemeral_pubkey: PublicKey::from_array([9; 32]),
                    memo: Envelope::from_bytes(&[0; 80]).unwrap(),
                    mint: "USDC".into(),
                    amount,
                },
            );
        }

        let balances = indexer.balances("bob").await.unwrap();
        assert_eq!(balances.iter().map(|b| b.amount).collect::<Vec<_>>(), [3, 5]);
        assert!(indexer.balances("carol").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_withdrawal_ids_unique() {
        let indexer = MemoryIndexer::new();
        indexer.submit_withdrawal(&record("a,b")).await.unwrap();
        assert!(indexer.submit_withdrawal(&record("a,b")).await.is_err());
        assert!(indexer.submit_withdrawal(&record("")).await.is_err());
        assert_eq!(indexer.withdrawals().len(), 1);

        indexer.clear();
        assert!(indexer.withdrawals().is_empty());
    }
}
