//! Common traits for WRAITH.
//!
//! Everything outside the protocol core (wallet adapters, the indexer backend,
//! the attestation service, wall-clock sleeping) is reached through these
//! seams so each flow can be driven by mocks in tests.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{
    AttestationStatus, Chain, PublicKey, RecipientRecord, StealthBalance, Transaction,
    TransferRequest, TxRef, TxStatus, WithdrawalRecord,
};

// ═══════════════════════════════════════════════════════════════════════════════
// CHAIN WALLET
// ═══════════════════════════════════════════════════════════════════════════════

/// The user's connected wallet on one chain.
///
/// Used to sign the key-derivation message, co-sign withdrawals as fee payer,
/// and submit transactions.
#[async_trait]
pub trait ChainWallet: Send + Sync {
    /// Chain this wallet lives on.
    fn chain(&self) -> Chain;

    /// Public key of the connected account.
    fn public_key(&self) -> PublicKey;

    /// Signs arbitrary message bytes.
    async fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>>;

    /// Adds the wallet's signature to a transaction.
    async fn sign_transaction(&self, tx: Transaction) -> Result<Transaction>;

    /// Submits a fully signed transaction.
    async fn send_transaction(&self, tx: &Transaction) -> Result<TxRef>;

    /// Waits for a submitted transaction to finalize.
    async fn confirm(&self, tx: &TxRef) -> Result<TxStatus>;
}

/// Encodes transfers into chain-specific transaction messages.
pub trait TransferBuilder: Send + Sync {
    /// Builds an unsigned transfer paid for by `fee_payer`.
    fn build_transfer(&self, request: &TransferRequest, fee_payer: &PublicKey)
        -> Result<Transaction>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// INDEXER
// ═══════════════════════════════════════════════════════════════════════════════

/// Passive indexer/relay holding recipient records and observed payments.
///
/// Implementations:
/// - `HttpIndexer` (reqwest, production)
/// - `MemoryIndexer` (tests, offline CLI runs)
#[async_trait]
pub trait Indexer: Send + Sync {
    /// Looks up a recipient's published keys by identifier.
    async fn lookup_address(&self, recipient: &str) -> Result<RecipientRecord>;

    /// Lists the stealth balances observed for a recipient.
    async fn balances(&self, recipient: &str) -> Result<Vec<StealthBalance>>;

    /// Records a completed withdrawal for later lookup.
    async fn submit_withdrawal(&self, record: &WithdrawalRecord) -> Result<()>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// ATTESTATION
// ═══════════════════════════════════════════════════════════════════════════════

/// External service that attests burns on a source chain.
#[async_trait]
pub trait AttestationSource: Send + Sync {
    /// Fetches the attestation for the burn `tx_hash` on `source_domain`.
    async fn fetch_attestation(&self, source_domain: u32, tx_hash: &str)
        -> Result<AttestationStatus>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// TIME
// ═══════════════════════════════════════════════════════════════════════════════

/// Sleep abstraction so retry loops can run without real delays in tests.
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Suspends for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// [`Sleeper`] backed by `tokio::time::sleep`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_tokio_sleeper_advances_clock() {
        let start = tokio::time::Instant::now();
        TokioSleeper.sleep(Duration::from_secs(15)).await;
        assert!(start.elapsed() >= Duration::from_secs(15));
    }
}
