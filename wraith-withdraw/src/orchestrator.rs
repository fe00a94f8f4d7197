//! Sequential multi-transaction withdrawals.
//!
//! One withdrawal becomes one transaction per pick. Picks run strictly in
//! order: pick `i + 1` is not dispatched until pick `i` has confirmed or
//! failed, which keeps the fee payer's nonce/gas objects uncontended.
//!
//! ## Per-pick flow
//!
//! ```text
//! recover one-time key (envelope + reconstruct)
//!   → check it controls the recorded address
//!   → build transfer (stealth account → destination)
//!   → sign as owner with the one-time key
//!   → wallet co-signs as fee payer
//!   → send, confirm
//! ```
//!
//! A failing pick is recorded and the loop moves on; the caller gets every
//! success and every failure back.
//!
//! Picks are reserved in the [`BalanceBook`] when they are selected. A
//! confirmed pick is committed, a pick that never reached the chain is
//! released. A pick that was submitted but then timed out or was cancelled
//! stays reserved, since the chain may still confirm it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use wraith_core::cancel::CancelToken;
use wraith_core::constants::WITHDRAWAL_ID_DELIMITER;
use wraith_core::error::{Result, WraithError};
use wraith_core::notify::RefreshNotifier;
use wraith_core::traits::{ChainWallet, Indexer, TransferBuilder};
use wraith_core::types::{
    PublicKey, TransferRequest, TxRef, TxStatus, WithdrawalPick, WithdrawalRecord,
};
use wraith_crypto::MetaKeyPair;
use wraith_stealth::recover_spend_key;

use crate::book::BalanceBook;

// ═══════════════════════════════════════════════════════════════════════════════
// CONFIGURATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Orchestrator configuration.
#[derive(Clone, Debug)]
pub struct OrchestratorConfig {
    /// Upper bound on one pick's send + confirm round-trip
    pub pick_timeout: Option<Duration>,
    /// Whether to post the withdrawal id to the indexer
    pub submit_record: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            pick_timeout: None,
            submit_record: true,
        }
    }
}

impl OrchestratorConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bounds each pick's chain round-trip.
    pub fn pick_timeout(mut self, timeout: Duration) -> Self {
        self.pick_timeout = Some(timeout);
        self
    }

    /// Skips posting the withdrawal record.
    pub fn without_record(mut self) -> Self {
        self.submit_record = false;
        self
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// REQUEST & OUTCOME
// ═══════════════════════════════════════════════════════════════════════════════

/// What the user asked to withdraw.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WithdrawalRequest {
    /// Token mint / coin type
    pub mint: String,
    /// Total amount to move
    pub amount: u64,
    /// Address receiving the funds
    pub destination: PublicKey,
    /// Optional link label carried into every transfer
    pub label: Option<String>,
}

/// A pick whose transaction confirmed.
#[derive(Clone, Debug, Serialize)]
pub struct PickSuccess {
    /// The pick
    pub pick: WithdrawalPick,
    /// Confirmed transaction
    pub tx: TxRef,
}

/// A pick that did not go through.
#[derive(Debug)]
pub struct PickFailure {
    /// The pick
    pub pick: WithdrawalPick,
    /// Why it failed
    pub error: WraithError,
    /// The transaction was submitted and may still land; the pick stays
    /// reserved in the book until [`BalanceBook::release`] or
    /// [`BalanceBook::commit`] settles it
    pub in_doubt: bool,
}

struct PickError {
    error: WraithError,
    submitted: bool,
}

impl From<WraithError> for PickError {
    fn from(error: WraithError) -> Self {
        Self {
            error,
            submitted: false,
        }
    }
}

/// Aggregate result of a withdrawal.
///
/// Successful if at least one pick went through; check
/// [`is_complete`](Self::is_complete) to know whether the full amount moved.
#[derive(Debug)]
pub struct WithdrawalOutcome {
    /// Amount originally requested
    pub requested: u64,
    /// Picks that confirmed, in dispatch order
    pub successes: Vec<PickSuccess>,
    /// Picks that failed, in dispatch order
    pub failures: Vec<PickFailure>,
    /// Successful transaction refs joined by the withdrawal delimiter
    pub withdrawal_id: Option<String>,
    /// When the last pick finished
    pub completed_at: DateTime<Utc>,
}

impl WithdrawalOutcome {
    /// True if at least one pick confirmed.
    pub fn is_success(&self) -> bool {
        !self.successes.is_empty()
    }

    /// True if every pick confirmed.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && !self.successes.is_empty()
    }

    /// Amount that actually moved.
    pub fn moved(&self) -> u64 {
        self.successes
            .iter()
            .map(|s| s.pick.amount_to_take)
            .sum()
    }

    /// Converts an all-failed outcome into `WithdrawalFailed`.
    pub fn into_result(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(WraithError::WithdrawalFailed(self.failures.len()))
        }
    }
}

/// Joins transaction refs into one withdrawal id.
pub fn join_withdrawal_id<'a>(txs: impl IntoIterator<Item = &'a TxRef>) -> String {
    txs.into_iter()
        .map(TxRef::as_str)
        .collect::<Vec<_>>()
        .join(WITHDRAWAL_ID_DELIMITER)
}

// ═══════════════════════════════════════════════════════════════════════════════
// ORCHESTRATOR
// ═══════════════════════════════════════════════════════════════════════════════

/// Drives withdrawals across several stealth balances.
pub struct WithdrawalOrchestrator {
    wallet: Arc<dyn ChainWallet>,
    builder: Arc<dyn TransferBuilder>,
    indexer: Option<Arc<dyn Indexer>>,
    notifier: RefreshNotifier,
    config: OrchestratorConfig,
}

impl WithdrawalOrchestrator {
    /// Creates an orchestrator paying fees from `wallet`.
    pub fn new(wallet: Arc<dyn ChainWallet>, builder: Arc<dyn TransferBuilder>) -> Self {
        Self {
            wallet,
            builder,
            indexer: None,
            notifier: RefreshNotifier::new(),
            config: OrchestratorConfig::default(),
        }
    }

    /// Posts withdrawal records to `indexer`.
    pub fn with_indexer(mut self, indexer: Arc<dyn Indexer>) -> Self {
        self.indexer = Some(indexer);
        self
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Refresh signal fired after any withdrawal that moved funds.
    pub fn notifier(&self) -> &RefreshNotifier {
        &self.notifier
    }

    /// Withdraws `request.amount` of `request.mint` to `request.destination`.
    ///
    /// Picks are reserved in `book` up front, so concurrent withdrawals over
    /// the same book never claim the same funds.
    ///
    /// # Errors
    /// `InsufficientFunds` (or `ValidationError` for a zero amount) before any
    /// transaction is built. Per-pick errors land in the outcome instead.
    #[instrument(skip(self, keys, book, cancel), fields(mint = %request.mint, amount = request.amount))]
    pub async fn withdraw(
        &self,
        keys: &MetaKeyPair,
        book: &BalanceBook,
        request: &WithdrawalRequest,
        cancel: &CancelToken,
    ) -> Result<WithdrawalOutcome> {
        let picks = book.reserve(&request.mint, request.amount)?;
        info!(picks = picks.len(), "dispatching withdrawal");

        let mut successes = Vec::new();
        let mut failures = Vec::new();

        for (index, pick) in picks.into_iter().enumerate() {
            if cancel.is_cancelled() {
                book.release(&pick);
                failures.push(PickFailure {
                    pick,
                    error: WraithError::Cancelled("withdrawal cancelled before dispatch".into()),
                    in_doubt: false,
                });
                continue;
            }

            match self.execute_pick(keys, &pick, request, cancel).await {
                Ok(tx) => {
                    info!(index, %tx, amount = pick.amount_to_take, "pick confirmed");
                    book.commit(&pick);
                    successes.push(PickSuccess { pick, tx });
                }
                Err(PickError { error, submitted }) => {
                    if submitted {
                        warn!(
                            index,
                            address = %pick.balance.address,
                            %error,
                            "pick in doubt, keeping reservation"
                        );
                    } else {
                        warn!(index, address = %pick.balance.address, %error, "pick failed");
                        book.release(&pick);
                    }
                    failures.push(PickFailure {
                        pick,
                        error,
                        in_doubt: submitted,
                    });
                }
            }
        }

        let withdrawal_id = if successes.is_empty() {
            None
        } else {
            Some(join_withdrawal_id(successes.iter().map(|s| &s.tx)))
        };

        let outcome = WithdrawalOutcome {
            requested: request.amount,
            successes,
            failures,
            withdrawal_id,
            completed_at: Utc::now(),
        };

        if let Some(id) = &outcome.withdrawal_id {
            self.submit_record(id, request, outcome.moved()).await;
            self.notifier.notify();
        }

        info!(
            succeeded = outcome.successes.len(),
            failed = outcome.failures.len(),
            moved = outcome.moved(),
            "withdrawal finished"
        );
        Ok(outcome)
    }

    async fn execute_pick(
        &self,
        keys: &MetaKeyPair,
        pick: &WithdrawalPick,
        request: &WithdrawalRequest,
        cancel: &CancelToken,
    ) -> std::result::Result<TxRef, PickError> {
        let one_time = recover_spend_key(keys, &pick.balance)?;

        let transfer = TransferRequest {
            from: one_time.public_key(),
            to: request.destination,
            mint: request.mint.clone(),
            amount: pick.amount_to_take,
            label: request.label.clone(),
        };
        let fee_payer = self.wallet.public_key();
        let mut tx = self
            .builder
            .build_transfer(&transfer, &fee_payer)?
            .with_fee_payer(fee_payer);

        let owner_signature = one_time.sign(&tx.message)?;
        tx.add_signature(one_time.public_key(), owner_signature.to_vec());
        drop(one_time);

        // Set once the transaction may have reached the chain.
        let submitted = AtomicBool::new(false);

        let round_trip = async {
            let signed = self.wallet.sign_transaction(tx).await?;
            submitted.store(true, Ordering::SeqCst);
            let tx_ref = self.wallet.send_transaction(&signed).await.map_err(|e| {
                submitted.store(false, Ordering::SeqCst);
                e
            })?;
            debug!(%tx_ref, "submitted, awaiting confirmation");
            let status = self.wallet.confirm(&tx_ref).await?;
            if matches!(status, TxStatus::Failed(_)) {
                submitted.store(false, Ordering::SeqCst);
            }
            status.into_result(&tx_ref)?;
            Ok::<_, WraithError>(tx_ref)
        };

        let bounded = async {
            match self.config.pick_timeout {
                Some(limit) => tokio::time::timeout(limit, round_trip)
                    .await
                    .map_err(|_| {
                        WraithError::ChainSubmissionError(format!(
                            "no confirmation within {}s",
                            limit.as_secs()
                        ))
                    })?,
                None => round_trip.await,
            }
        };

        let result = tokio::select! {
            result = bounded => result,
            _ = cancel.cancelled() => Err(WraithError::Cancelled(
                "withdrawal cancelled while awaiting confirmation".into(),
            )),
        };
        result.map_err(|error| PickError {
            error,
            submitted: submitted.load(Ordering::SeqCst),
        })
    }

    async fn submit_record(&self, withdrawal_id: &str, request: &WithdrawalRequest, moved: u64) {
        if !self.config.submit_record {
            return;
        }
        let Some(indexer) = &self.indexer else {
            return;
        };

        let record = WithdrawalRecord {
            withdrawal_id: withdrawal_id.to_string(),
            chain: self.wallet.chain(),
            mint: request.mint.clone(),
            amount: moved,
        };
        if let Err(e) = indexer.submit_withdrawal(&record).await {
            warn!(error = %e, "failed to record withdrawal with indexer");
        }
    }
}

impl std::fmt::Debug for WithdrawalOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WithdrawalOrchestrator")
            .field("fee_payer", &self.wallet.public_key())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
