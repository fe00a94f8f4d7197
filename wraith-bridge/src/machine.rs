//! Bridge state machine.
//!
//! ```text
//! Burning ──burn──▶ AwaitingAttestation ──poll──▶ Claiming ──claim──▶ Done
//!    │                     │                         │
//!    └─────────────────────┴──────────▶ Failed ◀─────┘
//! ```
//!
//! The claim step is where the stealth payment is generated: funds minted on
//! the destination chain land directly in a fresh one-time address of the
//! recipient. Every failure after the burn keeps the [`BurnReceipt`] so the
//! flow can be resumed with [`Bridge::resume`].

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};

use wraith_core::cancel::CancelToken;
use wraith_core::error::{Result, WraithError};
use wraith_core::notify::RefreshNotifier;
use wraith_core::traits::{AttestationSource, Sleeper, TokioSleeper};
use wraith_core::types::{AttestationStatus, Chain, MetaAddress, TxRef};
use wraith_stealth::{StealthPayment, StealthPaymentBuilder};

use crate::retry::{poll_until_ready, PollError, Probe, RetryPolicy};

const PHASE_CHANNEL_CAPACITY: usize = 16;

// ═══════════════════════════════════════════════════════════════════════════════
// REQUESTS & RECEIPTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Tokens to burn on the source chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BurnRequest {
    /// Bridge domain of the source chain
    pub source_domain: u32,
    /// Bridge domain of the destination chain
    pub destination_domain: u32,
    /// Token mint burned on the source chain
    pub mint: String,
    /// Amount in base units
    pub amount: u64,
}

/// Proof that the burn happened. Survives every later failure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BurnReceipt {
    /// Bridge domain of the source chain
    pub source_domain: u32,
    /// Bridge domain of the destination chain
    pub destination_domain: u32,
    /// Token mint burned on the source chain
    pub mint: String,
    /// Burn transaction hash on the source chain
    pub tx_hash: String,
    /// Amount burned
    pub amount: u64,
    /// When the burn confirmed
    pub burned_at: DateTime<Utc>,
}

impl BurnReceipt {
    /// The burn this receipt proves.
    pub fn request(&self) -> BurnRequest {
        BurnRequest {
            source_domain: self.source_domain,
            destination_domain: self.destination_domain,
            mint: self.mint.clone(),
            amount: self.amount,
        }
    }
}

/// A complete bridge request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BridgeRequest {
    /// What to burn
    pub burn: BurnRequest,
    /// Recipient on the destination chain
    pub recipient: MetaAddress,
    /// Optional link label for the resulting payment
    pub label: Option<String>,
}

/// Everything the destination chain needs to mint into a stealth address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClaimRequest {
    /// The burn being redeemed
    pub receipt: BurnReceipt,
    /// Attestation bytes from the attestation service
    pub attestation: Vec<u8>,
    /// One-time address, ephemeral key and envelope for the recipient
    pub payment: StealthPayment,
}

// ═══════════════════════════════════════════════════════════════════════════════
// COLLABORATORS
// ═══════════════════════════════════════════════════════════════════════════════

/// Burns tokens on the source chain.
#[async_trait]
pub trait BurnSource: Send + Sync {
    /// Burns and waits for confirmation.
    async fn burn(&self, request: &BurnRequest) -> Result<BurnReceipt>;
}

/// Mints on the destination chain against an attestation.
#[async_trait]
pub trait ClaimDestination: Send + Sync {
    /// Destination chain.
    fn chain(&self) -> Chain;

    /// Submits the claim and waits for confirmation.
    async fn claim(&self, claim: &ClaimRequest) -> Result<TxRef>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// STATES
// ═══════════════════════════════════════════════════════════════════════════════

/// State tag without payload, for observers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BridgePhase {
    /// Submitting the burn
    Burning,
    /// Polling the attestation service
    AwaitingAttestation,
    /// Submitting the claim
    Claiming,
    /// Funds minted into the stealth address
    Done,
    /// Stopped; see the failure for where and why
    Failed,
}

impl fmt::Display for BridgePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BridgePhase::Burning => "burning",
            BridgePhase::AwaitingAttestation => "awaiting attestation",
            BridgePhase::Claiming => "claiming",
            BridgePhase::Done => "done",
            BridgePhase::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Successful end of a bridge run.
#[derive(Clone, Debug)]
pub struct BridgeCompletion {
    /// The redeemed burn
    pub receipt: BurnReceipt,
    /// Claim transaction on the destination chain
    pub claim_tx: TxRef,
    /// Stealth payment the funds were minted into
    pub payment: StealthPayment,
}

/// Unsuccessful end of a bridge run.
#[derive(Debug)]
pub struct BridgeFailure {
    /// Phase the failure happened in
    pub phase: BridgePhase,
    /// Burn receipt, if the burn went through
    pub receipt: Option<BurnReceipt>,
    /// What went wrong
    pub error: WraithError,
}

/// Bridge state with the data each phase carries.
#[derive(Debug)]
pub enum BridgeState {
    /// Not yet burned
    Burning,
    /// Burned, waiting for the attestation
    AwaitingAttestation(BurnReceipt),
    /// Attested, claim pending
    Claiming {
        /// The burn
        receipt: BurnReceipt,
        /// Attestation bytes
        attestation: Vec<u8>,
    },
    /// Terminal success
    Done(BridgeCompletion),
    /// Terminal failure
    Failed(BridgeFailure),
}

impl BridgeState {
    /// Payload-free tag of this state.
    pub fn phase(&self) -> BridgePhase {
        match self {
            BridgeState::Burning => BridgePhase::Burning,
            BridgeState::AwaitingAttestation(_) => BridgePhase::AwaitingAttestation,
            BridgeState::Claiming { .. } => BridgePhase::Claiming,
            BridgeState::Done(_) => BridgePhase::Done,
            BridgeState::Failed(_) => BridgePhase::Failed,
        }
    }

    /// True for `Done` and `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, BridgeState::Done(_) | BridgeState::Failed(_))
    }

    /// Burn receipt, once there is one.
    pub fn receipt(&self) -> Option<&BurnReceipt> {
        match self {
            BridgeState::Burning => None,
            BridgeState::AwaitingAttestation(receipt) | BridgeState::Claiming { receipt, .. } => {
                Some(receipt)
            }
            BridgeState::Done(done) => Some(&done.receipt),
            BridgeState::Failed(failure) => failure.receipt.as_ref(),
        }
    }

    /// Converts a terminal state into a `Result`.
    pub fn into_result(self) -> Result<BridgeCompletion> {
        match self {
            BridgeState::Done(done) => Ok(done),
            BridgeState::Failed(failure) => Err(failure.error),
            other => Err(WraithError::InternalError(format!(
                "bridge stopped in non-terminal phase {}",
                other.phase()
            ))),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// BRIDGE
// ═══════════════════════════════════════════════════════════════════════════════

/// Drives burn → attestation → claim.
pub struct Bridge {
    burner: Arc<dyn BurnSource>,
    attestations: Arc<dyn AttestationSource>,
    destination: Arc<dyn ClaimDestination>,
    sleeper: Arc<dyn Sleeper>,
    policy: RetryPolicy,
    notifier: RefreshNotifier,
    phases: broadcast::Sender<BridgePhase>,
}

impl Bridge {
    /// Creates a bridge with the default attestation policy (15s × 12).
    pub fn new(
        burner: Arc<dyn BurnSource>,
        attestations: Arc<dyn AttestationSource>,
        destination: Arc<dyn ClaimDestination>,
    ) -> Self {
        let (phases, _) = broadcast::channel(PHASE_CHANNEL_CAPACITY);
        Self {
            burner,
            attestations,
            destination,
            sleeper: Arc::new(TokioSleeper),
            policy: RetryPolicy::default(),
            notifier: RefreshNotifier::new(),
            phases,
        }
    }

    /// Replaces the attestation polling policy.
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replaces the sleeper used between polls.
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Refresh signal fired after every completed bridge.
    pub fn notifier(&self) -> &RefreshNotifier {
        &self.notifier
    }

    /// Subscribes to phase transitions.
    pub fn subscribe_phases(&self) -> broadcast::Receiver<BridgePhase> {
        self.phases.subscribe()
    }

    /// Runs a bridge from the burn to a terminal state.
    #[instrument(skip(self, request, cancel), fields(
        source = request.burn.source_domain,
        destination = request.burn.destination_domain,
        amount = request.burn.amount,
    ))]
    pub async fn run(&self, request: &BridgeRequest, cancel: &CancelToken) -> BridgeState {
        if let Err(error) = request.recipient.validate() {
            let state = BridgeState::Failed(BridgeFailure {
                phase: BridgePhase::Burning,
                receipt: None,
                error,
            });
            self.publish(&state);
            return state;
        }
        self.drive(BridgeState::Burning, request, cancel).await
    }

    /// Picks up a bridge whose burn already went through.
    #[instrument(skip(self, receipt, recipient, cancel), fields(tx_hash = %receipt.tx_hash))]
    pub async fn resume(
        &self,
        receipt: BurnReceipt,
        recipient: MetaAddress,
        label: Option<String>,
        cancel: &CancelToken,
    ) -> BridgeState {
        let request = BridgeRequest {
            burn: receipt.request(),
            recipient,
            label,
        };
        self.drive(BridgeState::AwaitingAttestation(receipt), &request, cancel)
            .await
    }

    async fn drive(
        &self,
        mut state: BridgeState,
        request: &BridgeRequest,
        cancel: &CancelToken,
    ) -> BridgeState {
        loop {
            self.publish(&state);
            if state.is_terminal() {
                break;
            }
            state = self.step(state, request, cancel).await;
        }

        match &state {
            BridgeState::Done(done) => {
                info!(claim_tx = %done.claim_tx, stealth_address = %done.payment.stealth_address, "bridge complete");
                self.notifier.notify();
            }
            BridgeState::Failed(failure) => {
                warn!(
                    phase = %failure.phase,
                    tx_hash = failure.receipt.as_ref().map(|r| r.tx_hash.as_str()),
                    error = %failure.error,
                    "bridge failed"
                );
            }
            _ => {}
        }
        state
    }

    /// Advances one transition. Terminal states are returned unchanged.
    pub async fn step(
        &self,
        state: BridgeState,
        request: &BridgeRequest,
        cancel: &CancelToken,
    ) -> BridgeState {
        match state {
            BridgeState::Burning => match self.burn(&request.burn, cancel).await {
                Ok(receipt) => BridgeState::AwaitingAttestation(receipt),
                Err(error) => fail(BridgePhase::Burning, None, error),
            },
            BridgeState::AwaitingAttestation(receipt) => {
                match self.await_attestation(&receipt, cancel).await {
                    Ok(attestation) => BridgeState::Claiming {
                        receipt,
                        attestation,
                    },
                    Err(error) => fail(BridgePhase::AwaitingAttestation, Some(receipt), error),
                }
            }
            BridgeState::Claiming {
                receipt,
                attestation,
            } => match self.claim(receipt.clone(), attestation, request, cancel).await {
                Ok(done) => BridgeState::Done(done),
                Err(error) => fail(BridgePhase::Claiming, Some(receipt), error),
            },
            terminal => terminal,
        }
    }

    fn publish(&self, state: &BridgeState) {
        let phase = state.phase();
        debug!(%phase, "bridge transition");
        // No subscribers is fine
        let _ = self.phases.send(phase);
    }

    async fn burn(&self, request: &BurnRequest, cancel: &CancelToken) -> Result<BurnReceipt> {
        let receipt = tokio::select! {
            receipt = self.burner.burn(request) => receipt?,
            _ = cancel.cancelled() => {
                return Err(WraithError::Cancelled("bridge cancelled during burn".into()));
            }
        };
        info!(tx_hash = %receipt.tx_hash, "burn confirmed");
        Ok(receipt)
    }

    async fn await_attestation(&self, receipt: &BurnReceipt, cancel: &CancelToken) -> Result<Vec<u8>> {
        let source_domain = receipt.source_domain;
        let tx_hash = receipt.tx_hash.as_str();

        let polled = poll_until_ready(&self.policy, self.sleeper.as_ref(), cancel, move |attempt| async move {
            debug!(attempt, "fetching attestation");
            Ok(match self.attestations.fetch_attestation(source_domain, tx_hash).await? {
                AttestationStatus::Pending => Probe::Pending,
                AttestationStatus::Ready(bytes) => Probe::Ready(bytes),
            })
        })
        .await;

        match polled {
            Ok(attestation) => {
                info!(bytes = attestation.len(), "attestation received");
                Ok(attestation)
            }
            Err(PollError::Exhausted { attempts, last_error }) => {
                if let Some(e) = last_error {
                    debug!(error = %e, "last attestation attempt failed");
                }
                Err(WraithError::AttestationTimeout {
                    source_domain,
                    tx_hash: tx_hash.to_string(),
                    attempts,
                })
            }
            Err(PollError::Cancelled { attempts }) => Err(WraithError::Cancelled(format!(
                "attestation polling cancelled after {attempts} attempts"
            ))),
        }
    }

    async fn claim(
        &self,
        receipt: BurnReceipt,
        attestation: Vec<u8>,
        request: &BridgeRequest,
        cancel: &CancelToken,
    ) -> Result<BridgeCompletion> {
        let mut builder = StealthPaymentBuilder::new().recipient(request.recipient);
        if let Some(label) = &request.label {
            builder = builder.label(label.clone());
        }
        let payment = builder.build()?;

        let claim = ClaimRequest {
            receipt,
            attestation,
            payment,
        };
        let claim_tx = tokio::select! {
            tx = self.destination.claim(&claim) => tx?,
            _ = cancel.cancelled() => {
                return Err(WraithError::Cancelled("bridge cancelled during claim".into()));
            }
        };

        info!(chain = %self.destination.chain(), %claim_tx, "claim confirmed");
        Ok(BridgeCompletion {
            receipt: claim.receipt,
            claim_tx,
            payment: claim.payment,
        })
    }
}

fn fail(phase: BridgePhase, receipt: Option<BurnReceipt>, error: WraithError) -> BridgeState {
    BridgeState::Failed(BridgeFailure {
        phase,
        receipt,
        error,
    })
}

impl fmt::Debug for Bridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bridge")
            .field("destination", &self.destination.chain())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use parking_lot::Mutex;
    use wraith_crypto::MetaKeyPair;
    use wraith_stealth::recover_spend_key;

    const BURN_TX: &str = "0xburn";

    struct FixedBurner {
        calls: AtomicU32,
        fail: bool,
    }

    impl FixedBurner {
        fn ok() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicU32::new(0),
                fail: false,
            })
        }
    }

    #[async_trait]
    impl BurnSource for FixedBurner {
        async fn burn(&self, request: &BurnRequest) -> Result<BurnReceipt> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(WraithError::ChainSubmissionError("burn reverted".into()));
            }
            Ok(BurnReceipt {
                source_domain: request.source_domain,
                destination_domain: request.destination_domain,
                mint: request.mint.clone(),
                tx_hash: BURN_TX.into(),
                amount: request.amount,
                burned_at: Utc::now(),
            })
        }
    }

    /// Answers `pending` times with PENDING, then with the attestation.
    struct ScriptedAttestations {
        pending: u32,
        calls: AtomicU32,
    }

    impl ScriptedAttestations {
        fn new(pending: u32) -> Arc<Self> {
            Arc::new(Self {
                pending,
                calls: AtomicU32::new(0),
            })
        }
    }

    #[async_trait]
    impl AttestationSource for ScriptedAttestations {
        async fn fetch_attestation(
            &self,
            source_domain: u32,
            tx_hash: &str,
        ) -> Result<AttestationStatus> {
            assert_eq!(source_domain, 5);
            assert_eq!(tx_hash, BURN_TX);
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n <= self.pending {
                Ok(AttestationStatus::Pending)
            } else {
                Ok(AttestationStatus::Ready(vec![0xA7; 65]))
            }
        }
    }

    #[derive(Default)]
    struct RecordingClaimer {
        claims: Mutex<VecDeque<ClaimRequest>>,
        fail: bool,
    }

    #[async_trait]
    impl ClaimDestination for RecordingClaimer {
        fn chain(&self) -> Chain {
            Chain::Sui
        }

        async fn claim(&self, claim: &ClaimRequest) -> Result<TxRef> {
            if self.fail {
                return Err(WraithError::ChainSubmissionError("mint failed".into()));
            }
            self.claims.lock().push_back(claim.clone());
            Ok(TxRef::from("claim-digest"))
        }
    }

    /// Sleeper that never waits.
    struct NoSleep;

    #[async_trait]
    impl Sleeper for NoSleep {
        async fn sleep(&self, _duration: Duration) {}
    }

    fn recipient() -> MetaKeyPair {
        MetaKeyPair::derive(&[0x5A; 64], "2468").unwrap()
    }

    fn request(keys: &MetaKeyPair) -> BridgeRequest {
        BridgeRequest {
            burn: BurnRequest {
                source_domain: 5,
                destination_domain: 8,
                mint: "USDC".into(),
                amount: 1_000_000,
            },
            recipient: keys.meta_address(),
            label: Some("invoice-7".into()),
        }
    }

    fn bridge(
        burner: Arc<FixedBurner>,
        attestations: Arc<ScriptedAttestations>,
        claimer: Arc<RecordingClaimer>,
    ) -> Bridge {
        Bridge::new(burner, attestations, claimer).with_sleeper(Arc::new(NoSleep))
    }

    fn drain(rx: &mut broadcast::Receiver<BridgePhase>) -> Vec<BridgePhase> {
        let mut phases = Vec::new();
        while let Ok(phase) = rx.try_recv() {
            phases.push(phase);
        }
        phases
    }

    #[tokio::test]
    async fn test_eleven_pending_then_claims() {
        let keys = recipient();
        let attestations = ScriptedAttestations::new(11);
        let claimer = Arc::new(RecordingClaimer::default());
        let bridge = bridge(FixedBurner::ok(), attestations.clone(), claimer.clone());
        let mut phases = bridge.subscribe_phases();
        let mut refresh = bridge.notifier().subscribe();

        let done = bridge
            .run(&request(&keys), &CancelToken::new())
            .await
            .into_result()
            .unwrap();

        assert_eq!(attestations.calls.load(Ordering::SeqCst), 12);
        assert_eq!(
            drain(&mut phases),
            vec![
                BridgePhase::Burning,
                BridgePhase::AwaitingAttestation,
                BridgePhase::Claiming,
                BridgePhase::Done
            ]
        );
        refresh.recv().await.unwrap();

        let claim = claimer.claims.lock().pop_front().unwrap();
        assert_eq!(claim.attestation, vec![0xA7; 65]);
        assert_eq!(claim.receipt.tx_hash, BURN_TX);
        assert_eq!(claim.payment, done.payment);
        assert_eq!(done.payment.label.as_deref(), Some("invoice-7"));
        assert_eq!(done.claim_tx, TxRef::from("claim-digest"));

        // The minted funds are spendable by the recipient
        let balance = done.payment.into_balance("USDC", 1_000_000);
        let key = recover_spend_key(&keys, &balance).unwrap();
        assert_eq!(key.public_key(), balance.address);
    }

    #[tokio::test]
    async fn test_thirteen_pending_times_out() {
        let keys = recipient();
        let attestations = ScriptedAttestations::new(13);
        let claimer = Arc::new(RecordingClaimer::default());
        let bridge = bridge(FixedBurner::ok(), attestations.clone(), claimer.clone());

        let state = bridge.run(&request(&keys), &CancelToken::new()).await;

        let BridgeState::Failed(failure) = state else {
            panic!("expected failure");
        };
        assert_eq!(failure.phase, BridgePhase::AwaitingAttestation);
        assert_eq!(failure.receipt.as_ref().unwrap().tx_hash, BURN_TX);
        match failure.error {
            WraithError::AttestationTimeout {
                source_domain,
                tx_hash,
                attempts,
            } => {
                assert_eq!(source_domain, 5);
                assert_eq!(tx_hash, BURN_TX);
                assert_eq!(attempts, 12);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(attestations.calls.load(Ordering::SeqCst), 12);
        assert!(claimer.claims.lock().is_empty());
    }

    #[tokio::test]
    async fn test_resume_after_timeout() {
        let keys = recipient();
        let burner = FixedBurner::ok();
        let claimer = Arc::new(RecordingClaimer::default());

        let first = bridge(burner.clone(), ScriptedAttestations::new(20), claimer.clone())
            .run(&request(&keys), &CancelToken::new())
            .await;
        let receipt = first.receipt().cloned().unwrap();
        assert_eq!(receipt.request(), request(&keys).burn);

        let resumed = bridge(burner.clone(), ScriptedAttestations::new(0), claimer.clone())
            .resume(receipt, keys.meta_address(), None, &CancelToken::new())
            .await;

        assert_eq!(resumed.phase(), BridgePhase::Done);
        let claim = claimer.claims.lock().pop_back().unwrap();
        assert_eq!(claim.receipt.mint, "USDC");
        // Burned exactly once across both runs
        assert_eq!(burner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_burn_failure_has_no_receipt() {
        let keys = recipient();
        let burner = Arc::new(FixedBurner {
            calls: AtomicU32::new(0),
            fail: true,
        });
        let attestations = ScriptedAttestations::new(0);
        let state = bridge(burner, attestations.clone(), Arc::default())
            .run(&request(&keys), &CancelToken::new())
            .await;

        assert_eq!(state.phase(), BridgePhase::Failed);
        assert!(state.receipt().is_none());
        assert_eq!(attestations.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_claim_failure_keeps_receipt() {
        let keys = recipient();
        let claimer = Arc::new(RecordingClaimer {
            fail: true,
            ..Default::default()
        });
        let state = bridge(FixedBurner::ok(), ScriptedAttestations::new(0), claimer)
            .run(&request(&keys), &CancelToken::new())
            .await;

        let BridgeState::Failed(failure) = state else {
            panic!("expected failure");
        };
        assert_eq!(failure.phase, BridgePhase::Claiming);
        assert!(failure.receipt.is_some());
        assert!(matches!(failure.error, WraithError::ChainSubmissionError(_)));
    }

    #[tokio::test]
    async fn test_invalid_recipient_never_burns() {
        let keys = recipient();
        let burner = FixedBurner::ok();
        let mut req = request(&keys);
        req.recipient.view_pub = req.recipient.spend_pub;

        let state = bridge(burner.clone(), ScriptedAttestations::new(0), Arc::default())
            .run(&req, &CancelToken::new())
            .await;

        assert!(matches!(
            state,
            BridgeState::Failed(BridgeFailure {
                phase: BridgePhase::Burning,
                error: WraithError::MalformedKey(_),
                ..
            })
        ));
        assert_eq!(burner.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_while_polling_keeps_receipt() {
        let keys = recipient();
        let attestations = ScriptedAttestations::new(100);
        let bridge = Arc::new(Bridge::new(
            FixedBurner::ok(),
            attestations.clone(),
            Arc::new(RecordingClaimer::default()),
        ));
        let cancel = CancelToken::new();

        let handle = {
            let bridge = bridge.clone();
            let cancel = cancel.clone();
            let req = request(&keys);
            tokio::spawn(async move { bridge.run(&req, &cancel).await })
        };

        // Three polls happen at t = 0, 15, 30
        tokio::time::sleep(Duration::from_secs(40)).await;
        cancel.cancel();
        let state = handle.await.unwrap();

        let BridgeState::Failed(failure) = state else {
            panic!("expected failure");
        };
        assert!(matches!(failure.error, WraithError::Cancelled(_)));
        assert_eq!(failure.receipt.unwrap().tx_hash, BURN_TX);
        assert_eq!(attestations.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_step_leaves_terminal_states() {
        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let keys = recipient();
        let bridge = bridge(
            FixedBurner::ok(),
            ScriptedAttestations::new(0),
            Arc::default(),
        );
        let failed = fail(BridgePhase::Claiming, None, WraithError::Cancelled("x".into()));

        let next = rt.block_on(bridge.step(failed, &request(&keys), &CancelToken::new()));
        assert_eq!(next.phase(), BridgePhase::Failed);
    }
}
