//! # WRAITH Bridge
//!
//! Cross-chain stealth payments: burn on the source chain, wait for the
//! attestation, claim into a fresh stealth address on the destination chain.
//!
//! - **Retry**: Bounded polling with injectable sleep and cancellation
//! - **Attestation**: HTTP client for the attestation service
//! - **Machine**: `Burning → AwaitingAttestation → Claiming → Done | Failed`
//!
//! ## Example
//!
//! ```rust,ignore
//! use wraith_bridge::{Bridge, BridgeRequest, AttestationClient, AttestationConfig};
//!
//! let attestations = AttestationClient::with_config(AttestationConfig::new(url))?;
//! let bridge = Bridge::new(burner, Arc::new(attestations), destination);
//! let completion = bridge.run(&request, &cancel).await.into_result()?;
//! println!("minted into {}", completion.payment.stealth_address);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod attestation;
pub mod machine;
pub mod retry;

pub use attestation::{AttestationClient, AttestationConfig};
pub use machine::{
    Bridge, BridgeCompletion, BridgeFailure, BridgePhase, BridgeRequest, BridgeState, BurnReceipt,
    BurnRequest, BurnSource, ClaimDestination, ClaimRequest,
};
pub use retry::{poll_until_ready, PollError, Probe, RetryPolicy};
