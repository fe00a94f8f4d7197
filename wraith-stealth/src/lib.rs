//! # WRAITH Stealth Payments
//!
//! High-level API for creating and recovering Ed25519 stealth payments.
//!
//! This crate provides:
//!
//! - **Key Sessions**: Derive meta keys through the connected wallet and hold
//!   them until explicitly locked
//! - **Payments**: One-time address + envelope for a single transfer
//! - **Discovery**: Recognise our payments and recover their spending keys
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use wraith_stealth::{KeySession, create_stealth_payment, recover_spend_key};
//!
//! // Recipient: unlock with the wallet and PIN, publish the meta-address
//! let (session, _) = KeySession::unlock(&wallet, "1234", None).await?;
//! let meta = session.meta_address()?;
//!
//! // Payer: create a one-time address and send funds to it
//! let payment = create_stealth_payment(&meta)?;
//!
//! // Recipient: rebuild the one-time key for an observed balance
//! let key = recover_spend_key(session.keys()?, &balance)?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod discovery;
pub mod payment;
pub mod session;

pub use discovery::{recover_spend_key, scan_balance, scan_balances, ScanResult, ScanStats};
pub use payment::{
    create_stealth_payment, create_stealth_payment_with_rng, StealthPayment, StealthPaymentBuilder,
};
pub use session::KeySession;
