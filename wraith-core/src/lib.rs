//! # WRAITH Core
//!
//! Core types, errors, and traits for the WRAITH stealth payment protocol.
//!
//! This crate provides the foundational building blocks used by all other WRAITH crates:
//!
//! - **Types**: Public keys, meta-addresses, envelopes, stealth balances, transactions
//! - **Errors**: One error taxonomy shared by every layer
//! - **Constants**: Wire sizes, domain separators, polling defaults
//! - **Traits**: Seams for the chain wallet, indexer, and sleep/clock abstractions
//! - **Signals**: Cancellation tokens and refresh notifications
//!
//! ## Example
//!
//! ```rust
//! use wraith_core::{MetaAddress, PublicKey};
//!
//! let meta = MetaAddress::new(PublicKey::from_array([1u8; 32]), PublicKey::from_array([2u8; 32]));
//! let json = serde_json::to_string(&meta).unwrap();
//! assert!(json.contains("spend_pub"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod cancel;
pub mod constants;
pub mod error;
pub mod notify;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use cancel::CancelToken;
pub use constants::*;
pub use error::{Result, WraithError};
pub use notify::RefreshNotifier;
pub use traits::*;
pub use types::*;
