//! Domain types for WRAITH.
//!
//! - [`PublicKey`]: Compressed Edwards point
//! - [`MetaAddress`]: Published (spend, view) key pair of a recipient
//! - [`Envelope`]: Encrypted ephemeral key carried in the payment memo
//! - [`StealthBalance`]: One received payment sitting in a stealth account
//! - [`WithdrawalPick`]: A (balance, amount) unit chosen by the selector
//! - [`Chain`], [`Transaction`], [`TxRef`]: Chain-facing plumbing

mod balance;
mod chain;
mod envelope;
mod keys;

pub use balance::*;
pub use chain::*;
pub use envelope::*;
pub use keys::*;
