//! # WRAITH Withdrawals
//!
//! Moving funds out of stealth accounts.
//!
//! - **Selector**: Greedy largest-first coin selection over observed balances
//! - **Book**: Tracks what has already left each stealth account
//! - **Orchestrator**: One transaction per pick, strictly sequential, with
//!   per-pick failure reporting
//!
//! ## Example
//!
//! ```rust,ignore
//! use wraith_withdraw::{BalanceBook, WithdrawalOrchestrator, WithdrawalRequest};
//!
//! let book = BalanceBook::new(indexer.balances(&owner).await?);
//! let orchestrator = WithdrawalOrchestrator::new(wallet, builder).with_indexer(indexer);
//! let outcome = orchestrator.withdraw(keys, &book, &request, &cancel).await?;
//! for failure in &outcome.failures {
//!     eprintln!("{}: {}", failure.pick.balance.address, failure.error);
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod book;
pub mod orchestrator;
pub mod selector;

pub use book::BalanceBook;
pub use orchestrator::{
    join_withdrawal_id, OrchestratorConfig, PickFailure, PickSuccess, WithdrawalOrchestrator,
    WithdrawalOutcome, WithdrawalRequest,
};
pub use selector::{select_balances, total_available};
