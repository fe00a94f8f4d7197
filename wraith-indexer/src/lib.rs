//! # WRAITH Indexer
//!
//! Clients for the passive indexer/relay that stores recipient records and
//! observed stealth payments.
//!
//! ## Backends
//!
//! - **HTTP** (`HttpIndexer`): REST client for a deployed indexer
//! - **Memory** (`MemoryIndexer`): Thread-safe in-process store for tests and
//!   offline runs
//!
//! Both implement [`wraith_core::traits::Indexer`].

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod http;
pub mod memory;

pub use http::{HttpIndexer, IndexerConfig};
pub use memory::MemoryIndexer;
