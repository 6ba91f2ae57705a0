//! Ledger adapter for Lotline.
//!
//! This crate is the thin contract between Lotline and the external
//! transactional key-value ledger. Lotline never talks to the ledger except
//! through the traits defined here.
//!
//! # Interfaces
//!
//! - [`StateStore`] -- `get_state` / `put_state` by key
//! - [`QueryStore`] -- selector queries over current documents
//! - [`HistoryStore`] -- every modification ever committed under a key
//! - [`Ledger`] -- all three, implemented automatically
//!
//! Query and history results are returned as [`RecordCursor`]s, which hold an
//! external resource. Wrap them in a [`ScopedCursor`] so they are closed on
//! every exit path.
//!
//! # Storage Backends
//!
//! - [`InMemoryLedger`] -- `BTreeMap`-based ledger for tests, demos and embedding
//!
//! # Design Rules
//!
//! 1. One trait call is one external operation. No buffering, caching or
//!    retries happen at this layer.
//! 2. Failures are surfaced unchanged to the caller.
//! 3. Atomicity of a read-modify-write pair comes from the enclosing ledger
//!    transaction, never from local locking.

pub mod cursor;
pub mod error;
pub mod memory;
pub mod records;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use cursor::{BoxCursor, RecordCursor, ScopedCursor, VecCursor};
pub use error::{StoreError, StoreResult};
pub use memory::{InMemoryLedger, Transaction};
pub use records::{KeyModification, QueryRecord};
pub use traits::{HistoryStore, Ledger, QueryStore, StateStore};
