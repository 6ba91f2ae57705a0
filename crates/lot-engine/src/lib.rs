//! Entity lifecycle core for Lotline.
//!
//! This crate is the heart of Lotline. It provides:
//! - `EntityLifecycle`: create with uniqueness enforcement, raw read, and the
//!   single generic field patch
//! - `QueryTranslator`: attribute selectors for the ledger's rich-query engine
//! - `HistoryReconstructor`: ordered audit trails from key history
//!
//! Every operation works against the [`lot_store`] traits, so the same code
//! runs on the in-memory backend and on any external ledger adapter.

pub mod error;
pub mod history;
pub mod lifecycle;
pub mod query;

#[cfg(test)]
pub(crate) mod testkit;

pub use error::{EngineError, EngineResult};
pub use history::{HistoryEntry, HistoryReconstructor};
pub use lifecycle::EntityLifecycle;
pub use query::{QueryTranslator, Selector};
