//! Foundation types for Lotline.
//!
//! This crate provides the small identity and temporal types shared by every
//! other Lotline crate.
//!
//! # Key Types
//!
//! - [`EntityKind`] -- Document discriminator (`product` | `order`)
//! - [`TxId`] -- Ledger transaction identifier
//! - [`LedgerTimestamp`] -- Commit timestamp as reported by the ledger

pub mod error;
pub mod kind;
pub mod temporal;
pub mod txid;

pub use error::TypeError;
pub use kind::EntityKind;
pub use temporal::LedgerTimestamp;
pub use txid::TxId;
