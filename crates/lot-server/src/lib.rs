//! HTTP invocation host for Lotline.
//!
//! Exposes the operation dispatcher over a small REST surface. Each
//! `POST /v1/invoke` runs in its own ledger transaction.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use handler::InvokeRequest;
pub use router::AppState;
pub use server::LotServer;
