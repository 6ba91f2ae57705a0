//! Operation dispatch for Lotline.
//!
//! An invocation is an operation name plus positional string arguments.
//! This crate resolves the name through an explicit [`OperationTable`],
//! runs the matching `lot-engine` handler, and answers with a
//! [`Response`]. [`Host`] wraps each invocation in its own ledger
//! transaction.

pub mod dispatcher;
pub mod error;
pub mod host;
pub mod response;
pub mod table;

// Re-export primary types at crate root for ergonomic imports.
pub use dispatcher::Dispatcher;
pub use error::{DispatchError, DispatchResult};
pub use host::Host;
pub use response::{Response, ERROR, OK};
pub use table::{OperationTable, Route};
