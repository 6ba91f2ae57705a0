use std::sync::Arc;

use lot_engine::EntityLifecycle;
use lot_store::{InMemoryLedger, Transaction};
use lot_types::EntityKind;

use crate::dispatcher::Dispatcher;
use crate::response::Response;
use crate::table::{OperationTable, Route};

/// Runs invocations against an in-memory ledger, one transaction each.
///
/// A transaction commits only when a writing invocation succeeds, so a
/// failure never leaves a write behind. A commit the ledger rejects turns the
/// invocation into a failure.
pub struct Host {
    ledger: InMemoryLedger,
    table: Arc<OperationTable>,
    init_kind: EntityKind,
}

impl Host {
    pub fn new(ledger: InMemoryLedger, table: Arc<OperationTable>) -> Self {
        Self {
            ledger,
            table,
            init_kind: EntityKind::Order,
        }
    }

    /// A host over an empty ledger with the standard operation table.
    pub fn standard() -> Self {
        Self::new(InMemoryLedger::default(), Arc::new(OperationTable::standard()))
    }

    /// Kind created by a non-empty [`init`](Self::init) call.
    pub fn with_init_kind(mut self, kind: EntityKind) -> Self {
        self.init_kind = kind;
        self
    }

    pub fn ledger(&self) -> &InMemoryLedger {
        &self.ledger
    }

    pub fn table(&self) -> &OperationTable {
        &self.table
    }

    /// Dispatch `op` inside a fresh transaction.
    pub fn invoke(&self, op: &str, args: &[String]) -> Response {
        let tx = self.ledger.begin();
        let tx_id = tx.tx_id().short_id().to_string();
        let response = Dispatcher::new(&self.table).dispatch(&tx, op, args);
        let writes = self.table.get(op).is_some_and(Route::is_write);
        self.finish(tx, &tx_id, op, writes, response)
    }

    /// Instantiate the application.
    ///
    /// With no arguments this is a no-op success. Otherwise the arguments
    /// create one document of the configured init kind.
    pub fn init(&self, args: &[String]) -> Response {
        if args.is_empty() {
            tracing::debug!("init without arguments");
            return Response::success(Vec::new());
        }
        let tx = self.ledger.begin();
        let tx_id = tx.tx_id().short_id().to_string();
        let response = match EntityLifecycle::create(&tx, self.init_kind, args) {
            Ok(_) => Response::success(Vec::new()),
            Err(e) => Response::failure(e.to_string()),
        };
        self.finish(tx, &tx_id, "init", true, response)
    }

    fn finish(
        &self,
        tx: Transaction<'_>,
        tx_id: &str,
        op: &str,
        writes: bool,
        response: Response,
    ) -> Response {
        if let Some(message) = response.message() {
            tx.rollback();
            tracing::warn!(op, tx = tx_id, %message, "transaction rolled back");
            return response;
        }
        if !writes {
            tx.rollback();
            tracing::debug!(op, tx = tx_id, "read-only invocation, nothing to commit");
            return response;
        }
        let pending = tx.pending_writes();
        match tx.commit() {
            Ok(_) => {
                tracing::info!(op, tx = tx_id, writes = pending, "transaction committed");
                response
            }
            Err(e) => {
                tracing::warn!(op, tx = tx_id, error = %e, "commit rejected");
                Response::failure(e.to_string())
            }
        }
    }
}

impl std::fmt::Debug for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Host")
            .field("ledger", &self.ledger)
            .field("operations", &self.table.len())
            .field("init_kind", &self.init_kind)
            .finish()
    }
}
