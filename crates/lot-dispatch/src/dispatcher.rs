use lot_engine::{
    EngineError, EngineResult, EntityLifecycle, HistoryReconstructor, QueryTranslator, Selector,
};
use lot_store::Ledger;
use lot_types::EntityKind;

use crate::response::Response;
use crate::table::{OperationTable, Route};

/// Resolves operation names through an [`OperationTable`] and runs the
/// matching engine handler against a ledger.
#[derive(Clone, Copy, Debug)]
pub struct Dispatcher<'t> {
    table: &'t OperationTable,
}

impl<'t> Dispatcher<'t> {
    pub fn new(table: &'t OperationTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &'t OperationTable {
        self.table
    }

    /// Run one invocation and format its outcome.
    ///
    /// Every error becomes a [`Response::Failure`] carrying the error's
    /// message; nothing is retried.
    pub fn dispatch<L: Ledger + ?Sized>(&self, ledger: &L, op: &str, args: &[String]) -> Response {
        match self.execute(ledger, op, args) {
            Ok(payload) => {
                tracing::debug!(op, bytes = payload.len(), "invocation succeeded");
                Response::success(payload)
            }
            Err(e) => {
                tracing::warn!(op, error = %e, "invocation failed");
                Response::failure(e.to_string())
            }
        }
    }

    /// Run one invocation, returning the raw payload.
    pub fn execute<L: Ledger + ?Sized>(
        &self,
        ledger: &L,
        op: &str,
        args: &[String],
    ) -> EngineResult<Vec<u8>> {
        let route = self
            .table
            .get(op)
            .ok_or_else(|| EngineError::UnknownOperation(op.to_string()))?;

        // Create defers to the model so the message names the expected layout.
        if !matches!(route, Route::Create { .. }) && args.len() != route.arity() {
            return Err(EngineError::Validation(format!(
                "incorrect number of arguments for {op}: expected {} ({}), got {}",
                route.arity(),
                route.usage(),
                args.len()
            )));
        }
        tracing::debug!(op, %route, "dispatching");

        match route {
            Route::Create { kind } => {
                EntityLifecycle::create(ledger, *kind, args)?;
                Ok(Vec::new())
            }
            Route::Read { kind } => EntityLifecycle::read(ledger, *kind, &args[0]),
            Route::Patch { kind, field } => {
                EntityLifecycle::patch(ledger, *kind, &args[0], *field, &args[1])?;
                Ok(Vec::new())
            }
            Route::Search { kind, attribute } => {
                let selector = Selector::new(*kind, attribute.as_str(), args[0].as_str())?;
                QueryTranslator::encode(&QueryTranslator::run(ledger, &selector)?)
            }
            Route::Query => {
                let kind = parse_kind(&args[0])?;
                let selector = Selector::new(kind, args[1].as_str(), args[2].as_str())?;
                QueryTranslator::encode(&QueryTranslator::run(ledger, &selector)?)
            }
            Route::History => {
                HistoryReconstructor::encode(&HistoryReconstructor::history_for(ledger, &args[0])?)
            }
            Route::ReadAny => {
                let kind = parse_kind(&args[0])?;
                EntityLifecycle::read(ledger, kind, &args[1])
            }
        }
    }
}

fn parse_kind(s: &str) -> EngineResult<EntityKind> {
    s.parse()
        .map_err(|e: lot_types::TypeError| EngineError::Validation(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lot_store::{
        BoxCursor, HistoryStore, InMemoryLedger, KeyModification, QueryRecord, QueryStore,
        StateStore, StoreResult,
    };
    use proptest::prelude::*;
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Delegates to a real ledger while recording writes and selectors.
    struct Recording<'a, L> {
        inner: &'a L,
        puts: AtomicUsize,
        selectors: Mutex<Vec<String>>,
    }

    impl<'a, L> Recording<'a, L> {
        fn new(inner: &'a L) -> Self {
            Self {
                inner,
                puts: AtomicUsize::new(0),
                selectors: Mutex::new(Vec::new()),
            }
        }

        fn puts(&self) -> usize {
            self.puts.load(Ordering::SeqCst)
        }
    }

    impl<L: StateStore> StateStore for Recording<'_, L> {
        fn get_state(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
            self.inner.get_state(key)
        }

        fn put_state(&self, key: &str, value: Vec<u8>) -> StoreResult<()> {
            self.puts.fetch_add(1, Ordering::SeqCst);
            self.inner.put_state(key, value)
        }
    }

    impl<L: QueryStore> QueryStore for Recording<'_, L> {
        fn query(&self, selector: &str) -> StoreResult<BoxCursor<QueryRecord>> {
            self.selectors.lock().unwrap().push(selector.to_string());
            self.inner.query(selector)
        }
    }

    impl<L: HistoryStore> HistoryStore for Recording<'_, L> {
        fn history_for(&self, key: &str) -> StoreResult<BoxCursor<KeyModification>> {
            self.inner.history_for(key)
        }
    }

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn p1() -> Vec<String> {
        args(&[
            "p1",
            "steel",
            "SiemensCo",
            "Pune",
            "in_good_condition",
            "in_production",
        ])
    }

    fn order(id: &str) -> Vec<String> {
        args(&[
            id, "abc", "xyz", "kochi", "Pune", "Kochi", "in_good_condition", "100", "25", "10",
        ])
    }

    /// Run `op` in its own committed transaction.
    fn invoke(ledger: &InMemoryLedger, op: &str, a: &[String]) -> Response {
        let table = OperationTable::standard();
        let tx = ledger.begin();
        let response = Dispatcher::new(&table).dispatch(&tx, op, a);
        if response.is_success() {
            tx.commit().unwrap();
        }
        response
    }

    fn read_json(ledger: &InMemoryLedger, op: &str, id: &str) -> Value {
        invoke(ledger, op, &args(&[id])).payload_json().unwrap()
    }

    // -----------------------------------------------------------------------
    // End-to-end scenarios
    // -----------------------------------------------------------------------

    #[test]
    fn create_then_read() {
        let ledger = InMemoryLedger::new(1);
        let created = invoke(&ledger, "createProduct", &p1());
        assert_eq!(created, Response::success(Vec::new()));

        let doc = read_json(&ledger, "searchProduct", "p1");
        assert_eq!(doc["docType"], "product");
        assert_eq!(doc["material"], "steel");
        assert_eq!(doc["make"], "SiemensCo");
        assert_eq!(doc["material_location"], "Pune");
        assert_eq!(doc["shipment_status"], "in_good_condition");
        assert_eq!(doc["product_status"], "in_production");
    }

    #[test]
    fn second_create_conflicts() {
        let ledger = InMemoryLedger::new(1);
        invoke(&ledger, "createProduct", &p1());
        let before = read_json(&ledger, "searchProduct", "p1");

        let mut other = p1();
        other[1] = "wood".into();
        let response = invoke(&ledger, "createProduct", &other);
        assert_eq!(response.status_code(), 500);
        assert!(response.message().unwrap().contains("already exists: p1"));
        assert_eq!(read_json(&ledger, "searchProduct", "p1"), before);
    }

    #[test]
    fn patch_then_history() {
        let ledger = InMemoryLedger::new(1);
        invoke(&ledger, "createProduct", &p1());
        let patched = invoke(&ledger, "updateShipmentStatus", &args(&["p1", "damaged"]));
        assert!(patched.is_success());

        let doc = read_json(&ledger, "searchProduct", "p1");
        assert_eq!(doc["shipment_status"], "damaged");
        assert_eq!(doc["product_status"], "in_production");

        let history = read_json(&ledger, "queryHistory", "p1");
        let records = history.as_array().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["Value"]["shipment_status"], "damaged");
        assert_eq!(records[1]["Value"]["shipment_status"], "in_good_condition");
        assert_eq!(records[0]["IsDelete"], "false");
        assert_eq!(ledger.open_cursors(), 0);
    }

    #[test]
    fn search_pro_issues_owner_selector() {
        let ledger = InMemoryLedger::new(1);
        let table = OperationTable::standard();
        let tx = ledger.begin();
        let recording = Recording::new(&tx);

        let response = Dispatcher::new(&table).dispatch(&recording, "searchPro", &args(&["acme"]));
        assert_eq!(response, Response::success(b"[]".to_vec()));
        assert_eq!(
            recording.selectors.lock().unwrap().as_slice(),
            [r#"{"selector":{"docType":"product","owner":"acme"}}"#]
        );
    }

    #[test]
    fn query_passes_matches_through() {
        let ledger = InMemoryLedger::new(1);
        invoke(&ledger, "registerOrder", &order("o1"));
        invoke(&ledger, "registerOrder", &order("o2"));
        invoke(&ledger, "createProduct", &p1());

        let response = invoke(
            &ledger,
            "queryByAttribute",
            &args(&["order", "Buyer", "abc"]),
        );
        let hits = response.payload_json().unwrap();
        let hits = hits.as_array().unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0]["Key"], "o1");
        assert_eq!(hits[0]["Record"]["OrderId"], "o1");
        assert_eq!(hits[1]["Key"], "o2");
    }

    #[test]
    fn patch_missing_id_writes_nothing() {
        let ledger = InMemoryLedger::new(1);
        let table = OperationTable::standard();
        let tx = ledger.begin();
        let recording = Recording::new(&tx);

        let response = Dispatcher::new(&table).dispatch(
            &recording,
            "updateTemparature",
            &args(&["missing-id", "100"]),
        );
        assert_eq!(response.status_code(), 500);
        assert!(response.message().unwrap().contains("does not exist: missing-id"));
        assert_eq!(recording.puts(), 0);
    }

    // -----------------------------------------------------------------------
    // Dispatch rules
    // -----------------------------------------------------------------------

    #[test]
    fn unknown_operation_names_itself() {
        let ledger = InMemoryLedger::new(1);
        let response = invoke(&ledger, "deleteEverything", &[]);
        assert_eq!(response.status_code(), 500);
        assert!(response.message().unwrap().contains("deleteEverything"));
    }

    #[test]
    fn patch_requires_exactly_two_args() {
        let ledger = InMemoryLedger::new(1);
        invoke(&ledger, "registerOrder", &order("o1"));
        for bad in [args(&["o1"]), args(&["o1", "1", "2"])] {
            let response = invoke(&ledger, "updateHumidity", &bad);
            assert!(response.message().unwrap().contains("incorrect number of arguments"));
        }
        assert_eq!(ledger.version_count("o1"), 1);
    }

    #[test]
    fn create_arity_error_names_the_kind() {
        let ledger = InMemoryLedger::new(1);
        let response = invoke(&ledger, "registerOrder", &args(&["o1", "abc"]));
        let message = response.message().unwrap();
        assert!(message.contains("expected 10"), "{message}");
        assert_eq!(ledger.live_key_count(), 0);
    }

    #[test]
    fn generic_read_and_history() {
        let ledger = InMemoryLedger::new(1);
        invoke(&ledger, "registerOrder", &order("o1"));
        invoke(&ledger, "updateCurrentLocation", &args(&["o1", "Mumbai"]));

        let doc = invoke(&ledger, "readEntity", &args(&["order", "o1"]))
            .payload_json()
            .unwrap();
        assert_eq!(doc["CurrentLocation"], "Mumbai");

        let history = read_json(&ledger, "getHistory", "o1");
        assert_eq!(history.as_array().unwrap().len(), 2);
    }

    #[test]
    fn unknown_kind_is_validation_failure() {
        let ledger = InMemoryLedger::new(1);
        let response = invoke(&ledger, "readEntity", &args(&["painting", "x"]));
        assert!(response.message().unwrap().starts_with("validation failed"));
    }

    #[test]
    fn history_of_unknown_key_is_empty() {
        let ledger = InMemoryLedger::new(1);
        assert_eq!(
            invoke(&ledger, "queryHistory", &args(&["nothing"])),
            Response::success(b"[]".to_vec())
        );
    }

    #[test]
    fn custom_table_routes_new_names() {
        let mut table = OperationTable::new();
        table.insert(
            "setCondition",
            Route::Patch {
                kind: EntityKind::Order,
                field: lot_model::Field::OrderCondition,
            },
        );
        table.insert("registerOrder", Route::Create { kind: EntityKind::Order });
        let ledger = InMemoryLedger::new(1);
        let dispatcher = Dispatcher::new(&table);

        let tx = ledger.begin();
        assert!(dispatcher.dispatch(&tx, "registerOrder", &order("o1")).is_success());
        tx.commit().unwrap();

        let tx = ledger.begin();
        assert!(dispatcher
            .dispatch(&tx, "setCondition", &args(&["o1", "damaged"]))
            .is_success());
        tx.commit().unwrap();

        let doc: Value = serde_json::from_slice(&ledger.current("o1").unwrap()).unwrap();
        assert_eq!(doc["OrderCondition"], "damaged");

        // The stock names are not implied.
        let tx = ledger.begin();
        assert!(!dispatcher.dispatch(&tx, "getOrderDetails", &args(&["o1"])).is_success());
    }

    proptest! {
        #[test]
        fn wrong_arg_count_fails_without_writing(
            index in 0usize..64,
            arg_count in 0usize..16,
        ) {
            let table = OperationTable::standard();
            let names: Vec<&str> = table.names().collect();
            let op = names[index % names.len()];
            let route = table.get(op).unwrap();
            prop_assume!(arg_count != route.arity());

            let ledger = InMemoryLedger::new(1);
            let tx = ledger.begin();
            let recording = Recording::new(&tx);
            let a: Vec<String> = (0..arg_count).map(|i| format!("a{i}")).collect();
            let response = Dispatcher::new(&table).dispatch(&recording, op, &a);
            prop_assert_eq!(response.status_code(), 500);
            prop_assert_eq!(recording.puts(), 0);
        }
    }
}
