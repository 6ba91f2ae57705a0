use lot_store::{QueryRecord, QueryStore, ScopedCursor};
use lot_types::EntityKind;
use serde::Serialize;
use serde_json::value::RawValue;
use serde_json::Value;

use crate::error::{EngineError, EngineResult};

/// Attribute-equality predicate: documents of `kind` where `attribute == value`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selector {
    kind: EntityKind,
    attribute: String,
    value: String,
}

impl Selector {
    /// Build a selector. The attribute must be non-empty and must not be the
    /// `docType` discriminator itself.
    pub fn new(
        kind: EntityKind,
        attribute: impl Into<String>,
        value: impl Into<String>,
    ) -> EngineResult<Self> {
        let attribute = attribute.into();
        if attribute.is_empty() {
            return Err(EngineError::Validation("query attribute must not be empty".into()));
        }
        if attribute == "docType" {
            return Err(EngineError::Validation(
                "query attribute must not be docType".into(),
            ));
        }
        Ok(Self {
            kind,
            attribute,
            value: value.into(),
        })
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// The query string handed to the rich-query engine:
    /// `{"selector":{"docType":"<kind>","<attribute>":"<value>"}}`.
    pub fn to_query_string(&self) -> String {
        format!(
            r#"{{"selector":{{"docType":{},{}:{}}}}}"#,
            json_string(self.kind.as_str()),
            json_string(&self.attribute),
            json_string(&self.value),
        )
    }
}

fn json_string(s: &str) -> String {
    Value::from(s).to_string()
}

/// One search hit on the wire.
#[derive(Serialize)]
struct Hit<'a> {
    #[serde(rename = "Key")]
    key: &'a str,
    #[serde(rename = "Record")]
    record: &'a RawValue,
}

/// Translates attribute searches into selector queries.
///
/// Matching is entirely the query engine's job; results are returned in
/// cursor order without filtering or ranking.
pub struct QueryTranslator;

impl QueryTranslator {
    /// Issue `selector` and collect every match.
    pub fn run<Q: QueryStore + ?Sized>(
        store: &Q,
        selector: &Selector,
    ) -> EngineResult<Vec<QueryRecord>> {
        let query = selector.to_query_string();
        tracing::debug!(query = %query, "running selector query");

        let mut cursor = ScopedCursor::new(store.query(&query)?);
        let mut records = Vec::new();
        for item in &mut cursor {
            records.push(item?);
        }
        cursor.close()?;

        tracing::debug!(matches = records.len(), "selector query finished");
        Ok(records)
    }

    /// Encode hits as `[{"Key":"<key>","Record":<document>}, ...]`.
    ///
    /// Documents are embedded verbatim; a stored value that is not JSON is a
    /// serialization error.
    pub fn encode(records: &[QueryRecord]) -> EngineResult<Vec<u8>> {
        let hits = records
            .iter()
            .map(|r| -> EngineResult<Hit<'_>> {
                let record = raw_json(&r.value).map_err(|e| {
                    EngineError::Serialization(format!("record {} is not valid JSON: {e}", r.key))
                })?;
                Ok(Hit {
                    key: &r.key,
                    record,
                })
            })
            .collect::<EngineResult<Vec<_>>>()?;
        serde_json::to_vec(&hits).map_err(|e| EngineError::Serialization(e.to_string()))
    }
}

/// Borrow stored bytes as an embeddable raw JSON value.
pub(crate) fn raw_json(bytes: &[u8]) -> serde_json::Result<&RawValue> {
    serde_json::from_slice(bytes)
}
