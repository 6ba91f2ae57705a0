use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use lot_dispatch::{Host, OperationTable};
use lot_store::InMemoryLedger;
use lot_types::EntityKind;
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Node identifier mixed into transaction ids.
    pub node_id: u16,
    /// Upper bound on positional arguments per invocation.
    pub max_args: usize,
    /// Upper bound on a request body.
    pub max_body_bytes: usize,
    /// Kind created by a non-empty init call.
    pub init_kind: EntityKind,
    /// Entries layered over the standard operation table.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operations: Option<OperationTable>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 7052)),
            node_id: 0,
            max_args: 32,
            max_body_bytes: 1024 * 1024,
            init_kind: EntityKind::Order,
            operations: None,
        }
    }
}

impl ServerConfig {
    pub fn from_toml_str(s: &str) -> ServerResult<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> ServerResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loading server config");
        Self::from_toml_str(&text)
    }

    /// The standard table with this config's overrides applied.
    pub fn operation_table(&self) -> ServerResult<OperationTable> {
        let table = match &self.operations {
            Some(overrides) => OperationTable::standard().merged(overrides.clone()),
            None => OperationTable::standard(),
        };
        table.validate()?;
        Ok(table)
    }

    /// A host over a fresh in-memory ledger.
    pub fn build_host(&self) -> ServerResult<Host> {
        let table = self.operation_table()?;
        if let Some((name, route)) = table.iter().find(|(_, r)| r.arity() > self.max_args) {
            return Err(ServerError::Config(format!(
                "max_args {} is below the {} arguments of {name}",
                self.max_args,
                route.arity()
            )));
        }
        Ok(Host::new(InMemoryLedger::new(self.node_id), Arc::new(table))
            .with_init_kind(self.init_kind))
    }

    fn validate(&self) -> ServerResult<()> {
        if self.max_args == 0 {
            return Err(ServerError::Config("max_args must be positive".into()));
        }
        if self.max_body_bytes == 0 {
            return Err(ServerError::Config("max_body_bytes must be positive".into()));
        }
        Ok(())
    }
}
