use std::collections::BTreeMap;
use std::fmt;

use lot_model::{Field, Schema};
use lot_types::EntityKind;
use serde::{Deserialize, Serialize};

use crate::error::{DispatchError, DispatchResult};

// ---------------------------------------------------------------------------
// Route
// ---------------------------------------------------------------------------

/// What an operation name resolves to, with everything fixed by the table
/// rather than by the caller's arguments.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "route", rename_all = "snake_case")]
pub enum Route {
    /// Create a `kind` document from its full positional argument list.
    Create { kind: EntityKind },
    /// Return the stored `kind` document. Args: `id`.
    Read { kind: EntityKind },
    /// Overwrite one field. Args: `id value`.
    Patch { kind: EntityKind, field: Field },
    /// Equality search on a fixed attribute. Args: `value`.
    Search { kind: EntityKind, attribute: String },
    /// Equality search on any attribute. Args: `kind attribute value`.
    Query,
    /// Audit trail of a key. Args: `id`.
    History,
    /// Return the stored document of any kind. Args: `kind id`.
    ReadAny,
}

impl Route {
    /// Exact number of positional arguments the route accepts.
    pub fn arity(&self) -> usize {
        match self {
            Self::Create { kind } => Schema::for_kind(*kind).arity(),
            Self::Read { .. } | Self::Search { .. } | Self::History => 1,
            Self::Patch { .. } | Self::ReadAny => 2,
            Self::Query => 3,
        }
    }

    /// Space-separated argument names.
    pub fn usage(&self) -> String {
        match self {
            Self::Create { kind } => Schema::for_kind(*kind).usage(),
            Self::Read { kind } => kind.id_field().to_string(),
            Self::Patch { kind, field } => format!("{} {field}", kind.id_field()),
            Self::Search { attribute, .. } => attribute.clone(),
            Self::Query => "kind attribute value".into(),
            Self::History => "key".into(),
            Self::ReadAny => "kind key".into(),
        }
    }

    /// Whether a successful invocation writes to the ledger.
    pub fn is_write(&self) -> bool {
        matches!(self, Self::Create { .. } | Self::Patch { .. })
    }

    fn validate(&self) -> Result<(), String> {
        match self {
            Self::Patch { kind, field } if field.kind() != *kind => Err(format!(
                "field {field} does not belong to {kind} documents"
            )),
            Self::Search { attribute, .. } if attribute.is_empty() || attribute == "docType" => {
                Err(format!("cannot search on attribute {attribute:?}"))
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create { kind } => write!(f, "create {kind}"),
            Self::Read { kind } => write!(f, "read {kind}"),
            Self::Patch { kind, field } => write!(f, "patch {kind}.{field}"),
            Self::Search { kind, attribute } => write!(f, "search {kind}.{attribute}"),
            Self::Query => f.write_str("query"),
            Self::History => f.write_str("history"),
            Self::ReadAny => f.write_str("read any"),
        }
    }
}

// ---------------------------------------------------------------------------
// OperationTable
// ---------------------------------------------------------------------------

/// Maps operation names to routes.
///
/// Built once at startup and shared by reference with every
/// [`Dispatcher`](crate::Dispatcher). Names are case-sensitive.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationTable {
    routes: BTreeMap<String, Route>,
}

impl OperationTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The stock table: every historical operation name plus the generic forms.
    pub fn standard() -> Self {
        use EntityKind::{Order, Product};

        let mut table = Self::new();
        let patch = |kind, field| Route::Patch { kind, field };

        table.insert("createProduct", Route::Create { kind: Product });
        table.insert("searchProduct", Route::Read { kind: Product });
        table.insert(
            "searchPro",
            Route::Search {
                kind: Product,
                attribute: "owner".into(),
            },
        );
        table.insert("updateShipmentStatus", patch(Product, Field::ShipmentStatus));
        table.insert("updateproductStatus", patch(Product, Field::ProductStatus));

        table.insert("registerOrder", Route::Create { kind: Order });
        table.insert("getOrderDetails", Route::Read { kind: Order });
        table.insert("updateTemparature", patch(Order, Field::Temperature));
        table.insert("updateTemperature", patch(Order, Field::Temperature));
        table.insert("updateHumidity", patch(Order, Field::Humidity));
        table.insert("updateLuminosity", patch(Order, Field::Luminosity));
        table.insert("updateCurrentLocation", patch(Order, Field::CurrentLocation));
        table.insert("updateDestinationCity", patch(Order, Field::DestinationCity));
        table.insert("updateOriginCity", patch(Order, Field::OriginCity));
        table.insert("queryHistory", Route::History);

        table.insert("queryByAttribute", Route::Query);
        table.insert("getHistory", Route::History);
        table.insert("readEntity", Route::ReadAny);
        table
    }

    /// Parse a table from TOML, one `name = { route = ..., ... }` entry per line.
    pub fn from_toml_str(s: &str) -> DispatchResult<Self> {
        let table: Self = toml::from_str(s)?;
        table.validate()?;
        Ok(table)
    }

    /// Reject routes that could never succeed.
    pub fn validate(&self) -> DispatchResult<()> {
        for (name, route) in &self.routes {
            if name.is_empty() {
                return Err(DispatchError::Config("operation name must not be empty".into()));
            }
            route
                .validate()
                .map_err(|reason| DispatchError::Config(format!("operation {name}: {reason}")))?;
        }
        Ok(())
    }

    /// Register `name`, returning the route it replaced.
    pub fn insert(&mut self, name: impl Into<String>, route: Route) -> Option<Route> {
        self.routes.insert(name.into(), route)
    }

    /// Layer `overrides` on top of this table; entries in `overrides` win.
    pub fn merged(mut self, overrides: OperationTable) -> Self {
        self.routes.extend(overrides.routes);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Route> {
        self.routes.get(name)
    }

    /// Operation names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Route)> {
        self.routes.iter().map(|(name, route)| (name.as_str(), route))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
