use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Discriminator distinguishing document schemas that share one keyspace.
///
/// Stored in every document as the `docType` member.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Product,
    Order,
}

impl EntityKind {
    pub const ALL: [EntityKind; 2] = [EntityKind::Product, EntityKind::Order];

    /// The wire form used as the `docType` value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Product => "product",
            Self::Order => "order",
        }
    }

    /// Name of the member holding the record key in documents of this kind.
    pub fn id_field(&self) -> &'static str {
        match self {
            Self::Product => "uuid",
            Self::Order => "OrderId",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "product" => Ok(Self::Product),
            "order" => Ok(Self::Order),
            other => Err(TypeError::UnknownKind(other.to_string())),
        }
    }
}
