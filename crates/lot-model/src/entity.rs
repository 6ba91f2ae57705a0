use std::collections::BTreeMap;

use lot_types::EntityKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ModelError, ModelResult};
use crate::field::Field;
use crate::schema::Schema;

/// A physical product tracked through production and shipment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub uuid: String,
    pub material: String,
    pub make: String,
    pub material_location: String,
    pub shipment_status: String,
    pub product_status: String,
    /// Members outside the schema, kept verbatim across rewrites.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// A shipment order with its route and latest sensor readings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Order {
    pub order_id: String,
    pub buyer: String,
    pub seller: String,
    pub current_location: String,
    pub destination_city: String,
    pub origin_city: String,
    pub order_condition: String,
    pub temperature: String,
    pub humidity: String,
    pub luminosity: String,
    /// Members outside the schema, kept verbatim across rewrites.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// A stored document, one typed variant per [`EntityKind`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Entity {
    Product(Product),
    Order(Order),
}

/// Serialized shape: discriminator first, then the variant's members.
#[derive(Serialize)]
struct Tagged<'a, T> {
    #[serde(rename = "docType")]
    kind: EntityKind,
    #[serde(flatten)]
    body: &'a T,
}

impl Entity {
    /// Build a new entity from positional create arguments.
    ///
    /// The argument count must match the kind's [`Schema`] exactly and the
    /// record key must be non-empty.
    pub fn from_args(kind: EntityKind, args: &[String]) -> ModelResult<Self> {
        let schema = Schema::for_kind(kind);
        if args.len() != schema.arity() {
            return Err(ModelError::ArgumentCount {
                kind,
                expected: schema.arity(),
                actual: args.len(),
            });
        }
        if args[0].is_empty() {
            return Err(ModelError::InvalidArgument {
                name: schema.args[0],
                reason: "must not be empty".into(),
            });
        }

        let arg = |i: usize| args[i].clone();
        Ok(match kind {
            EntityKind::Product => Self::Product(Product {
                uuid: arg(0),
                material: arg(1),
                make: arg(2),
                material_location: arg(3),
                shipment_status: arg(4),
                product_status: arg(5),
                extra: BTreeMap::new(),
            }),
            EntityKind::Order => Self::Order(Order {
                order_id: arg(0),
                buyer: arg(1),
                seller: arg(2),
                current_location: arg(3),
                destination_city: arg(4),
                origin_city: arg(5),
                order_condition: arg(6),
                temperature: arg(7),
                humidity: arg(8),
                luminosity: arg(9),
                extra: BTreeMap::new(),
            }),
        })
    }

    /// Parse a stored document, choosing the variant from its `docType`.
    pub fn from_slice(bytes: &[u8]) -> ModelResult<Self> {
        let value: Value =
            serde_json::from_slice(bytes).map_err(|e| ModelError::Malformed(e.to_string()))?;
        let Value::Object(mut members) = value else {
            return Err(ModelError::Malformed("document is not a JSON object".into()));
        };

        let kind = match members.remove("docType") {
            Some(Value::String(s)) => s.parse::<EntityKind>()?,
            Some(_) => return Err(ModelError::Malformed("docType must be a string".into())),
            None => return Err(ModelError::MissingKind),
        };

        let body = Value::Object(members);
        let entity = match kind {
            EntityKind::Product => serde_json::from_value(body).map(Self::Product),
            EntityKind::Order => serde_json::from_value(body).map(Self::Order),
        };
        entity.map_err(|e| ModelError::Malformed(e.to_string()))
    }

    /// Parse a stored document that must be of the given kind.
    pub fn decode_as(kind: EntityKind, bytes: &[u8]) -> ModelResult<Self> {
        let entity = Self::from_slice(bytes)?;
        if entity.kind() != kind {
            return Err(ModelError::KindMismatch {
                expected: kind,
                actual: entity.kind(),
            });
        }
        Ok(entity)
    }

    /// Canonical JSON encoding.
    pub fn to_vec(&self) -> ModelResult<Vec<u8>> {
        let kind = self.kind();
        let encoded = match self {
            Self::Product(p) => serde_json::to_vec(&Tagged { kind, body: p }),
            Self::Order(o) => serde_json::to_vec(&Tagged { kind, body: o }),
        };
        encoded.map_err(|e| ModelError::Malformed(e.to_string()))
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Product(_) => EntityKind::Product,
            Self::Order(_) => EntityKind::Order,
        }
    }

    /// The record key.
    pub fn id(&self) -> &str {
        match self {
            Self::Product(p) => &p.uuid,
            Self::Order(o) => &o.order_id,
        }
    }

    /// Current value of `field`, or `None` if it belongs to the other kind.
    pub fn get(&self, field: Field) -> Option<&str> {
        match self {
            Self::Product(p) => product_slot(p, field).map(|s| &**s),
            Self::Order(o) => order_slot(o, field).map(|s| &**s),
        }
    }

    /// Overwrite exactly one attribute, leaving every other member untouched.
    pub fn set(&mut self, field: Field, value: impl Into<String>) -> ModelResult<()> {
        let kind = self.kind();
        let slot = match self {
            Self::Product(p) => product_slot_mut(p, field),
            Self::Order(o) => order_slot_mut(o, field),
        };
        match slot {
            Some(slot) => {
                *slot = value.into();
                Ok(())
            }
            None => Err(ModelError::FieldMismatch { field, kind }),
        }
    }
}

fn product_slot(p: &Product, field: Field) -> Option<&String> {
    Some(match field {
        Field::Material => &p.material,
        Field::Make => &p.make,
        Field::MaterialLocation => &p.material_location,
        Field::ShipmentStatus => &p.shipment_status,
        Field::ProductStatus => &p.product_status,
        _ => return None,
    })
}

fn product_slot_mut(p: &mut Product, field: Field) -> Option<&mut String> {
    Some(match field {
        Field::Material => &mut p.material,
        Field::Make => &mut p.make,
        Field::MaterialLocation => &mut p.material_location,
        Field::ShipmentStatus => &mut p.shipment_status,
        Field::ProductStatus => &mut p.product_status,
        _ => return None,
    })
}

fn order_slot(o: &Order, field: Field) -> Option<&String> {
    Some(match field {
        Field::Buyer => &o.buyer,
        Field::Seller => &o.seller,
        Field::CurrentLocation => &o.current_location,
        Field::DestinationCity => &o.destination_city,
        Field::OriginCity => &o.origin_city,
        Field::OrderCondition => &o.order_condition,
        Field::Temperature => &o.temperature,
        Field::Humidity => &o.humidity,
        Field::Luminosity => &o.luminosity,
        _ => return None,
    })
}

fn order_slot_mut(o: &mut Order, field: Field) -> Option<&mut String> {
    Some(match field {
        Field::Buyer => &mut o.buyer,
        Field::Seller => &mut o.seller,
        Field::CurrentLocation => &mut o.current_location,
        Field::DestinationCity => &mut o.destination_city,
        Field::OriginCity => &mut o.origin_city,
        Field::OrderCondition => &mut o.order_condition,
        Field::Temperature => &mut o.temperature,
        Field::Humidity => &mut o.humidity,
        Field::Luminosity => &mut o.luminosity,
        _ => return None,
    })
}
