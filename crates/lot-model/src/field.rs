use std::fmt;
use std::str::FromStr;

use lot_types::EntityKind;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// A mutable attribute of a [`Product`](crate::Product) or
/// [`Order`](crate::Order), named by its JSON member name.
///
/// Record keys (`uuid`, `OrderId`) and the `docType` discriminator are not
/// fields: they can never be patched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    #[serde(rename = "material")]
    Material,
    #[serde(rename = "make")]
    Make,
    #[serde(rename = "material_location")]
    MaterialLocation,
    #[serde(rename = "shipment_status")]
    ShipmentStatus,
    #[serde(rename = "product_status")]
    ProductStatus,
    #[serde(rename = "Buyer")]
    Buyer,
    #[serde(rename = "Seller")]
    Seller,
    #[serde(rename = "CurrentLocation")]
    CurrentLocation,
    #[serde(rename = "DestinationCity")]
    DestinationCity,
    #[serde(rename = "OriginCity")]
    OriginCity,
    #[serde(rename = "OrderCondition")]
    OrderCondition,
    #[serde(rename = "Temperature")]
    Temperature,
    #[serde(rename = "Humidity")]
    Humidity,
    #[serde(rename = "Luminosity")]
    Luminosity,
}

impl Field {
    pub const ALL: [Field; 14] = [
        Field::Material,
        Field::Make,
        Field::MaterialLocation,
        Field::ShipmentStatus,
        Field::ProductStatus,
        Field::Buyer,
        Field::Seller,
        Field::CurrentLocation,
        Field::DestinationCity,
        Field::OriginCity,
        Field::OrderCondition,
        Field::Temperature,
        Field::Humidity,
        Field::Luminosity,
    ];

    /// The document kind this field belongs to.
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Material
            | Self::Make
            | Self::MaterialLocation
            | Self::ShipmentStatus
            | Self::ProductStatus => EntityKind::Product,
            _ => EntityKind::Order,
        }
    }

    /// JSON member name in stored documents.
    pub fn json_name(&self) -> &'static str {
        match self {
            Self::Material => "material",
            Self::Make => "make",
            Self::MaterialLocation => "material_location",
            Self::ShipmentStatus => "shipment_status",
            Self::ProductStatus => "product_status",
            Self::Buyer => "Buyer",
            Self::Seller => "Seller",
            Self::CurrentLocation => "CurrentLocation",
            Self::DestinationCity => "DestinationCity",
            Self::OriginCity => "OriginCity",
            Self::OrderCondition => "OrderCondition",
            Self::Temperature => "Temperature",
            Self::Humidity => "Humidity",
            Self::Luminosity => "Luminosity",
        }
    }

    /// Fields of one kind, in schema order.
    pub fn of_kind(kind: EntityKind) -> impl Iterator<Item = Field> {
        Self::ALL.into_iter().filter(move |f| f.kind() == kind)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.json_name())
    }
}

impl FromStr for Field {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.json_name() == s)
            .ok_or_else(|| ModelError::InvalidArgument {
                name: "field",
                reason: format!("unknown field {s}"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_roundtrips_json_name() {
        for field in Field::ALL {
            assert_eq!(field.json_name().parse::<Field>().unwrap(), field);
        }
    }

    #[test]
    fn unknown_field_is_rejected() {
        assert!(matches!(
            "uuid".parse::<Field>(),
            Err(ModelError::InvalidArgument { name: "field", .. })
        ));
    }

    #[test]
    fn fields_split_by_kind() {
        assert_eq!(Field::of_kind(EntityKind::Product).count(), 5);
        assert_eq!(Field::of_kind(EntityKind::Order).count(), 9);
        assert_eq!(Field::Temperature.kind(), EntityKind::Order);
        assert_eq!(Field::ShipmentStatus.kind(), EntityKind::Product);
    }

    #[test]
    fn serde_uses_json_name() {
        let json = serde_json::to_string(&Field::MaterialLocation).unwrap();
        assert_eq!(json, "\"material_location\"");
        let parsed: Field = serde_json::from_str("\"Humidity\"").unwrap();
        assert_eq!(parsed, Field::Humidity);
    }
}
