use lot_types::EntityKind;

/// Positional argument layout of a create request for one kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Schema {
    pub kind: EntityKind,
    /// Argument names in positional order; the first is always the record key.
    pub args: &'static [&'static str],
}

const PRODUCT: Schema = Schema {
    kind: EntityKind::Product,
    args: &[
        "uuid",
        "material",
        "make",
        "material_location",
        "shipment_status",
        "product_status",
    ],
};

const ORDER: Schema = Schema {
    kind: EntityKind::Order,
    args: &[
        "OrderId",
        "Buyer",
        "Seller",
        "CurrentLocation",
        "DestinationCity",
        "OriginCity",
        "OrderCondition",
        "Temperature",
        "Humidity",
        "Luminosity",
    ],
};

impl Schema {
    pub fn for_kind(kind: EntityKind) -> &'static Schema {
        match kind {
            EntityKind::Product => &PRODUCT,
            EntityKind::Order => &ORDER,
        }
    }

    /// Exact number of positional arguments a create request must carry.
    pub fn arity(&self) -> usize {
        self.args.len()
    }

    /// Usage string, e.g. `uuid material make ...`.
    pub fn usage(&self) -> String {
        self.args.join(" ")
    }
}
