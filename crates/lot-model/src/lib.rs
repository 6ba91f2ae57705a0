//! Entity model for Lotline.
//!
//! Each document kind has exactly one canonical schema. Kind-specific shapes
//! are distinct typed variants of [`Entity`], selected by the `docType`
//! discriminator stored in every document.
//!
//! - [`Product`] -- a physical product (`docType = "product"`)
//! - [`Order`] -- a shipment order with sensor readings (`docType = "order"`)
//! - [`Field`] -- selector naming one mutable attribute of either kind
//! - [`Schema`] -- positional argument layout used at creation

pub mod entity;
pub mod error;
pub mod field;
pub mod schema;

pub use entity::{Entity, Order, Product};
pub use error::{ModelError, ModelResult};
pub use field::Field;
pub use schema::Schema;

pub use lot_types::EntityKind;
