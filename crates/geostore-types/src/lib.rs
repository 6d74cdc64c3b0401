//! Foundation types for geostore.
//!
//! This crate provides the value types shared by every geostore layer: the
//! addressing model used to locate data inside a stored feature, the
//! attribute value variant, and the coordinate precision/reference tags a
//! geometry proxy carries. Every other geostore crate depends on
//! `geostore-types`.
//!
//! # Key Types
//!
//! - [`Identifier`]: Opaque, store-unique name of one feature
//! - [`IndexPath`]: Position inside a feature's nested geometry
//! - [`AttributeValue`]: Closed variant for dynamically typed attributes
//! - [`PrecisionModel`]: Coordinate rounding rule
//! - [`ReferenceSystem`]: Coordinate reference system tag

pub mod attribute;
pub mod error;
pub mod identifier;
pub mod path;
pub mod precision;

pub use attribute::{AttributeValue, Attributes};
pub use error::TypeError;
pub use identifier::Identifier;
pub use path::IndexPath;
pub use precision::{PrecisionModel, ReferenceSystem};

// Coordinate and envelope types come from the in-memory geometry model.
pub use geo::{Coord, Rect};
