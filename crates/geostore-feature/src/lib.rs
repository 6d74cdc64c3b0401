//! Stored feature proxies for geostore.
//!
//! A stored feature is a geometry plus a bag of named attributes that never
//! materializes in memory. The types here are thin proxies: each holds a
//! driver handle and an address, and turns every property access into one
//! driver call.
//!
//! # Key Types
//!
//! - [`StoredFeatureFactory`]: binds a driver, issues and opens features
//! - [`StoredFeature`]: identifier plus factory; resolves geometry and
//!   attributes on every access
//! - [`StoredGeometry`]: `(driver, identifier, index path)` geometry proxy
//!   with a memoized envelope
//! - [`StoredAttributeCollection`] / [`StoredAttributeCollectionFactory`]:
//!   attribute proxies with explicit alias-versus-copy construction
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use geo::Coord;
//! use geostore_driver::InMemoryDriver;
//! use geostore_feature::StoredFeatureFactory;
//!
//! let factory = Arc::new(StoredFeatureFactory::new(Arc::new(InMemoryDriver::new())));
//! let feature = factory.create_feature()?;
//! feature.attributes().insert("name", "Elm Street")?;
//!
//! let geometry = feature.geometry();
//! geometry.create_coordinates(&[Coord { x: 0.0, y: 0.0 }, Coord { x: 3.0, y: 4.0 }], None)?;
//! let envelope = geometry.envelope()?;
//! assert_eq!(envelope.map(|e| e.max()), Some(Coord { x: 3.0, y: 4.0 }));
//! # Ok::<(), geostore_driver::DriverError>(())
//! ```

pub mod attributes;
pub mod feature;
pub mod geometry;

pub use attributes::{AttributeCollection, StoredAttributeCollection, StoredAttributeCollectionFactory};
pub use feature::{StoredFeature, StoredFeatureFactory};
pub use geometry::StoredGeometry;

pub use geostore_driver::{DriverError, DriverResult, NodeKind};
