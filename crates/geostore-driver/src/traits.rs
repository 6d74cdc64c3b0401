//! Driver capability contracts.
//!
//! Every geometry operation exists in two forms. The *root* form takes the
//! identifier plus an optional or required local index and addresses the
//! feature's root geometry; it lets callers in the unnested case skip
//! building a path. The *path* form (suffixed `_at`) takes a full
//! [`IndexPath`]. For any conformant driver both forms are observably
//! equivalent: `read_coordinates(id, Some(5))` and
//! `read_coordinates_at(id, &[5].into())` return the same value.
//!
//! Node operations take the path of a geometry node. Slot operations
//! (`create_coordinate_at`, `read_coordinate_at`, `update_coordinate_at`,
//! `delete_coordinate_at`) take the node path with the coordinate index
//! appended as its last entry.
//!
//! The root forms have default implementations that build a one-entry path
//! and delegate, so a backend only has to implement the path forms.

use std::sync::Arc;

use geo::{Coord, Rect};
use geostore_types::{AttributeValue, Attributes, Identifier, IndexPath};

use crate::error::DriverResult;
use crate::record::NodeKind;

fn local_path(index: Option<usize>) -> IndexPath {
    match index {
        Some(i) => IndexPath::from([i]),
        None => IndexPath::root(),
    }
}

/// Geometry access for stored features.
///
/// Implementations must be thread-safe (`Send + Sync`); the driver is the
/// only synchronization boundary between proxies sharing it.
pub trait GeometryDriver: Send + Sync {
    // ---- Path forms ----

    /// Bounding box of the node at `path`, `None` if it holds no coordinates.
    fn read_envelope_at(&self, id: &Identifier, path: &IndexPath) -> DriverResult<Option<Rect<f64>>>;

    /// Insert `coord` at the slot `path` (node path + coordinate index).
    fn create_coordinate_at(&self, id: &Identifier, path: &IndexPath, coord: Coord<f64>) -> DriverResult<()>;

    /// Append `coord` to the coordinate sequence at node `path`.
    fn append_coordinate_at(&self, id: &Identifier, path: &IndexPath, coord: Coord<f64>) -> DriverResult<()>;

    /// Append `coords` to the coordinate sequence at node `path`.
    ///
    /// A path whose last entry equals the parent's member count creates a
    /// new member.
    fn create_coordinates_at(&self, id: &Identifier, path: &IndexPath, coords: &[Coord<f64>]) -> DriverResult<()>;

    /// Number of members of the collection at node `path`.
    fn read_collection_count_at(&self, id: &Identifier, path: &IndexPath) -> DriverResult<usize>;

    fn read_coordinate_at(&self, id: &Identifier, path: &IndexPath) -> DriverResult<Coord<f64>>;

    /// Number of coordinates at or below node `path`.
    fn read_coordinate_count_at(&self, id: &Identifier, path: &IndexPath) -> DriverResult<usize>;

    /// All coordinates at or below node `path`, in storage order.
    fn read_coordinates_at(&self, id: &Identifier, path: &IndexPath) -> DriverResult<Vec<Coord<f64>>>;

    /// Resolve the node at `path`.
    fn read_geometry_at(&self, id: &Identifier, path: &IndexPath) -> DriverResult<NodeKind>;

    fn update_coordinate_at(&self, id: &Identifier, path: &IndexPath, coord: Coord<f64>) -> DriverResult<()>;

    /// Replace the coordinate sequence at node `path`.
    fn update_coordinates_at(&self, id: &Identifier, path: &IndexPath, coords: &[Coord<f64>]) -> DriverResult<()>;

    fn delete_coordinate_at(&self, id: &Identifier, path: &IndexPath) -> DriverResult<()>;

    /// Clear the contents of node `path`. The node itself stays in place.
    fn delete_coordinates_at(&self, id: &Identifier, path: &IndexPath) -> DriverResult<()>;

    // ---- Root forms ----

    fn read_envelope(&self, id: &Identifier) -> DriverResult<Option<Rect<f64>>> {
        self.read_envelope_at(id, &IndexPath::root())
    }

    /// Insert at `index` of the root sequence, or append when `index` is `None`.
    fn create_coordinate(&self, id: &Identifier, index: Option<usize>, coord: Coord<f64>) -> DriverResult<()> {
        match index {
            Some(i) => self.create_coordinate_at(id, &IndexPath::from([i]), coord),
            None => self.append_coordinate_at(id, &IndexPath::root(), coord),
        }
    }

    fn create_coordinates(&self, id: &Identifier, index: Option<usize>, coords: &[Coord<f64>]) -> DriverResult<()> {
        self.create_coordinates_at(id, &local_path(index), coords)
    }

    fn read_collection_count(&self, id: &Identifier, index: Option<usize>) -> DriverResult<usize> {
        self.read_collection_count_at(id, &local_path(index))
    }

    fn read_coordinate(&self, id: &Identifier, index: usize) -> DriverResult<Coord<f64>> {
        self.read_coordinate_at(id, &IndexPath::from([index]))
    }

    fn read_coordinate_count(&self, id: &Identifier, index: Option<usize>) -> DriverResult<usize> {
        self.read_coordinate_count_at(id, &local_path(index))
    }

    fn read_coordinates(&self, id: &Identifier, index: Option<usize>) -> DriverResult<Vec<Coord<f64>>> {
        self.read_coordinates_at(id, &local_path(index))
    }

    fn read_geometry(&self, id: &Identifier, index: usize) -> DriverResult<NodeKind> {
        self.read_geometry_at(id, &IndexPath::from([index]))
    }

    fn update_coordinate(&self, id: &Identifier, index: usize, coord: Coord<f64>) -> DriverResult<()> {
        self.update_coordinate_at(id, &IndexPath::from([index]), coord)
    }

    fn update_coordinates(&self, id: &Identifier, index: Option<usize>, coords: &[Coord<f64>]) -> DriverResult<()> {
        self.update_coordinates_at(id, &local_path(index), coords)
    }

    fn delete_coordinate(&self, id: &Identifier, index: usize) -> DriverResult<()> {
        self.delete_coordinate_at(id, &IndexPath::from([index]))
    }

    fn delete_coordinates(&self, id: &Identifier, index: Option<usize>) -> DriverResult<()> {
        self.delete_coordinates_at(id, &local_path(index))
    }
}

/// Attribute access and identifier issuance for stored features.
pub trait AttributeDriver: Send + Sync {
    /// All attributes of the feature.
    fn read_attributes(&self, id: &Identifier) -> DriverResult<Attributes>;

    /// Issue a fresh identifier and register an empty feature under it.
    fn create_identifier(&self) -> DriverResult<Identifier>;

    /// Insert or replace one attribute. Creates the feature on first write.
    fn write_attribute(&self, id: &Identifier, key: &str, value: AttributeValue) -> DriverResult<()>;

    /// Upsert every entry of `entries`; keys not mentioned are untouched.
    ///
    /// The default writes key by key. Backends that can apply the whole
    /// batch in one step should override it so the write is all-or-nothing.
    fn write_attributes(&self, id: &Identifier, entries: &Attributes) -> DriverResult<()> {
        for (key, value) in entries {
            self.write_attribute(id, key, value.clone())?;
        }
        Ok(())
    }

    /// Remove one attribute. Returns `true` if the key existed.
    fn remove_attribute(&self, id: &Identifier, key: &str) -> DriverResult<bool>;

    /// Read one attribute.
    ///
    /// Default implementation reads the whole bag. Backends may override
    /// for a narrower read.
    fn read_attribute(&self, id: &Identifier, key: &str) -> DriverResult<Option<AttributeValue>> {
        Ok(self.read_attributes(id)?.remove(key))
    }
}

/// The driver bound to a feature factory: hands out the geometry and
/// attribute capabilities of one backend.
pub trait FeatureDriver: Send + Sync {
    fn geometry_driver(&self) -> Arc<dyn GeometryDriver>;

    fn attribute_driver(&self) -> Arc<dyn AttributeDriver>;

    /// Remove a feature entirely. Returns `true` if it existed.
    fn delete_feature(&self, id: &Identifier) -> DriverResult<bool>;
}
