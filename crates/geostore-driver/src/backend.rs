//! The [`RecordStore`] backend seam.
//!
//! A backend that can keep one [`FeatureRecord`] per identifier only has to
//! implement [`RecordStore`]; the geometry and attribute contracts are
//! derived from it here, so every record-backed driver shares the same
//! addressing semantics.

use std::sync::Arc;

use geo::{Coord, Rect};
use geostore_types::{AttributeValue, Attributes, Identifier, IndexPath};

use crate::error::DriverResult;
use crate::record::{FeatureRecord, NodeKind};
use crate::traits::{AttributeDriver, FeatureDriver, GeometryDriver};

/// Storage of whole feature records keyed by identifier.
///
/// Implementations must be thread-safe. `modify_record` must be
/// all-or-nothing from the caller's point of view: if the closure fails, the
/// stored record is left as it was.
pub trait RecordStore: Send + Sync {
    /// Register an empty record under a fresh identifier.
    fn create_record(&self) -> DriverResult<Identifier>;

    /// Run `f` against the record stored under `id`.
    ///
    /// Fails with `NotFound` if nothing is stored under `id`.
    fn read_record<R>(
        &self,
        id: &Identifier,
        f: impl FnOnce(&FeatureRecord) -> DriverResult<R>,
    ) -> DriverResult<R>;

    /// Run `f` against the record stored under `id` and persist the result.
    ///
    /// A missing record is created empty first (lazy binding).
    fn modify_record<R>(
        &self,
        id: &Identifier,
        f: impl FnOnce(&mut FeatureRecord) -> DriverResult<R>,
    ) -> DriverResult<R>;

    /// Remove the record under `id`. Returns `true` if it existed.
    fn remove_record(&self, id: &Identifier) -> DriverResult<bool>;
}

impl<S: RecordStore> GeometryDriver for S {
    fn read_envelope_at(&self, id: &Identifier, path: &IndexPath) -> DriverResult<Option<Rect<f64>>> {
        self.read_record(id, |r| Ok(r.geometry.node(path.as_slice())?.envelope()))
    }

    fn create_coordinate_at(&self, id: &Identifier, path: &IndexPath, coord: Coord<f64>) -> DriverResult<()> {
        self.modify_record(id, |r| r.geometry.insert_coordinate(path.as_slice(), coord))
    }

    fn append_coordinate_at(&self, id: &Identifier, path: &IndexPath, coord: Coord<f64>) -> DriverResult<()> {
        self.modify_record(id, |r| r.geometry.append_coordinates(path.as_slice(), &[coord]))
    }

    fn create_coordinates_at(&self, id: &Identifier, path: &IndexPath, coords: &[Coord<f64>]) -> DriverResult<()> {
        self.modify_record(id, |r| r.geometry.append_coordinates(path.as_slice(), coords))
    }

    fn read_collection_count_at(&self, id: &Identifier, path: &IndexPath) -> DriverResult<usize> {
        self.read_record(id, |r| Ok(r.geometry.node(path.as_slice())?.member_count()))
    }

    fn read_coordinate_at(&self, id: &Identifier, path: &IndexPath) -> DriverResult<Coord<f64>> {
        self.read_record(id, |r| r.geometry.coordinate(path.as_slice()))
    }

    fn read_coordinate_count_at(&self, id: &Identifier, path: &IndexPath) -> DriverResult<usize> {
        self.read_record(id, |r| Ok(r.geometry.node(path.as_slice())?.coordinate_count()))
    }

    fn read_coordinates_at(&self, id: &Identifier, path: &IndexPath) -> DriverResult<Vec<Coord<f64>>> {
        self.read_record(id, |r| Ok(r.geometry.node(path.as_slice())?.coordinates()))
    }

    fn read_geometry_at(&self, id: &Identifier, path: &IndexPath) -> DriverResult<NodeKind> {
        self.read_record(id, |r| Ok(r.geometry.node(path.as_slice())?.kind()))
    }

    fn update_coordinate_at(&self, id: &Identifier, path: &IndexPath, coord: Coord<f64>) -> DriverResult<()> {
        self.modify_record(id, |r| r.geometry.set_coordinate(path.as_slice(), coord))
    }

    fn update_coordinates_at(&self, id: &Identifier, path: &IndexPath, coords: &[Coord<f64>]) -> DriverResult<()> {
        self.modify_record(id, |r| r.geometry.replace_coordinates(path.as_slice(), coords))
    }

    fn delete_coordinate_at(&self, id: &Identifier, path: &IndexPath) -> DriverResult<()> {
        self.modify_record(id, |r| r.geometry.remove_coordinate(path.as_slice()))
    }

    fn delete_coordinates_at(&self, id: &Identifier, path: &IndexPath) -> DriverResult<()> {
        self.modify_record(id, |r| r.geometry.clear(path.as_slice()))
    }

    // Root forms address through stack slices instead of building a path.

    fn read_envelope(&self, id: &Identifier) -> DriverResult<Option<Rect<f64>>> {
        self.read_record(id, |r| Ok(r.geometry.envelope()))
    }

    fn create_coordinate(&self, id: &Identifier, index: Option<usize>, coord: Coord<f64>) -> DriverResult<()> {
        match index {
            Some(i) => self.modify_record(id, |r| r.geometry.insert_coordinate(&[i], coord)),
            None => self.modify_record(id, |r| r.geometry.append_coordinates(&[], &[coord])),
        }
    }

    fn create_coordinates(&self, id: &Identifier, index: Option<usize>, coords: &[Coord<f64>]) -> DriverResult<()> {
        self.modify_record(id, |r| r.geometry.append_coordinates(index.as_slice(), coords))
    }

    fn read_collection_count(&self, id: &Identifier, index: Option<usize>) -> DriverResult<usize> {
        self.read_record(id, |r| Ok(r.geometry.node(index.as_slice())?.member_count()))
    }

    fn read_coordinate(&self, id: &Identifier, index: usize) -> DriverResult<Coord<f64>> {
        self.read_record(id, |r| r.geometry.coordinate(&[index]))
    }

    fn read_coordinate_count(&self, id: &Identifier, index: Option<usize>) -> DriverResult<usize> {
        self.read_record(id, |r| Ok(r.geometry.node(index.as_slice())?.coordinate_count()))
    }

    fn read_coordinates(&self, id: &Identifier, index: Option<usize>) -> DriverResult<Vec<Coord<f64>>> {
        self.read_record(id, |r| Ok(r.geometry.node(index.as_slice())?.coordinates()))
    }

    fn read_geometry(&self, id: &Identifier, index: usize) -> DriverResult<NodeKind> {
        self.read_record(id, |r| Ok(r.geometry.node(&[index])?.kind()))
    }

    fn update_coordinate(&self, id: &Identifier, index: usize, coord: Coord<f64>) -> DriverResult<()> {
        self.modify_record(id, |r| r.geometry.set_coordinate(&[index], coord))
    }

    fn update_coordinates(&self, id: &Identifier, index: Option<usize>, coords: &[Coord<f64>]) -> DriverResult<()> {
        self.modify_record(id, |r| r.geometry.replace_coordinates(index.as_slice(), coords))
    }

    fn delete_coordinate(&self, id: &Identifier, index: usize) -> DriverResult<()> {
        self.modify_record(id, |r| r.geometry.remove_coordinate(&[index]))
    }

    fn delete_coordinates(&self, id: &Identifier, index: Option<usize>) -> DriverResult<()> {
        self.modify_record(id, |r| r.geometry.clear(index.as_slice()))
    }
}

impl<S: RecordStore> AttributeDriver for S {
    fn read_attributes(&self, id: &Identifier) -> DriverResult<Attributes> {
        self.read_record(id, |r| Ok(r.attributes.clone()))
    }

    fn create_identifier(&self) -> DriverResult<Identifier> {
        self.create_record()
    }

    fn write_attribute(&self, id: &Identifier, key: &str, value: AttributeValue) -> DriverResult<()> {
        self.modify_record(id, |r| {
            r.attributes.insert(key.to_string(), value);
            Ok(())
        })
    }

    fn write_attributes(&self, id: &Identifier, entries: &Attributes) -> DriverResult<()> {
        self.modify_record(id, |r| {
            r.attributes
                .extend(entries.iter().map(|(k, v)| (k.clone(), v.clone())));
            Ok(())
        })
    }

    fn remove_attribute(&self, id: &Identifier, key: &str) -> DriverResult<bool> {
        self.modify_record(id, |r| Ok(r.attributes.remove(key).is_some()))
    }

    fn read_attribute(&self, id: &Identifier, key: &str) -> DriverResult<Option<AttributeValue>> {
        self.read_record(id, |r| Ok(r.attributes.get(key).cloned()))
    }
}

impl<S: RecordStore + Clone + 'static> FeatureDriver for S {
    fn geometry_driver(&self) -> Arc<dyn GeometryDriver> {
        Arc::new(self.clone())
    }

    fn attribute_driver(&self) -> Arc<dyn AttributeDriver> {
        Arc::new(self.clone())
    }

    fn delete_feature(&self, id: &Identifier) -> DriverResult<bool> {
        self.remove_record(id)
    }
}
