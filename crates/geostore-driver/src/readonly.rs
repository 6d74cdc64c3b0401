use std::sync::Arc;

use geo::{Coord, Rect};
use geostore_types::{AttributeValue, Attributes, Identifier, IndexPath};

use crate::error::{DriverError, DriverResult};
use crate::record::NodeKind;
use crate::traits::{AttributeDriver, FeatureDriver, GeometryDriver};

/// Read-only view over another driver.
///
/// Reads are forwarded unchanged, root and path forms alike. Every write
/// fails with `UnsupportedOperation`.
#[derive(Clone, Debug)]
pub struct ReadOnlyDriver<D> {
    inner: D,
}

impl<D> ReadOnlyDriver<D> {
    pub fn new(inner: D) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &D {
        &self.inner
    }

    pub fn into_inner(self) -> D {
        self.inner
    }
}

fn read_only(operation: &str) -> DriverError {
    DriverError::unsupported(format!("{operation} on a read-only driver"))
}

impl<D: GeometryDriver> GeometryDriver for ReadOnlyDriver<D> {
    fn read_envelope_at(&self, id: &Identifier, path: &IndexPath) -> DriverResult<Option<Rect<f64>>> {
        self.inner.read_envelope_at(id, path)
    }

    fn create_coordinate_at(&self, _id: &Identifier, _path: &IndexPath, _coord: Coord<f64>) -> DriverResult<()> {
        Err(read_only("create_coordinate"))
    }

    fn append_coordinate_at(&self, _id: &Identifier, _path: &IndexPath, _coord: Coord<f64>) -> DriverResult<()> {
        Err(read_only("create_coordinate"))
    }

    fn create_coordinates_at(&self, _id: &Identifier, _path: &IndexPath, _coords: &[Coord<f64>]) -> DriverResult<()> {
        Err(read_only("create_coordinates"))
    }

    fn read_collection_count_at(&self, id: &Identifier, path: &IndexPath) -> DriverResult<usize> {
        self.inner.read_collection_count_at(id, path)
    }

    fn read_coordinate_at(&self, id: &Identifier, path: &IndexPath) -> DriverResult<Coord<f64>> {
        self.inner.read_coordinate_at(id, path)
    }

    fn read_coordinate_count_at(&self, id: &Identifier, path: &IndexPath) -> DriverResult<usize> {
        self.inner.read_coordinate_count_at(id, path)
    }

    fn read_coordinates_at(&self, id: &Identifier, path: &IndexPath) -> DriverResult<Vec<Coord<f64>>> {
        self.inner.read_coordinates_at(id, path)
    }

    fn read_geometry_at(&self, id: &Identifier, path: &IndexPath) -> DriverResult<NodeKind> {
        self.inner.read_geometry_at(id, path)
    }

    fn update_coordinate_at(&self, _id: &Identifier, _path: &IndexPath, _coord: Coord<f64>) -> DriverResult<()> {
        Err(read_only("update_coordinate"))
    }

    fn update_coordinates_at(&self, _id: &Identifier, _path: &IndexPath, _coords: &[Coord<f64>]) -> DriverResult<()> {
        Err(read_only("update_coordinates"))
    }

    fn delete_coordinate_at(&self, _id: &Identifier, _path: &IndexPath) -> DriverResult<()> {
        Err(read_only("delete_coordinate"))
    }

    fn delete_coordinates_at(&self, _id: &Identifier, _path: &IndexPath) -> DriverResult<()> {
        Err(read_only("delete_coordinates"))
    }

    fn read_envelope(&self, id: &Identifier) -> DriverResult<Option<Rect<f64>>> {
        self.inner.read_envelope(id)
    }

    fn create_coordinate(&self, _id: &Identifier, _index: Option<usize>, _coord: Coord<f64>) -> DriverResult<()> {
        Err(read_only("create_coordinate"))
    }

    fn create_coordinates(&self, _id: &Identifier, _index: Option<usize>, _coords: &[Coord<f64>]) -> DriverResult<()> {
        Err(read_only("create_coordinates"))
    }

    fn read_collection_count(&self, id: &Identifier, index: Option<usize>) -> DriverResult<usize> {
        self.inner.read_collection_count(id, index)
    }

    fn read_coordinate(&self, id: &Identifier, index: usize) -> DriverResult<Coord<f64>> {
        self.inner.read_coordinate(id, index)
    }

    fn read_coordinate_count(&self, id: &Identifier, index: Option<usize>) -> DriverResult<usize> {
        self.inner.read_coordinate_count(id, index)
    }

    fn read_coordinates(&self, id: &Identifier, index: Option<usize>) -> DriverResult<Vec<Coord<f64>>> {
        self.inner.read_coordinates(id, index)
    }

    fn read_geometry(&self, id: &Identifier, index: usize) -> DriverResult<NodeKind> {
        self.inner.read_geometry(id, index)
    }

    fn update_coordinate(&self, _id: &Identifier, _index: usize, _coord: Coord<f64>) -> DriverResult<()> {
        Err(read_only("update_coordinate"))
    }

    fn update_coordinates(&self, _id: &Identifier, _index: Option<usize>, _coords: &[Coord<f64>]) -> DriverResult<()> {
        Err(read_only("update_coordinates"))
    }

    fn delete_coordinate(&self, _id: &Identifier, _index: usize) -> DriverResult<()> {
        Err(read_only("delete_coordinate"))
    }

    fn delete_coordinates(&self, _id: &Identifier, _index: Option<usize>) -> DriverResult<()> {
        Err(read_only("delete_coordinates"))
    }
}

impl<D: AttributeDriver> AttributeDriver for ReadOnlyDriver<D> {
    fn read_attributes(&self, id: &Identifier) -> DriverResult<Attributes> {
        self.inner.read_attributes(id)
    }

    fn create_identifier(&self) -> DriverResult<Identifier> {
        Err(read_only("create_identifier"))
    }

    fn write_attribute(&self, _id: &Identifier, _key: &str, _value: AttributeValue) -> DriverResult<()> {
        Err(read_only("write_attribute"))
    }

    fn write_attributes(&self, _id: &Identifier, _entries: &Attributes) -> DriverResult<()> {
        Err(read_only("write_attributes"))
    }

    fn remove_attribute(&self, _id: &Identifier, _key: &str) -> DriverResult<bool> {
        Err(read_only("remove_attribute"))
    }

    fn read_attribute(&self, id: &Identifier, key: &str) -> DriverResult<Option<AttributeValue>> {
        self.inner.read_attribute(id, key)
    }
}

impl<D> FeatureDriver for ReadOnlyDriver<D>
where
    D: GeometryDriver + AttributeDriver + Clone + 'static,
{
    fn geometry_driver(&self) -> Arc<dyn GeometryDriver> {
        Arc::new(self.clone())
    }

    fn attribute_driver(&self) -> Arc<dyn AttributeDriver> {
        Arc::new(self.clone())
    }

    fn delete_feature(&self, _id: &Identifier) -> DriverResult<bool> {
        Err(read_only("delete_feature"))
    }
}
