//! [`StoredGeometry`]: a geometry proxy backed by a driver.

use std::fmt;
use std::sync::{Arc, OnceLock};

use geo::{Coord, Rect};
use geostore_driver::{DriverResult, GeometryDriver, NodeKind};
use geostore_types::{Identifier, IndexPath, PrecisionModel, ReferenceSystem};

/// A geometry that lives in a backing store.
///
/// The proxy holds `(driver, identifier, index_path)` and nothing else of the
/// geometry: every read and write is translated into one driver call. A
/// proxy with an empty path uses the driver's root forms with the bare local
/// index; a nested proxy uses the path forms with its path extended by the
/// local index. Both routes reach the same data.
///
/// The only local state is the bounding envelope, computed on first access
/// and kept for the life of the proxy. Writes through the proxy do not
/// invalidate it; call [`refresh_envelope`](Self::refresh_envelope) to drop
/// it explicitly.
#[derive(Clone)]
pub struct StoredGeometry {
    driver: Arc<dyn GeometryDriver>,
    identifier: Identifier,
    index_path: IndexPath,
    precision_model: PrecisionModel,
    reference_system: ReferenceSystem,
    envelope: OnceLock<Option<Rect<f64>>>,
}

impl StoredGeometry {
    /// Proxy for the root geometry of feature `identifier`.
    pub fn new(driver: Arc<dyn GeometryDriver>, identifier: Identifier) -> Self {
        Self::with_path(driver, identifier, IndexPath::root())
    }

    /// Proxy for the nested geometry at `index_path`.
    pub fn with_path(
        driver: Arc<dyn GeometryDriver>,
        identifier: Identifier,
        index_path: IndexPath,
    ) -> Self {
        Self {
            driver,
            identifier,
            index_path,
            precision_model: PrecisionModel::default(),
            reference_system: ReferenceSystem::default(),
            envelope: OnceLock::new(),
        }
    }

    pub fn with_precision_model(mut self, precision_model: PrecisionModel) -> Self {
        self.precision_model = precision_model;
        self
    }

    pub fn with_reference_system(mut self, reference_system: ReferenceSystem) -> Self {
        self.reference_system = reference_system;
        self
    }

    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    pub fn index_path(&self) -> &IndexPath {
        &self.index_path
    }

    pub fn precision_model(&self) -> PrecisionModel {
        self.precision_model
    }

    pub fn reference_system(&self) -> &ReferenceSystem {
        &self.reference_system
    }

    pub fn driver(&self) -> &Arc<dyn GeometryDriver> {
        &self.driver
    }

    /// Returns `true` for the feature's root geometry.
    pub fn is_root(&self) -> bool {
        self.index_path.is_root()
    }

    fn node_path(&self, index: Option<usize>) -> IndexPath {
        match index {
            Some(i) => self.index_path.child(i),
            None => self.index_path.clone(),
        }
    }

    fn precise(&self, coords: &[Coord<f64>]) -> Vec<Coord<f64>> {
        coords
            .iter()
            .map(|&c| self.precision_model.make_precise(c))
            .collect()
    }

    // -----------------------------------------------------------------------
    // Envelope
    // -----------------------------------------------------------------------

    /// Bounding box of this geometry, `None` when it holds no coordinates.
    ///
    /// Read from the driver once, then served from the cache. Concurrent
    /// first calls may each read; the first stored value wins.
    pub fn envelope(&self) -> DriverResult<Option<Rect<f64>>> {
        if let Some(cached) = self.envelope.get() {
            return Ok(*cached);
        }
        let envelope = if self.is_root() {
            self.driver.read_envelope(&self.identifier)?
        } else {
            self.driver.read_envelope_at(&self.identifier, &self.index_path)?
        };
        let _ = self.envelope.set(envelope);
        Ok(self.envelope.get().copied().unwrap_or(envelope))
    }

    /// Drop the cached envelope so the next [`envelope`](Self::envelope)
    /// call reads from the driver again.
    pub fn refresh_envelope(&mut self) {
        self.envelope.take();
    }

    // -----------------------------------------------------------------------
    // Create
    // -----------------------------------------------------------------------

    /// Write one coordinate: appended when `index` is `None`, otherwise
    /// inserted at `index`.
    pub fn create_coordinate(&self, coord: Coord<f64>, index: Option<usize>) -> DriverResult<()> {
        let coord = self.precision_model.make_precise(coord);
        if self.is_root() {
            return self.driver.create_coordinate(&self.identifier, index, coord);
        }
        match index {
            Some(i) => self
                .driver
                .create_coordinate_at(&self.identifier, &self.index_path.child(i), coord),
            None => self
                .driver
                .append_coordinate_at(&self.identifier, &self.index_path, coord),
        }
    }

    /// Append `coords` to this geometry's sequence, or to member `index`.
    ///
    /// Addressing the member one past the last creates it.
    pub fn create_coordinates(&self, coords: &[Coord<f64>], index: Option<usize>) -> DriverResult<()> {
        let coords = self.precise(coords);
        if self.is_root() {
            self.driver.create_coordinates(&self.identifier, index, &coords)
        } else {
            self.driver
                .create_coordinates_at(&self.identifier, &self.node_path(index), &coords)
        }
    }

    // -----------------------------------------------------------------------
    // Read
    // -----------------------------------------------------------------------

    /// Number of nested members (e.g. the ring count of a polygon).
    pub fn read_collection_count(&self, index: Option<usize>) -> DriverResult<usize> {
        if self.is_root() {
            self.driver.read_collection_count(&self.identifier, index)
        } else {
            self.driver
                .read_collection_count_at(&self.identifier, &self.node_path(index))
        }
    }

    pub fn read_coordinate(&self, index: usize) -> DriverResult<Coord<f64>> {
        if self.is_root() {
            self.driver.read_coordinate(&self.identifier, index)
        } else {
            self.driver
                .read_coordinate_at(&self.identifier, &self.index_path.child(index))
        }
    }

    pub fn read_coordinate_count(&self, index: Option<usize>) -> DriverResult<usize> {
        if self.is_root() {
            self.driver.read_coordinate_count(&self.identifier, index)
        } else {
            self.driver
                .read_coordinate_count_at(&self.identifier, &self.node_path(index))
        }
    }

    pub fn read_coordinates(&self, index: Option<usize>) -> DriverResult<Vec<Coord<f64>>> {
        if self.is_root() {
            self.driver.read_coordinates(&self.identifier, index)
        } else {
            self.driver
                .read_coordinates_at(&self.identifier, &self.node_path(index))
        }
    }

    /// Resolve member `index` and return a new proxy for it.
    ///
    /// The new proxy inherits the driver, precision model and reference
    /// system; its envelope cache starts empty.
    pub fn read_geometry(&self, index: usize) -> DriverResult<StoredGeometry> {
        let path = self.index_path.child(index);
        if self.is_root() {
            self.driver.read_geometry(&self.identifier, index)?;
        } else {
            self.driver.read_geometry_at(&self.identifier, &path)?;
        }
        Ok(Self {
            driver: Arc::clone(&self.driver),
            identifier: self.identifier.clone(),
            index_path: path,
            precision_model: self.precision_model,
            reference_system: self.reference_system.clone(),
            envelope: OnceLock::new(),
        })
    }

    /// Shape of this geometry's node.
    pub fn kind(&self) -> DriverResult<NodeKind> {
        // Root forms only address members, so the node itself goes by path.
        self.driver.read_geometry_at(&self.identifier, &self.index_path)
    }

    // -----------------------------------------------------------------------
    // Update / delete
    // -----------------------------------------------------------------------

    pub fn update_coordinate(&self, coord: Coord<f64>, index: usize) -> DriverResult<()> {
        let coord = self.precision_model.make_precise(coord);
        if self.is_root() {
            self.driver.update_coordinate(&self.identifier, index, coord)
        } else {
            self.driver
                .update_coordinate_at(&self.identifier, &self.index_path.child(index), coord)
        }
    }

    /// Replace the coordinate sequence of this geometry, or of member `index`.
    pub fn update_coordinates(&self, coords: &[Coord<f64>], index: Option<usize>) -> DriverResult<()> {
        let coords = self.precise(coords);
        if self.is_root() {
            self.driver.update_coordinates(&self.identifier, index, &coords)
        } else {
            self.driver
                .update_coordinates_at(&self.identifier, &self.node_path(index), &coords)
        }
    }

    pub fn delete_coordinate(&self, index: usize) -> DriverResult<()> {
        if self.is_root() {
            self.driver.delete_coordinate(&self.identifier, index)
        } else {
            self.driver
                .delete_coordinate_at(&self.identifier, &self.index_path.child(index))
        }
    }

    /// Clear this geometry, or member `index`.
    pub fn delete_coordinates(&self, index: Option<usize>) -> DriverResult<()> {
        if self.is_root() {
            self.driver.delete_coordinates(&self.identifier, index)
        } else {
            self.driver
                .delete_coordinates_at(&self.identifier, &self.node_path(index))
        }
    }
}

impl fmt::Debug for StoredGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredGeometry")
            .field("identifier", &self.identifier)
            .field("index_path", &self.index_path)
            .field("precision_model", &self.precision_model)
            .field("reference_system", &self.reference_system)
            .finish()
    }
}
