//! Stored features and the factory that binds them to a driver.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use geostore_driver::{DriverResult, FeatureDriver};
use geostore_types::{Attributes, Identifier, PrecisionModel, ReferenceSystem};
use tracing::{debug, info};

use crate::attributes::StoredAttributeCollection;
use crate::geometry::StoredGeometry;

/// Binds a [`FeatureDriver`] to new or existing feature identifiers.
///
/// Features keep a handle to their factory, never to the driver itself, so
/// [`replace_driver`](Self::replace_driver) is seen by every feature built
/// from this factory on its next access.
pub struct StoredFeatureFactory {
    driver: RwLock<Arc<dyn FeatureDriver>>,
    precision_model: PrecisionModel,
    reference_system: ReferenceSystem,
}

impl StoredFeatureFactory {
    pub fn new(driver: Arc<dyn FeatureDriver>) -> Self {
        Self {
            driver: RwLock::new(driver),
            precision_model: PrecisionModel::default(),
            reference_system: ReferenceSystem::default(),
        }
    }

    /// Precision model handed to every geometry proxy this factory builds.
    pub fn with_precision_model(mut self, precision_model: PrecisionModel) -> Self {
        self.precision_model = precision_model;
        self
    }

    /// Reference system handed to every geometry proxy this factory builds.
    pub fn with_reference_system(mut self, reference_system: ReferenceSystem) -> Self {
        self.reference_system = reference_system;
        self
    }

    /// The currently bound driver.
    pub fn driver(&self) -> Arc<dyn FeatureDriver> {
        let driver = self.driver.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*driver)
    }

    /// Swap the backing driver for every feature of this factory.
    pub fn replace_driver(&self, driver: Arc<dyn FeatureDriver>) {
        *self.driver.write().unwrap_or_else(PoisonError::into_inner) = driver;
        info!("feature factory driver replaced");
    }

    pub fn precision_model(&self) -> PrecisionModel {
        self.precision_model
    }

    pub fn reference_system(&self) -> &ReferenceSystem {
        &self.reference_system
    }

    /// A new feature under a fresh identifier issued by the driver.
    pub fn create_feature(self: &Arc<Self>) -> DriverResult<StoredFeature> {
        let identifier = self.driver().attribute_driver().create_identifier()?;
        debug!(identifier = %identifier, "created feature");
        Ok(self.open_feature(identifier))
    }

    /// Wrap an existing identifier. Existence is not checked here; the
    /// first access through the feature fails if nothing is stored.
    pub fn open_feature(self: &Arc<Self>, identifier: Identifier) -> StoredFeature {
        StoredFeature {
            factory: Arc::clone(self),
            identifier,
        }
    }

    /// Remove a feature from the store. Returns `true` if it existed.
    pub fn delete_feature(&self, identifier: &Identifier) -> DriverResult<bool> {
        let removed = self.driver().delete_feature(identifier)?;
        debug!(identifier = %identifier, removed, "deleted feature");
        Ok(removed)
    }
}

impl fmt::Debug for StoredFeatureFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredFeatureFactory")
            .field("precision_model", &self.precision_model)
            .field("reference_system", &self.reference_system)
            .finish_non_exhaustive()
    }
}

/// A geometry plus a bag of named attributes, stored behind a driver.
///
/// Neither part is cached: [`geometry`](Self::geometry) and
/// [`attributes`](Self::attributes) resolve the factory's current driver and
/// build fresh proxies on every call.
#[derive(Clone)]
pub struct StoredFeature {
    factory: Arc<StoredFeatureFactory>,
    identifier: Identifier,
}

impl StoredFeature {
    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    pub fn factory(&self) -> &Arc<StoredFeatureFactory> {
        &self.factory
    }

    /// Proxy for the feature's root geometry.
    pub fn geometry(&self) -> StoredGeometry {
        StoredGeometry::new(
            self.factory.driver().geometry_driver(),
            self.identifier.clone(),
        )
        .with_precision_model(self.factory.precision_model())
        .with_reference_system(self.factory.reference_system().clone())
    }

    /// Proxy for the feature's attributes.
    pub fn attributes(&self) -> StoredAttributeCollection {
        StoredAttributeCollection::new(
            self.factory.driver().attribute_driver(),
            self.identifier.clone(),
        )
    }

    /// Read the whole attribute bag.
    pub fn read_attributes(&self) -> DriverResult<Attributes> {
        self.attributes().to_map()
    }

    /// Remove the feature from the store. Returns `true` if it existed.
    pub fn delete(self) -> DriverResult<bool> {
        self.factory.delete_feature(&self.identifier)
    }
}

impl PartialEq for StoredFeature {
    fn eq(&self, other: &Self) -> bool {
        self.identifier == other.identifier && Arc::ptr_eq(&self.factory, &other.factory)
    }
}

impl Eq for StoredFeature {}

impl fmt::Debug for StoredFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredFeature")
            .field("identifier", &self.identifier)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Coord;
    use geostore_driver::{AttributeDriver, DriverError, InMemoryDriver, ReadOnlyDriver};
    use geostore_types::AttributeValue;

    fn factory() -> (InMemoryDriver, Arc<StoredFeatureFactory>) {
        let driver = InMemoryDriver::new();
        let factory = Arc::new(StoredFeatureFactory::new(Arc::new(driver.clone())));
        (driver, factory)
    }

    #[test]
    fn create_feature_issues_fresh_identifiers() {
        let (driver, factory) = factory();
        let a = factory.create_feature().unwrap();
        let b = factory.create_feature().unwrap();
        assert_ne!(a.identifier(), b.identifier());
        assert!(driver.contains(a.identifier()).unwrap());
        assert_ne!(a, b);
    }

    #[test]
    fn open_feature_does_not_check_existence() {
        let (driver, factory) = factory();
        let id = Identifier::new("unseen").unwrap();
        let feature = factory.open_feature(id.clone());
        assert!(!driver.contains(&id).unwrap());
        assert!(matches!(feature.read_attributes(), Err(DriverError::NotFound(_))));
    }

    #[test]
    fn independent_proxies_see_each_others_writes() {
        let (_, factory) = factory();
        let writer = factory.create_feature().unwrap();
        let reader = factory.open_feature(writer.identifier().clone());
        assert_eq!(writer, reader);

        writer.attributes().insert("status", "open").unwrap();
        assert_eq!(
            reader.read_attributes().unwrap().get("status"),
            Some(&AttributeValue::Text("open".into()))
        );

        writer.geometry().create_coordinate(Coord { x: 4.0, y: 2.0 }, None).unwrap();
        assert_eq!(reader.geometry().read_coordinate(0).unwrap(), Coord { x: 4.0, y: 2.0 });
    }

    #[test]
    fn separate_factories_on_one_driver_share_state() {
        let driver = InMemoryDriver::new();
        let first = Arc::new(StoredFeatureFactory::new(Arc::new(driver.clone())));
        let second = Arc::new(StoredFeatureFactory::new(Arc::new(driver)));

        let writer = first.create_feature().unwrap();
        let reader = second.open_feature(writer.identifier().clone());
        assert_ne!(writer, reader);

        writer.attributes().insert("depth", 3.5).unwrap();
        assert_eq!(
            reader.attributes().get("depth").unwrap(),
            Some(AttributeValue::Float(3.5))
        );
    }

    #[test]
    fn proxies_are_not_cached() {
        let (_, factory) = factory();
        let feature = factory.create_feature().unwrap();
        let geometry = feature.geometry();
        geometry.create_coordinate(Coord { x: 1.0, y: 1.0 }, None).unwrap();
        assert!(geometry.envelope().unwrap().is_some());

        feature.geometry().create_coordinate(Coord { x: 5.0, y: 5.0 }, None).unwrap();
        let fresh = feature.geometry().envelope().unwrap().unwrap();
        assert_eq!(fresh.max(), Coord { x: 5.0, y: 5.0 });
    }

    #[test]
    fn factory_settings_reach_geometry() {
        let driver = InMemoryDriver::new();
        let factory = Arc::new(
            StoredFeatureFactory::new(Arc::new(driver))
                .with_precision_model(PrecisionModel::Fixed { scale: 1.0 })
                .with_reference_system(ReferenceSystem::epsg(3857)),
        );
        let feature = factory.create_feature().unwrap();
        let geometry = feature.geometry();
        assert_eq!(geometry.reference_system(), &ReferenceSystem::epsg(3857));
        geometry.create_coordinate(Coord { x: 1.4, y: 2.6 }, None).unwrap();
        assert_eq!(geometry.read_coordinate(0).unwrap(), Coord { x: 1.0, y: 3.0 });
    }

    #[test]
    fn replaced_driver_is_visible_to_existing_features() {
        let (first, factory) = factory();
        let feature = factory.create_feature().unwrap();
        feature.attributes().insert("v", 1).unwrap();

        let second = InMemoryDriver::new();
        second
            .write_attribute(feature.identifier(), "v", 2.into())
            .unwrap();
        factory.replace_driver(Arc::new(ReadOnlyDriver::new(second)));

        assert_eq!(
            feature.attributes().get("v").unwrap(),
            Some(AttributeValue::Integer(2))
        );
        assert!(matches!(
            feature.attributes().insert("v", 3),
            Err(DriverError::UnsupportedOperation { .. })
        ));
        assert_eq!(first.read_attribute(feature.identifier(), "v").unwrap(), Some(AttributeValue::Integer(1)));
    }

    #[test]
    fn delete_removes_feature() {
        let (driver, factory) = factory();
        let feature = factory.create_feature().unwrap();
        let id = feature.identifier().clone();
        assert!(feature.delete().unwrap());
        assert!(!driver.contains(&id).unwrap());
        assert!(!factory.delete_feature(&id).unwrap());
    }
}
