//! Store-backed attribute collections and their factory.
//!
//! The factory's aliasing rules are the contract callers depend on:
//!
//! | Call | Identifier | Data |
//! |---|---|---|
//! | `create_collection()` | fresh | empty |
//! | `create_collection_from_map(map)` | fresh | copy of `map` |
//! | `create_collection_from(stored)` | **same as `stored`** | shared |
//! | `create_collection_from(plain)` | fresh | copy of `plain` |
//! | `open_collection(id)` | `id` | whatever is stored (unchecked) |
//! | `create_collection_at(id, source)` | `id` | `source` upserted over existing keys |

use std::fmt;
use std::sync::Arc;

use geostore_driver::{AttributeDriver, DriverResult};
use geostore_types::{AttributeValue, Attributes, Identifier};
use tracing::debug;

/// Anything that can serve as the source of a new attribute collection.
pub trait AttributeCollection {
    /// Every key/value pair currently in the collection.
    fn entries(&self) -> DriverResult<Attributes>;

    /// The store-backed collection behind this source, if any.
    fn as_stored(&self) -> Option<&StoredAttributeCollection> {
        None
    }
}

impl AttributeCollection for Attributes {
    fn entries(&self) -> DriverResult<Attributes> {
        Ok(self.clone())
    }
}

/// An attribute bag that lives in a backing store.
///
/// Every method is a driver call; nothing is cached, so proxies sharing an
/// identifier always see each other's writes.
#[derive(Clone)]
pub struct StoredAttributeCollection {
    driver: Arc<dyn AttributeDriver>,
    identifier: Identifier,
}

impl StoredAttributeCollection {
    pub fn new(driver: Arc<dyn AttributeDriver>, identifier: Identifier) -> Self {
        Self { driver, identifier }
    }

    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    pub fn get(&self, key: &str) -> DriverResult<Option<AttributeValue>> {
        self.driver.read_attribute(&self.identifier, key)
    }

    /// Insert or replace one attribute.
    pub fn insert(&self, key: &str, value: impl Into<AttributeValue>) -> DriverResult<()> {
        self.driver.write_attribute(&self.identifier, key, value.into())
    }

    /// Upsert every entry of `entries` in one driver call. Keys not in
    /// `entries` are untouched.
    pub fn extend(&self, entries: &Attributes) -> DriverResult<()> {
        if entries.is_empty() {
            return Ok(());
        }
        self.driver.write_attributes(&self.identifier, entries)
    }

    /// Remove one attribute. Returns `true` if the key existed.
    pub fn remove(&self, key: &str) -> DriverResult<bool> {
        self.driver.remove_attribute(&self.identifier, key)
    }

    pub fn contains_key(&self, key: &str) -> DriverResult<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Sorted list of keys.
    pub fn keys(&self) -> DriverResult<Vec<String>> {
        Ok(self.to_map()?.into_keys().collect())
    }

    pub fn len(&self) -> DriverResult<usize> {
        Ok(self.to_map()?.len())
    }

    pub fn is_empty(&self) -> DriverResult<bool> {
        Ok(self.to_map()?.is_empty())
    }

    /// Read the whole bag.
    pub fn to_map(&self) -> DriverResult<Attributes> {
        self.driver.read_attributes(&self.identifier)
    }
}

impl AttributeCollection for StoredAttributeCollection {
    fn entries(&self) -> DriverResult<Attributes> {
        self.to_map()
    }

    fn as_stored(&self) -> Option<&StoredAttributeCollection> {
        Some(self)
    }
}

impl fmt::Debug for StoredAttributeCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredAttributeCollection")
            .field("identifier", &self.identifier)
            .finish()
    }
}

/// Builds [`StoredAttributeCollection`]s against one driver.
#[derive(Clone)]
pub struct StoredAttributeCollectionFactory {
    driver: Arc<dyn AttributeDriver>,
}

impl StoredAttributeCollectionFactory {
    pub fn new(driver: Arc<dyn AttributeDriver>) -> Self {
        Self { driver }
    }

    pub fn driver(&self) -> &Arc<dyn AttributeDriver> {
        &self.driver
    }

    /// Empty collection under a fresh identifier.
    pub fn create_collection(&self) -> DriverResult<StoredAttributeCollection> {
        let identifier = self.driver.create_identifier()?;
        debug!(identifier = %identifier, "created attribute collection");
        Ok(StoredAttributeCollection::new(Arc::clone(&self.driver), identifier))
    }

    /// Disconnected copy of `entries` under a fresh identifier.
    ///
    /// If the copy fails, the issued identifier stays registered with an
    /// empty bag.
    pub fn create_collection_from_map(&self, entries: &Attributes) -> DriverResult<StoredAttributeCollection> {
        let collection = self.create_collection()?;
        collection.extend(entries)?;
        Ok(collection)
    }

    /// Alias `source` if it is store-backed, otherwise copy it.
    ///
    /// A store-backed source yields a proxy on the very same identifier:
    /// writes through either are visible through both. Any other source is
    /// copied under a fresh identifier.
    pub fn create_collection_from(
        &self,
        source: &dyn AttributeCollection,
    ) -> DriverResult<StoredAttributeCollection> {
        match source.as_stored() {
            Some(stored) => Ok(StoredAttributeCollection::new(
                Arc::clone(&self.driver),
                stored.identifier().clone(),
            )),
            None => self.create_collection_from_map(&source.entries()?),
        }
    }

    /// Wrap `identifier` without checking that it exists.
    pub fn open_collection(&self, identifier: Identifier) -> StoredAttributeCollection {
        StoredAttributeCollection::new(Arc::clone(&self.driver), identifier)
    }

    /// Copy every entry of `source` into the collection at `identifier`.
    ///
    /// Upsert semantics: keys already stored at `identifier` that `source`
    /// does not mention keep their values.
    pub fn create_collection_at(
        &self,
        identifier: Identifier,
        source: &dyn AttributeCollection,
    ) -> DriverResult<StoredAttributeCollection> {
        let entries = source.entries()?;
        let collection = self.open_collection(identifier);
        collection.extend(&entries)?;
        Ok(collection)
    }
}

impl fmt::Debug for StoredAttributeCollectionFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredAttributeCollectionFactory").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geostore_driver::{DriverError, InMemoryDriver, ReadOnlyDriver};

    fn factory() -> (InMemoryDriver, StoredAttributeCollectionFactory) {
        let driver = InMemoryDriver::new();
        let factory = StoredAttributeCollectionFactory::new(Arc::new(driver.clone()));
        (driver, factory)
    }

    fn plain(pairs: &[(&str, AttributeValue)]) -> Attributes {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    // -----------------------------------------------------------------------
    // Creation
    // -----------------------------------------------------------------------

    #[test]
    fn create_collection_is_empty_and_fresh() {
        let (driver, factory) = factory();
        let a = factory.create_collection().unwrap();
        let b = factory.create_collection().unwrap();
        assert_ne!(a.identifier(), b.identifier());
        assert!(a.is_empty().unwrap());
        assert_eq!(driver.len().unwrap(), 2);
    }

    #[test]
    fn copy_from_map_is_disconnected() {
        let (_, factory) = factory();
        let mut source = plain(&[("a", 1.into()), ("b", "two".into())]);
        let copy = factory.create_collection_from_map(&source).unwrap();
        assert_eq!(copy.to_map().unwrap(), source);

        source.insert("c".into(), 3.into());
        assert!(!copy.contains_key("c").unwrap());
    }

    #[test]
    fn stored_source_is_aliased() {
        let (_, factory) = factory();
        let original = factory.create_collection().unwrap();
        original.insert("name", "river").unwrap();

        let alias = factory.create_collection_from(&original).unwrap();
        assert_eq!(alias.identifier(), original.identifier());

        alias.insert("width", 12.5).unwrap();
        assert_eq!(original.get("width").unwrap(), Some(AttributeValue::Float(12.5)));
        original.remove("name").unwrap();
        assert!(!alias.contains_key("name").unwrap());
    }

    #[test]
    fn plain_source_is_copied() {
        let (_, factory) = factory();
        let source = plain(&[("a", 1.into())]);
        let copy = factory.create_collection_from(&source).unwrap();
        let other = factory.create_collection_from(&source).unwrap();
        assert_ne!(copy.identifier(), other.identifier());
        assert_eq!(copy.to_map().unwrap(), source);
    }

    #[test]
    fn open_collection_is_lazy() {
        let (driver, factory) = factory();
        let id = Identifier::new("not-yet-stored").unwrap();
        let collection = factory.open_collection(id.clone());
        assert_eq!(collection.identifier(), &id);
        assert!(!driver.contains(&id).unwrap());
        assert!(matches!(collection.to_map(), Err(DriverError::NotFound(_))));

        collection.insert("k", true).unwrap();
        assert!(driver.contains(&id).unwrap());
    }

    #[test]
    fn create_at_upserts_over_existing_keys() {
        let (_, factory) = factory();
        let existing = factory.create_collection().unwrap();
        existing.insert("p", 9).unwrap();
        existing.insert("a", 0).unwrap();

        let source = plain(&[("a", 1.into()), ("b", 2.into())]);
        let merged = factory
            .create_collection_at(existing.identifier().clone(), &source)
            .unwrap();

        assert_eq!(merged.identifier(), existing.identifier());
        assert_eq!(
            merged.to_map().unwrap(),
            plain(&[("p", 9.into()), ("a", 1.into()), ("b", 2.into())])
        );
    }

    #[test]
    fn create_at_from_stored_source_copies_entries() {
        let (_, factory) = factory();
        let source = factory.create_collection().unwrap();
        source.insert("x", 1).unwrap();
        let target = factory
            .create_collection_at(Identifier::new("target").unwrap(), &source)
            .unwrap();
        assert_ne!(target.identifier(), source.identifier());
        assert_eq!(target.get("x").unwrap(), Some(AttributeValue::Integer(1)));

        source.insert("y", 2).unwrap();
        assert!(!target.contains_key("y").unwrap());
    }

    // -----------------------------------------------------------------------
    // Collection operations
    // -----------------------------------------------------------------------

    #[test]
    fn keys_len_and_remove() {
        let (_, factory) = factory();
        let collection = factory.create_collection().unwrap();
        collection.insert("b", AttributeValue::Null).unwrap();
        collection.insert("a", "x").unwrap();
        assert_eq!(collection.keys().unwrap(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(collection.len().unwrap(), 2);
        assert!(collection.contains_key("b").unwrap());
        assert!(collection.remove("b").unwrap());
        assert!(!collection.remove("b").unwrap());
        assert_eq!(collection.len().unwrap(), 1);
    }

    #[test]
    fn extend_writes_whole_batch() {
        let (driver, factory) = factory();
        let collection = factory.open_collection(Identifier::new("bulk").unwrap());
        collection.extend(&Attributes::new()).unwrap();
        assert!(!driver.contains(collection.identifier()).unwrap());

        collection
            .extend(&plain(&[("a", 1.into()), ("b", 2.into()), ("c", 3.into())]))
            .unwrap();
        assert_eq!(collection.keys().unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn read_only_driver_rejects_creation() {
        let inner = InMemoryDriver::new();
        let factory = StoredAttributeCollectionFactory::new(Arc::new(ReadOnlyDriver::new(inner)));
        assert!(matches!(
            factory.create_collection(),
            Err(DriverError::UnsupportedOperation { .. })
        ));
    }
}
