//! Driver contracts and bundled backends for geostore.
//!
//! A stored feature never lives in memory as a whole. Every read or write
//! on its geometry or attributes is an addressed call against a driver that
//! owns the data. This crate defines those calls and ships the backends
//! that implement them locally.
//!
//! # Contracts
//!
//! - [`GeometryDriver`]: addressed coordinate reads and writes
//! - [`AttributeDriver`]: attribute bag access and identifier issuance
//! - [`FeatureDriver`]: hands out both capabilities of one backend
//!
//! # Backends
//!
//! - [`RecordStore`]: seam for backends keeping one [`FeatureRecord`] per
//!   identifier; every record store is a full driver
//! - [`InMemoryDriver`]: `HashMap`-based store for tests and embedding
//! - [`ReadOnlyDriver`]: wrapper rejecting every write
//!
//! # Design Rules
//!
//! 1. All calls are synchronous; a driver doing I/O blocks inside the call.
//! 2. The driver is the only synchronization boundary; proxies never lock.
//! 3. Failures are mapped onto [`DriverError`] and returned as-is; there are
//!    no retries.

pub mod backend;
pub mod error;
pub mod memory;
pub mod readonly;
pub mod record;
pub mod traits;

pub use backend::RecordStore;
pub use error::{DriverError, DriverResult};
pub use memory::InMemoryDriver;
pub use readonly::ReadOnlyDriver;
pub use record::{FeatureRecord, GeometryNode, NodeKind};
pub use traits::{AttributeDriver, FeatureDriver, GeometryDriver};
