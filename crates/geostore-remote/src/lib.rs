//! Remote record store for geostore.
//!
//! Keeps each feature as one JSON document on a WebHDFS-style distributed
//! filesystem. Requests go through the [`Transport`] trait, so the wire
//! client is pluggable; [`InMemoryTransport`] emulates a namenode for tests.
//!
//! ```
//! use geostore_remote::{AuthenticationStrategy, InMemoryTransport, RemoteConfig, RemoteDriver};
//! use geostore_driver::AttributeDriver;
//!
//! let config = RemoteConfig::default().with_auth(AuthenticationStrategy::user("etl")?);
//! let driver = RemoteDriver::new(InMemoryTransport::new(), config)?;
//! let id = driver.create_identifier()?;
//! driver.write_attribute(&id, "name", "Main Street".into())?;
//! assert_eq!(driver.read_attributes(&id)?.len(), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod auth;
pub mod config;
pub mod driver;
pub mod error;
pub mod request;
pub mod transport;

pub use auth::AuthenticationStrategy;
pub use config::RemoteConfig;
pub use driver::RemoteDriver;
pub use error::{RemoteError, RemoteResult};
pub use request::{HttpMethod, Operation, RemoteRequest, RemoteResponse};
pub use transport::{InMemoryTransport, Transport};
