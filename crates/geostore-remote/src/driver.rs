use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use geostore_driver::{DriverError, DriverResult, FeatureRecord, RecordStore};
use geostore_types::{AttributeValue, Identifier};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::RemoteConfig;
use crate::error::RemoteResult;
use crate::request::{Operation, RemoteRequest, RemoteResponse};
use crate::transport::Transport;

/// Body of a WebHDFS `DELETE` response.
#[derive(Deserialize)]
struct BooleanResponse {
    boolean: bool,
}

/// Record store keeping each feature as one JSON document on a remote
/// filesystem.
///
/// Every driver call is a full read or read-modify-write of the document.
/// Edits through one handle and its clones are serialized by a shared
/// lock held from fetch to store. Separate drivers pointed at the same
/// filesystem are not coordinated; between them the last write wins.
pub struct RemoteDriver<T> {
    transport: Arc<T>,
    config: Arc<RemoteConfig>,
    edits: Arc<Mutex<()>>,
}

impl<T> Clone for RemoteDriver<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            config: Arc::clone(&self.config),
            edits: Arc::clone(&self.edits),
        }
    }
}

impl<T: Transport> RemoteDriver<T> {
    pub fn new(transport: T, config: RemoteConfig) -> RemoteResult<Self> {
        Self::with_shared_transport(Arc::new(transport), config)
    }

    /// Build a driver over a transport the caller keeps a handle to.
    pub fn with_shared_transport(transport: Arc<T>, config: RemoteConfig) -> RemoteResult<Self> {
        config.validate()?;
        debug!(
            base_url = %config.base_url,
            root = %config.root,
            auth = config.auth.display_name(),
            "remote driver configured"
        );
        Ok(Self {
            transport,
            config: Arc::new(config),
            edits: Arc::new(Mutex::new(())),
        })
    }

    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    fn edit_lock(&self) -> DriverResult<MutexGuard<'_, ()>> {
        self.edits
            .lock()
            .map_err(|e| DriverError::Backend(format!("lock poisoned: {e}")))
    }

    fn send(&self, request: RemoteRequest, id: &Identifier) -> DriverResult<RemoteResponse> {
        debug!(method = %request.method, url = %request.url, "remote request");
        let response = self.transport.execute(&request)?;
        if response.is_success() {
            return Ok(response);
        }
        warn!(
            method = %request.method,
            url = %request.url,
            status = response.status,
            "remote request failed"
        );
        Err(status_error(response.status, &request, id))
    }

    fn fetch(&self, id: &Identifier) -> DriverResult<FeatureRecord> {
        let request = RemoteRequest::new(&self.config, Operation::Open, id);
        let response = self.send(request, id)?;
        Ok(serde_json::from_slice(&response.body)?)
    }

    fn store(&self, id: &Identifier, record: &FeatureRecord) -> DriverResult<()> {
        ensure_finite(record)?;
        let body = serde_json::to_vec(record)?;
        let request = RemoteRequest::new(&self.config, Operation::Create, id).with_body(body);
        self.send(request, id)?;
        Ok(())
    }
}

/// JSON has no encoding for NaN or infinities; serde_json would write
/// `null` and the document could never be read back.
fn ensure_finite(record: &FeatureRecord) -> DriverResult<()> {
    let coords = record.geometry.coordinates();
    if let Some(c) = coords.iter().find(|c| !c.x.is_finite() || !c.y.is_finite()) {
        return Err(DriverError::Serialization(format!(
            "non-finite coordinate ({}, {}) cannot be stored",
            c.x, c.y
        )));
    }
    let bad = record
        .attributes
        .iter()
        .find(|(_, v)| matches!(v, AttributeValue::Float(f) if !f.is_finite()));
    if let Some((key, value)) = bad {
        return Err(DriverError::Serialization(format!(
            "non-finite value {value} for attribute {key} cannot be stored"
        )));
    }
    Ok(())
}

fn status_error(status: u16, request: &RemoteRequest, id: &Identifier) -> DriverError {
    match status {
        404 => DriverError::NotFound(id.clone()),
        409 => DriverError::unsupported(format!(
            "{} {} on a write-once document",
            request.method,
            request.path()
        )),
        401 | 403 => DriverError::unsupported(format!(
            "{} {} denied with status {status}",
            request.method,
            request.path()
        )),
        _ => DriverError::Backend(format!(
            "{} {} failed with status {status}",
            request.method,
            request.path()
        )),
    }
}

impl<T: Transport> RecordStore for RemoteDriver<T> {
    fn create_record(&self) -> DriverResult<Identifier> {
        let id = Identifier::generate();
        self.store(&id, &FeatureRecord::new())?;
        debug!(identifier = %id, "created remote feature record");
        Ok(id)
    }

    fn read_record<R>(
        &self,
        id: &Identifier,
        f: impl FnOnce(&FeatureRecord) -> DriverResult<R>,
    ) -> DriverResult<R> {
        let record = self.fetch(id)?;
        f(&record)
    }

    fn modify_record<R>(
        &self,
        id: &Identifier,
        f: impl FnOnce(&mut FeatureRecord) -> DriverResult<R>,
    ) -> DriverResult<R> {
        let _guard = self.edit_lock()?;
        let mut record = match self.fetch(id) {
            Ok(record) => record,
            Err(DriverError::NotFound(_)) => FeatureRecord::new(),
            Err(e) => return Err(e),
        };
        // Nothing is written unless the edit succeeds.
        let result = f(&mut record)?;
        self.store(id, &record)?;
        Ok(result)
    }

    fn remove_record(&self, id: &Identifier) -> DriverResult<bool> {
        let _guard = self.edit_lock()?;
        let request = RemoteRequest::new(&self.config, Operation::Delete, id);
        let response = self.send(request, id)?;
        let removed = serde_json::from_slice::<BooleanResponse>(&response.body)?.boolean;
        if removed {
            debug!(identifier = %id, "removed remote feature record");
        }
        Ok(removed)
    }
}

impl<T> fmt::Debug for RemoteDriver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteDriver")
            .field("base_url", &self.config.base_url)
            .field("root", &self.config.root)
            .field("auth", &self.config.auth.display_name())
            .finish_non_exhaustive()
    }
}
