//! The wire seam between the remote driver and the filesystem.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use tracing::debug;

use crate::error::{RemoteError, RemoteResult};
use crate::request::{Operation, RemoteRequest, RemoteResponse};

/// Executes one request and returns the raw response.
///
/// Implementations report only wire-level faults as errors; any response
/// the server produced, whatever its status, comes back as `Ok`.
pub trait Transport: Send + Sync {
    fn execute(&self, request: &RemoteRequest) -> RemoteResult<RemoteResponse>;
}

/// In-process emulation of a WebHDFS namenode.
///
/// Documents are keyed by request path. Every executed request is kept in a
/// log for inspection.
#[derive(Default)]
pub struct InMemoryTransport {
    files: Mutex<BTreeMap<String, Vec<u8>>>,
    log: Mutex<Vec<RemoteRequest>>,
    require_user: bool,
}

impl InMemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `403` to every request without a `user.name` parameter.
    pub fn require_user(mut self) -> Self {
        self.require_user = true;
        self
    }

    fn lock<T>(mutex: &Mutex<T>) -> RemoteResult<MutexGuard<'_, T>> {
        mutex
            .lock()
            .map_err(|e| RemoteError::Transport(format!("lock poisoned: {e}")))
    }

    /// Every request executed so far, oldest first.
    pub fn requests(&self) -> RemoteResult<Vec<RemoteRequest>> {
        Ok(Self::lock(&self.log)?.clone())
    }

    /// Number of documents stored.
    pub fn file_count(&self) -> RemoteResult<usize> {
        Ok(Self::lock(&self.files)?.len())
    }

    /// Raw bytes stored at `path`, if any.
    pub fn file(&self, path: &str) -> RemoteResult<Option<Vec<u8>>> {
        Ok(Self::lock(&self.files)?.get(path).cloned())
    }

    /// Store raw bytes at `path`, bypassing the request surface.
    pub fn put_file(&self, path: impl Into<String>, contents: impl Into<Vec<u8>>) -> RemoteResult<()> {
        Self::lock(&self.files)?.insert(path.into(), contents.into());
        Ok(())
    }

    fn remote_exception(status: u16, exception: &str, message: &str) -> RemoteResponse {
        let body = serde_json::json!({
            "RemoteException": { "exception": exception, "message": message }
        });
        RemoteResponse::new(status, body.to_string())
    }
}

impl Transport for InMemoryTransport {
    fn execute(&self, request: &RemoteRequest) -> RemoteResult<RemoteResponse> {
        Self::lock(&self.log)?.push(request.clone());
        debug!(method = %request.method, url = %request.url, "in-memory transport request");

        if self.require_user && request.query_param("user.name").is_none() {
            return Ok(Self::remote_exception(
                403,
                "AccessControlException",
                "anonymous access is not permitted",
            ));
        }

        let op = match request.query_param("op").and_then(Operation::parse) {
            Some(op) if op.method() == request.method => op,
            _ => {
                return Ok(Self::remote_exception(
                    400,
                    "IllegalArgumentException",
                    "unsupported operation",
                ))
            }
        };

        let path = request.path().to_string();
        let mut files = Self::lock(&self.files)?;
        let response = match op {
            Operation::Open => match files.get(&path) {
                Some(contents) => RemoteResponse::new(200, contents.clone()),
                None => Self::remote_exception(404, "FileNotFoundException", &path),
            },
            Operation::Create => {
                let overwrite = request.query_param("overwrite") == Some("true");
                if files.contains_key(&path) && !overwrite {
                    Self::remote_exception(409, "FileAlreadyExistsException", &path)
                } else {
                    files.insert(path, request.body.clone().unwrap_or_default());
                    RemoteResponse::new(201, Vec::new())
                }
            }
            Operation::Delete => {
                let removed = files.remove(&path).is_some();
                RemoteResponse::new(200, serde_json::json!({ "boolean": removed }).to_string())
            }
        };
        Ok(response)
    }
}

impl std::fmt::Debug for InMemoryTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let files = self.files.lock().map(|m| m.len()).unwrap_or(0);
        f.debug_struct("InMemoryTransport")
            .field("file_count", &files)
            .field("require_user", &self.require_user)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::HttpMethod;

    fn request(method: HttpMethod, query: &str) -> RemoteRequest {
        RemoteRequest {
            method,
            url: format!("http://nn/webhdfs/v1/geostore/a.json?{query}"),
            body: None,
        }
    }

    #[test]
    fn create_open_delete() {
        let transport = InMemoryTransport::new();
        let put = request(HttpMethod::Put, "op=CREATE").with_body(b"{\"x\":1}".to_vec());
        assert_eq!(transport.execute(&put).unwrap().status, 201);

        let open = transport.execute(&request(HttpMethod::Get, "op=OPEN")).unwrap();
        assert_eq!(open.status, 200);
        assert_eq!(open.body, b"{\"x\":1}");

        let delete = transport.execute(&request(HttpMethod::Delete, "op=DELETE")).unwrap();
        assert_eq!(delete.body, br#"{"boolean":true}"#);
        let again = transport.execute(&request(HttpMethod::Delete, "op=DELETE")).unwrap();
        assert_eq!(again.body, br#"{"boolean":false}"#);

        assert_eq!(transport.requests().unwrap().len(), 4);
    }

    #[test]
    fn open_missing_is_404() {
        let transport = InMemoryTransport::new();
        let response = transport.execute(&request(HttpMethod::Get, "op=OPEN")).unwrap();
        assert_eq!(response.status, 404);
        assert!(String::from_utf8_lossy(&response.body).contains("FileNotFoundException"));
    }

    #[test]
    fn create_without_overwrite_conflicts() {
        let transport = InMemoryTransport::new();
        transport.put_file("http://nn/webhdfs/v1/geostore/a.json", "{}").unwrap();
        let response = transport.execute(&request(HttpMethod::Put, "op=CREATE")).unwrap();
        assert_eq!(response.status, 409);
        let response = transport
            .execute(&request(HttpMethod::Put, "op=CREATE&overwrite=true"))
            .unwrap();
        assert_eq!(response.status, 201);
    }

    #[test]
    fn require_user_rejects_anonymous() {
        let transport = InMemoryTransport::new().require_user();
        let anonymous = transport.execute(&request(HttpMethod::Get, "op=OPEN")).unwrap();
        assert_eq!(anonymous.status, 403);
        let named = transport
            .execute(&request(HttpMethod::Get, "op=OPEN&user.name=alice"))
            .unwrap();
        assert_eq!(named.status, 404);
    }

    #[test]
    fn method_must_match_operation() {
        let transport = InMemoryTransport::new();
        let response = transport.execute(&request(HttpMethod::Get, "op=CREATE")).unwrap();
        assert_eq!(response.status, 400);
        let response = transport.execute(&request(HttpMethod::Get, "op=LISTSTATUS")).unwrap();
        assert_eq!(response.status, 400);
    }
}
