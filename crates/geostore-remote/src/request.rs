use std::fmt;

use geostore_types::Identifier;

use crate::config::RemoteConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Put,
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        })
    }
}

/// The filesystem operations the driver issues.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    Open,
    Create,
    Delete,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Create => "CREATE",
            Self::Delete => "DELETE",
        }
    }

    pub fn method(self) -> HttpMethod {
        match self {
            Self::Open => HttpMethod::Get,
            Self::Create => HttpMethod::Put,
            Self::Delete => HttpMethod::Delete,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "OPEN" => Some(Self::Open),
            "CREATE" => Some(Self::Create),
            "DELETE" => Some(Self::Delete),
            _ => None,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteRequest {
    pub method: HttpMethod,
    pub url: String,
    pub body: Option<Vec<u8>>,
}

impl RemoteRequest {
    /// Request for `op` on the document holding `id`.
    pub fn new(config: &RemoteConfig, op: Operation, id: &Identifier) -> Self {
        Self {
            method: op.method(),
            url: config.url(op, id),
            body: None,
        }
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// URL without its query string.
    pub fn path(&self) -> &str {
        self.url.split_once('?').map_or(self.url.as_str(), |(path, _)| path)
    }

    /// Value of the first query parameter named `key`.
    pub fn query_param(&self, key: &str) -> Option<&str> {
        let (_, query) = self.url.split_once('?')?;
        query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RemoteResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthenticationStrategy;

    #[test]
    fn operations_map_to_methods() {
        assert_eq!(Operation::Open.method(), HttpMethod::Get);
        assert_eq!(Operation::Create.method(), HttpMethod::Put);
        assert_eq!(Operation::Delete.method(), HttpMethod::Delete);
        assert_eq!(Operation::parse("CREATE"), Some(Operation::Create));
        assert_eq!(Operation::parse("APPEND"), None);
        assert_eq!(HttpMethod::Put.to_string(), "PUT");
    }

    #[test]
    fn request_path_and_query() {
        let config = RemoteConfig::default()
            .with_auth(AuthenticationStrategy::user("bob").unwrap());
        let id = Identifier::new("abc").unwrap();
        let request = RemoteRequest::new(&config, Operation::Create, &id).with_body(b"{}".to_vec());

        assert_eq!(request.method, HttpMethod::Put);
        assert_eq!(request.path(), "http://127.0.0.1:9870/webhdfs/v1/geostore/abc.json");
        assert_eq!(request.query_param("op"), Some("CREATE"));
        assert_eq!(request.query_param("overwrite"), Some("true"));
        assert_eq!(request.query_param("user.name"), Some("bob"));
        assert_eq!(request.query_param("missing"), None);
        assert_eq!(request.body.as_deref(), Some(&b"{}"[..]));
    }

    #[test]
    fn success_range() {
        assert!(RemoteResponse::new(200, "").is_success());
        assert!(RemoteResponse::new(201, "").is_success());
        assert!(!RemoteResponse::new(404, "").is_success());
        assert!(!RemoteResponse::new(500, "").is_success());
    }
}
