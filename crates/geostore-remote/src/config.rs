use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};

use geostore_types::Identifier;

use crate::auth::AuthenticationStrategy;
use crate::error::{RemoteError, RemoteResult};
use crate::request::Operation;

/// REST prefix every WebHDFS path lives under.
pub const WEBHDFS_PREFIX: &str = "/webhdfs/v1";

/// Bytes escaped when an identifier becomes a path segment: everything but
/// the RFC 3986 unreserved set.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Where and how the remote driver reaches the filesystem.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Scheme, host and port, e.g. `http://namenode:9870`.
    pub base_url: String,
    /// Directory holding one document per feature.
    pub root: String,
    pub auth: AuthenticationStrategy,
    /// Whether writes replace an existing document.
    pub overwrite: bool,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:9870".into(),
            root: "/geostore".into(),
            auth: AuthenticationStrategy::Anonymous,
            overwrite: true,
        }
    }
}

impl RemoteConfig {
    /// Parse and validate a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> RemoteResult<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_auth(mut self, auth: AuthenticationStrategy) -> Self {
        self.auth = auth;
        self
    }

    pub fn validate(&self) -> RemoteResult<()> {
        if self.base_url.is_empty() {
            return Err(RemoteError::EmptyArgument("base_url"));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(RemoteError::Config(format!(
                "base_url must be an http(s) URL: {}",
                self.base_url
            )));
        }
        if !self.root.starts_with('/') {
            return Err(RemoteError::Config(format!(
                "root must be an absolute path: {}",
                self.root
            )));
        }
        self.auth.validate()
    }

    /// Path of the document holding `id`, relative to the WebHDFS prefix.
    ///
    /// The identifier is percent-encoded, so distinct identifiers always
    /// name distinct documents.
    pub fn document_path(&self, id: &Identifier) -> String {
        format!(
            "{}/{}.json",
            self.root.trim_end_matches('/'),
            utf8_percent_encode(id.as_str(), SEGMENT)
        )
    }

    /// Full request URL for `op` on the document holding `id`.
    pub fn url(&self, op: Operation, id: &Identifier) -> String {
        let mut url = format!(
            "{}{}{}?op={}",
            self.base_url.trim_end_matches('/'),
            WEBHDFS_PREFIX,
            self.document_path(id),
            op.as_str()
        );
        if op == Operation::Create && self.overwrite {
            url.push_str("&overwrite=true");
        }
        let auth = self.auth.request();
        if !auth.is_empty() {
            url.push('&');
            url.push_str(&auth);
        }
        url
    }
}
