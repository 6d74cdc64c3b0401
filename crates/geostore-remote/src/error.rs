use geostore_driver::DriverError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("required argument missing: {0}")]
    NullArgument(&'static str),

    #[error("argument must not be empty: {0}")]
    EmptyArgument(&'static str),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<toml::de::Error> for RemoteError {
    fn from(e: toml::de::Error) -> Self {
        Self::Config(e.to_string())
    }
}

impl From<RemoteError> for DriverError {
    fn from(e: RemoteError) -> Self {
        match e {
            RemoteError::NullArgument(name) => DriverError::NullArgument(name),
            RemoteError::EmptyArgument(name) => DriverError::EmptyArgument(name),
            RemoteError::Serialization(e) => DriverError::Serialization(e.to_string()),
            other @ (RemoteError::Config(_) | RemoteError::Transport(_)) => {
                DriverError::Backend(other.to_string())
            }
        }
    }
}

pub type RemoteResult<T> = Result<T, RemoteError>;
