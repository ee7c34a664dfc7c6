use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Network failure: {0}")]
    Network(String),

    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    #[error("RPC error: {0}")]
    Rpc(Value),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),
}

impl From<reqwest::Error> for AdapterError {
    fn from(err: reqwest::Error) -> Self {
        AdapterError::Network(err.to_string())
    }
}

impl AdapterError {
    /// The server error envelope, if this is an RPC-level failure.
    pub fn rpc_envelope(&self) -> Option<&Value> {
        match self {
            AdapterError::Rpc(envelope) => Some(envelope),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, AdapterError>;
