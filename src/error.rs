use thiserror::Error;

use crate::client::response::StatementResponse;
use crate::config::ConfigError;

pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error returned by a [`crate::client::Transport`] implementation.
pub type TransportError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error("client config error: {0}")]
    Config(#[from] ConfigError),
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("serialization error: {0}")]
    Serialize(#[from] SerializeError),
    #[error("remote error: {0}")]
    Remote(#[from] RemoteError),
    #[error("transport error: {0}")]
    Transport(#[source] TransportError),
    #[error("decode error: {0}")]
    Decode(#[source] serde_json::Error),
}

impl Error {
    /// Returns a machine-readable code for the error variant.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Configuration(err) => err.code(),
            Error::Config(_) => "Config",
            Error::Validation(err) => err.code(),
            Error::Serialize(err) => err.code(),
            Error::Remote(err) => err.code(),
            Error::Transport(_) => "Transport",
            Error::Decode(_) => "Decode",
        }
    }

    pub(crate) fn transport(err: TransportError) -> Self {
        Error::Transport(err)
    }
}

/// Model declarations that cannot produce a usable collection.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("model '{model}' has no entity declaration")]
    MissingEntity { model: &'static str },
    #[error("model '{model}' declares no fields")]
    MissingFields { model: &'static str },
    #[error("field '{field}' on table '{table}' has no resolvable storage type")]
    UnresolvedFieldType { table: String, field: String },
    #[error("schema for '{found}' cannot bind a collection of '{expected}'")]
    ModelMismatch {
        expected: &'static str,
        found: &'static str,
    },
}

impl ConfigurationError {
    pub fn code(&self) -> &'static str {
        match self {
            ConfigurationError::MissingEntity { .. } => "MissingEntity",
            ConfigurationError::MissingFields { .. } => "MissingFields",
            ConfigurationError::UnresolvedFieldType { .. } => "UnresolvedFieldType",
            ConfigurationError::ModelMismatch { .. } => "ModelMismatch",
        }
    }
}

/// Caller input rejected before any request is built.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid record key: {0}")]
    InvalidRecordKey(String),
    #[error("invalid key: {0}")]
    InvalidKey(String),
    #[error("identifier '{id}' does not belong to table '{table}'")]
    TableMismatch { table: String, id: String },
    #[error("the '{side}' argument should be either an ID or an object with an id field")]
    InvalidEndpoint { side: &'static str },
    #[error("record identifier must be a string")]
    NonStringId,
}

impl ValidationError {
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::InvalidRecordKey(_) => "InvalidRecordKey",
            ValidationError::InvalidKey(_) => "InvalidKey",
            ValidationError::TableMismatch { .. } => "TableMismatch",
            ValidationError::InvalidEndpoint { .. } => "InvalidEndpoint",
            ValidationError::NonStringId => "NonStringId",
        }
    }
}

#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("unserializable value: {0}")]
    Unserializable(String),
    #[error("value could not be converted: {0}")]
    Json(#[from] serde_json::Error),
}

impl SerializeError {
    pub fn code(&self) -> &'static str {
        match self {
            SerializeError::Unserializable(_) => "Unserializable",
            SerializeError::Json(_) => "Unserializable",
        }
    }
}

/// Failures reported by the database itself. Payloads are kept verbatim.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("statement failed after {}: {}", .0.time, .0.detail.as_deref().unwrap_or("no detail"))]
    Statement(StatementResponse),
    #[error("request rejected with code {code}: {payload}")]
    Envelope {
        code: serde_json::Value,
        payload: serde_json::Value,
    },
}

impl RemoteError {
    pub fn code(&self) -> &'static str {
        match self {
            RemoteError::Statement(_) => "StatementFailed",
            RemoteError::Envelope { .. } => "RequestRejected",
        }
    }
}
