//! Error types for the record reconciler
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for reconciler operations
pub type Result<T> = std::result::Result<T, Error>;

/// Failure reported by a [`ZoneRecordApi`](crate::traits::ZoneRecordApi) call
///
/// The HTTP status is carried as a number so callers can branch on it
/// without inspecting the message text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The API answered with a non-success status
    #[error("HTTP {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Message extracted from the response body
        message: String,
    },

    /// The request never produced a response (connect, TLS, timeout)
    #[error("transport error: {0}")]
    Transport(String),

    /// The response arrived but its body could not be decoded
    #[error("invalid response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Create a status error
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a decode error
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// The HTTP status, if the API answered at all
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the API reported that the record does not exist
    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }
}

/// Core error type for the reconciler
#[derive(Error, Debug)]
pub enum Error {
    /// The stored resource identity is not a numeric record ID
    #[error("Error converting record ID {id:?}: {reason}")]
    InvalidIdentity {
        /// The identity as found in state
        id: String,
        /// Parser message
        reason: String,
    },

    /// An import key did not have the `DOMAIN_RECORDID` shape
    #[error(
        "Error importing record {key:?}: make sure the record ID is in the form DOMAIN_RECORDID (i.e. example.com_1234)"
    )]
    InvalidImportKey {
        /// The rejected key
        key: String,
    },

    /// The create call failed
    #[error("Failed to create DNS record: {0}")]
    RemoteCreate(#[source] ApiError),

    /// The get call failed with anything other than not-found
    #[error("Couldn't find DNS record: {0}")]
    RemoteRead(#[source] ApiError),

    /// The update call failed
    #[error("Failed to update DNS record: {0}")]
    RemoteUpdate(#[source] ApiError),

    /// The delete call failed
    #[error("Error deleting DNS record: {0}")]
    RemoteDelete(#[source] ApiError),

    /// State store-related errors
    #[error("State store error: {0}")]
    StateStore(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an invalid identity error
    pub fn invalid_identity(id: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidIdentity {
            id: id.into(),
            reason: reason.to_string(),
        }
    }

    /// Create an invalid import key error
    pub fn invalid_import_key(key: impl Into<String>) -> Self {
        Self::InvalidImportKey { key: key.into() }
    }

    /// Create a state store error
    pub fn state_store(msg: impl Into<String>) -> Self {
        Self::StateStore(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// The underlying API failure, for the remote variants
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::RemoteCreate(e)
            | Self::RemoteRead(e)
            | Self::RemoteUpdate(e)
            | Self::RemoteDelete(e) => Some(e),
            _ => None,
        }
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Config(err.to_string())
    }
}
