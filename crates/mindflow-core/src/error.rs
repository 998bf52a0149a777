//! Error types for the MindFlow client core.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Authentication failures surfaced to the caller for display.
///
/// `ConfirmationRequired` is deliberately *not* here: a registration that
/// needs an external confirmation step is a successful third outcome
/// (`RegisterOutcome::ConfirmationRequired`), not a failure. The variant of
/// the same name below covers the case where a user tries to *sign in*
/// before completing confirmation and the service rejects it.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthFailure {
    /// Username/password pair did not verify.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Identity already registered.
    #[error("identity already registered: {0}")]
    DuplicateIdentity(String),

    /// The identity has not completed its external confirmation step.
    #[error("identity awaiting confirmation")]
    ConfirmationRequired,

    /// An operation that requires an active session was called without one.
    #[error("no active session")]
    NotSignedIn,

    /// The account service rejected the request for another reason.
    #[error("{0}")]
    Rejected(String),
}

/// A shared error type for the MindFlow client core.
///
/// Mirrors the error taxonomy of the design: authentication failures are
/// surfaced for display, persistence failures are warnings that never roll
/// back optimistic state, and analysis failures are absorbed by the caller
/// with a fallback record.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum MindflowError {
    /// Authentication error (bad credentials, duplicate identity, ...)
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthFailure),

    /// Store unreachable or rejected a write.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Annotation/reflection call failed.
    #[error("analysis error: {0}")]
    Analysis(String),

    /// Entity not found with type information.
    #[error("not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// IO error (file system operations).
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error.
    #[error("serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation).
    #[error("internal error: {0}")]
    Internal(String),
}

impl MindflowError {
    /// Creates a NotFound error.
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an IO error.
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Persistence error.
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence(message.into())
    }

    /// Creates an Analysis error.
    pub fn analysis(message: impl Into<String>) -> Self {
        Self::Analysis(message.into())
    }

    /// Creates a Config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this is an authentication error.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }

    /// Check if this is a persistence error.
    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Persistence(_))
    }

    /// Check if this is an analysis error.
    pub fn is_analysis(&self) -> bool {
        matches!(self, Self::Analysis(_))
    }
}

impl From<std::io::Error> for MindflowError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for MindflowError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for MindflowError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for MindflowError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// Conversion from anyhow::Error (transitional glue at the app edge).
impl From<anyhow::Error> for MindflowError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, MindflowError>`.
pub type Result<T> = std::result::Result<T, MindflowError>;
