//! Error types shared by every client operation.

use super::version::ApiVersion;
use reqwest::StatusCode;
use thiserror::Error;

/// Convenient result alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the stackdio client
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// An endpoint template could not be resolved from the call arguments
    #[error("Cannot resolve endpoint '{template}': {reason}")]
    Template { template: String, reason: String },

    /// The operation is not available on the connected server
    #[error("{operation} requires server version {required}, connected server is {}", display_actual(.actual))]
    UnsupportedVersion {
        operation: &'static str,
        required: String,
        actual: Option<ApiVersion>,
    },

    /// A version or version constraint string could not be parsed
    #[error("Invalid version '{0}'")]
    InvalidVersion(String),

    /// The server answered with a non-2xx status
    #[error("API request failed ({status}): {message}")]
    Api { status: StatusCode, message: String },

    /// Connection-level failure (DNS, TLS, refused, timeout...)
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A lookup by name found no matching entity
    #[error("{kind} {key} not found")]
    DomainLookup { kind: &'static str, key: String },

    /// A call argument was rejected before any request was sent
    #[error("{0}")]
    Validation(String),

    /// The response did not have the expected shape
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// The operation needs credentials that were not configured
    #[error("No {0} credentials configured")]
    MissingCredentials(&'static str),

    /// The response body was not valid JSON
    #[error("Failed to parse response JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

fn display_actual(actual: &Option<ApiVersion>) -> String {
    match actual {
        Some(version) => version.to_string(),
        None => "unknown (not authenticated)".to_string(),
    }
}

impl Error {
    /// HTTP status of an API error, if this is one
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::Transport(err) => err.status(),
            _ => None,
        }
    }

    /// Whether this error is an HTTP 404 from the server
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    pub(crate) fn lookup(kind: &'static str, key: impl Into<String>) -> Self {
        Error::DomainLookup {
            kind,
            key: key.into(),
        }
    }

    pub(crate) fn template(template: &str, reason: impl Into<String>) -> Self {
        Error::Template {
            template: template.to_string(),
            reason: reason.into(),
        }
    }
}
