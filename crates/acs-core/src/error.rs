// ── Core error types ──
//
// User-facing errors from acs-core. The `From<acs_api::Error>` impl
// translates transport-layer errors into domain variants while keeping
// what was attempted, against which id, and what the backend said.

use acs_api::Collection;
use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Caller errors ────────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to ACS at {url}")]
    ConnectionFailed {
        url: String,
        #[source]
        source: acs_api::Error,
    },

    #[error("Request to {url} timed out")]
    Timeout {
        url: String,
        #[source]
        source: acs_api::Error,
    },

    #[error("Request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: acs_api::Error,
    },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Task '{task}' rejected for device {device_id} (HTTP {status}): {message}")]
    TaskRejected {
        device_id: String,
        task: &'static str,
        status: u16,
        message: String,
    },

    #[error("{operation} on '{target}' failed: {message}")]
    Api {
        operation: String,
        target: String,
        /// HTTP status code (if the request got a response).
        status: Option<u16>,
        message: String,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// HTTP status reported by the backend, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::TaskRejected { status, .. } => Some(*status),
            Self::Api { status, .. } => *status,
            Self::NotFound { .. } => Some(404),
            Self::Transport { source, .. } => source.status(),
            _ => None,
        }
    }
}

fn entity_type(collection: Collection) -> &'static str {
    match collection {
        Collection::Devices => "Device",
        Collection::Tasks => "Task",
        Collection::Presets => "Preset",
        Collection::Files => "File",
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<acs_api::Error> for CoreError {
    fn from(err: acs_api::Error) -> Self {
        match err {
            acs_api::Error::EmptyIdentifier { field } => CoreError::ValidationFailed {
                message: format!("{field} must not be empty"),
            },
            acs_api::Error::InvalidHeader { header, value } => CoreError::ValidationFailed {
                message: format!("{value:?} is not a valid {header} header value"),
            },
            acs_api::Error::InvalidBaseUrl { url } => CoreError::Config {
                message: format!("Base URL cannot carry API paths: {url}"),
            },
            acs_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            acs_api::Error::Tls(msg) => CoreError::Config {
                message: format!("TLS error: {msg}"),
            },
            acs_api::Error::Transport(ref e) if e.is_timeout() || e.is_connect() => {
                let url = e
                    .url()
                    .map_or_else(|| "<unknown>".into(), ToString::to_string);
                if e.is_timeout() {
                    CoreError::Timeout { url, source: err }
                } else {
                    CoreError::ConnectionFailed { url, source: err }
                }
            }
            acs_api::Error::Transport(ref e) => CoreError::Transport {
                url: e
                    .url()
                    .map_or_else(|| "<unknown>".into(), ToString::to_string),
                source: err,
            },
            acs_api::Error::Api {
                operation,
                target,
                status,
                message,
            } => CoreError::Api {
                operation: operation.into(),
                target,
                status: Some(status),
                message,
            },
            acs_api::Error::NotFound { collection, id } => CoreError::NotFound {
                entity_type: entity_type(collection),
                identifier: id,
            },
            acs_api::Error::TaskRejected {
                device_id,
                task,
                status,
                message,
            } => CoreError::TaskRejected {
                device_id,
                task,
                status,
                message,
            },
            acs_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
