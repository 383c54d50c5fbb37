use thiserror::Error;

use crate::models::Collection;

/// Top-level error type for the `acs-api` crate.
///
/// Covers every failure mode of the northbound interface: caller
/// validation, transport, backend rejection, and malformed responses.
/// `acs-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Validation ──────────────────────────────────────────────────
    /// A required identifier (device id, task id, tag, file name...) was
    /// empty. Raised before any request leaves the process.
    #[error("{field} must not be empty")]
    EmptyIdentifier { field: &'static str },

    /// A value cannot be sent as an HTTP header.
    #[error("Invalid value for header {header}: {value:?}")]
    InvalidHeader { header: &'static str, value: String },

    /// The base URL cannot carry path segments (`mailto:`, `data:`...).
    #[error("Base URL cannot be used for API requests: {url}")]
    InvalidBaseUrl { url: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout...)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Backend ─────────────────────────────────────────────────────
    /// Non-2xx response from the backend.
    #[error("{operation} on '{target}' failed (HTTP {status}): {message}")]
    Api {
        operation: &'static str,
        target: String,
        status: u16,
        message: String,
    },

    /// An id-addressed endpoint answered 404.
    #[error("{collection} entry '{id}' not found")]
    NotFound { collection: Collection, id: String },

    /// Task submission answered with something other than 200 or 202.
    #[error("Task '{task}' for device '{device_id}' rejected (HTTP {status}): {message}")]
    TaskRejected {
        device_id: String,
        task: &'static str,
        status: u16,
        message: String,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Api { status, .. } | Self::TaskRejected { status, .. } => *status == 404,
            _ => false,
        }
    }

    /// Returns `true` if the failure happened on the wire rather than in
    /// the backend's decision. The client never retries these itself.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// HTTP status reported by the backend, if the request got that far.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } | Self::TaskRejected { status, .. } => Some(*status),
            Self::NotFound { .. } => Some(404),
            Self::Transport(e) => e.status().map(u16::from),
            _ => None,
        }
    }
}
