// ── Runtime connection configuration ──
//
// These types describe *how* to reach the ACS northbound interface.
// They never touch disk: `acs-config` (or any embedding application)
// builds a `ClientConfig` and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed lab servers).
    DangerAcceptInvalid,
}

/// Configuration for talking to one ACS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// NBI base URL (e.g., `http://acs.example.net:7557`).
    pub url: Url,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Transport timeout for a single request.
    pub timeout: Duration,
    /// Backend-side wait for connection-request tasks when the caller
    /// does not pick one.
    pub connection_request_timeout: Duration,
}

impl ClientConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            connection_request_timeout: Duration::from_millis(3000),
        }
    }
}
