//! Configuration for ACS clients.
//!
//! TOML profiles merged with `ACS_`-prefixed environment variables, and
//! translation to `acs_core::ClientConfig`. Embedding applications load a
//! profile here and hand the result to `AcsClient::new`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use acs_core::{ClientConfig, TlsVerification};

/// Environment variable that replaces the selected profile's URL.
pub const URL_ENV: &str = "ACS_URL";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' is not configured")]
    ProfileNotFound { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is named.
    pub default_profile: Option<String>,

    /// Values a profile falls back to.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named ACS profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default)]
    pub insecure: bool,

    /// Transport timeout, seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Backend wait for connection-request tasks, milliseconds.
    #[serde(default = "default_connection_request_timeout")]
    pub connection_request_timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            insecure: false,
            timeout: default_timeout(),
            connection_request_timeout: default_connection_request_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}
fn default_connection_request_timeout() -> u64 {
    3000
}

/// A named ACS profile.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Profile {
    /// NBI base URL (e.g., "http://acs.example.net:7557").
    pub url: String,

    /// Path to custom CA certificate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,

    /// Override transport timeout (seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Override connection-request wait (milliseconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_request_timeout: Option<u64>,
}

impl Profile {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ca_cert: None,
            insecure: None,
            timeout: None,
            connection_request_timeout: None,
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("net", "acs", "acs").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("acs");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path` + environment. A missing file yields the defaults.
///
/// `ACS_DEFAULTS__TIMEOUT=5` or `ACS_PROFILES__LAB__URL=...` override
/// single keys.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("ACS_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Profile resolution ──────────────────────────────────────────────

/// Pick a profile by name, falling back to `default_profile`.
///
/// `ACS_URL` replaces the profile's URL. With no profile configured at
/// all, `ACS_URL` alone yields an anonymous profile.
pub fn resolve_profile(cfg: &Config, name: Option<&str>) -> Result<(String, Profile), ConfigError> {
    let name = name
        .map(str::to_owned)
        .or_else(|| cfg.default_profile.clone())
        .unwrap_or_else(|| "default".into());
    let env_url = std::env::var(URL_ENV).ok().filter(|u| !u.trim().is_empty());

    let mut profile = match (cfg.profiles.get(&name), env_url.as_deref()) {
        (Some(profile), _) => profile.clone(),
        (None, Some(url)) => Profile::new(url),
        (None, None) => return Err(ConfigError::ProfileNotFound { name }),
    };
    if let Some(url) = env_url {
        profile.url = url;
    }
    Ok((name, profile))
}

/// Build a `ClientConfig` from a profile and the global defaults.
pub fn profile_to_client_config(
    profile: &Profile,
    defaults: &Defaults,
) -> Result<ClientConfig, ConfigError> {
    let url: url::Url = profile.url.parse().map_err(|_| ConfigError::Validation {
        field: "url".into(),
        reason: format!("invalid URL: {}", profile.url),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: "url".into(),
            reason: format!("expected http or https, got '{}'", url.scheme()),
        });
    }

    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let timeout = profile.timeout.unwrap_or(defaults.timeout);
    if timeout == 0 {
        return Err(ConfigError::Validation {
            field: "timeout".into(),
            reason: "must be at least one second".into(),
        });
    }
    let connection_request_timeout = profile
        .connection_request_timeout
        .unwrap_or(defaults.connection_request_timeout);

    let mut config = ClientConfig::new(url);
    config.tls = tls;
    config.timeout = Duration::from_secs(timeout);
    config.connection_request_timeout = Duration::from_millis(connection_request_timeout);
    Ok(config)
}

/// Load, resolve and translate in one step.
pub fn client_config(profile: Option<&str>) -> Result<ClientConfig, ConfigError> {
    let cfg = load_config()?;
    let (_, profile) = resolve_profile(&cfg, profile)?;
    profile_to_client_config(&profile, &cfg.defaults)
}
