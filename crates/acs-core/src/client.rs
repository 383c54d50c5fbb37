// ── ACS client facade ──
//
// Entry point for consumers. Wraps the NBI transport, converts wire
// records into domain types and maps transport errors into `CoreError`.
// Each operation is a single request/response exchange; nothing is
// cached between calls.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::debug;

use acs_api::transport::{TlsMode, TransportConfig};
use acs_api::{NbiClient, Query};

use crate::config::{ClientConfig, TlsVerification};
use crate::error::CoreError;
use crate::model::{Device, ParameterValues};

/// Path of the last-inform timestamp in device queries.
const LAST_INFORM: &str = "_lastInform";

/// Client for one ACS.
///
/// Cheaply cloneable via `Arc<AcsInner>`; clones share one connection pool.
#[derive(Clone)]
pub struct AcsClient {
    inner: Arc<AcsInner>,
}

struct AcsInner {
    api: NbiClient,
    connection_request_timeout: Duration,
}

impl AcsClient {
    /// Build a client from configuration. No request is made.
    pub fn new(config: &ClientConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            tls: tls_to_transport(&config.tls),
            timeout: config.timeout,
        };
        let api = NbiClient::new(config.url.as_str(), &transport)?;
        debug!(url = %api.base_url(), "ACS client configured");
        Ok(Self::from_api(api, config.connection_request_timeout))
    }

    /// Wrap an already-built transport client.
    pub fn from_api(api: NbiClient, connection_request_timeout: Duration) -> Self {
        Self {
            inner: Arc::new(AcsInner {
                api,
                connection_request_timeout,
            }),
        }
    }

    /// The underlying transport client, for endpoints not wrapped here.
    pub fn api(&self) -> &NbiClient {
        &self.inner.api
    }

    /// Backend-side wait used when an operation defaults to a connection
    /// request.
    pub fn connection_request_timeout(&self) -> Duration {
        self.inner.connection_request_timeout
    }

    // ── Device reads ─────────────────────────────────────────────

    /// Devices whose identifier equals `device_id` exactly.
    ///
    /// Zero matches is an empty list, not an error.
    pub async fn devices_by_id(&self, device_id: &str) -> Result<Vec<Device>, CoreError> {
        let records = self.inner.api.devices_by_id(device_id).await?;
        Ok(records.into_iter().map(Device::from).collect())
    }

    /// The single device with this identifier, if any.
    pub async fn device(&self, device_id: &str) -> Result<Option<Device>, CoreError> {
        Ok(self.devices_by_id(device_id).await?.into_iter().next())
    }

    pub async fn find_devices(&self, query: &Query) -> Result<Vec<Device>, CoreError> {
        let records = self.inner.api.find_devices(query).await?;
        Ok(records.into_iter().map(Device::from).collect())
    }

    /// Every device known to the ACS.
    pub async fn list_devices(&self) -> Result<Vec<Device>, CoreError> {
        let records = self.inner.api.list_devices().await?;
        Ok(records.into_iter().map(Device::from).collect())
    }

    /// Devices whose last inform is older than `since`.
    pub async fn inactive_devices(&self, since: DateTime<Utc>) -> Result<Vec<Device>, CoreError> {
        self.find_devices(&Query::new().before(LAST_INFORM, since))
            .await
    }

    /// Read parameter values from the stored device document.
    ///
    /// Only the requested paths are fetched. Every path appears in the
    /// result; missing ones map to `None`, as does every path when no
    /// device matches.
    pub async fn parameter_values(
        &self,
        device_id: &str,
        paths: &[&str],
    ) -> Result<ParameterValues, CoreError> {
        let records = self
            .inner
            .api
            .device_projection(device_id, paths)
            .await?;
        let device = records.into_iter().next().map(Device::from);
        debug!(device_id, found = device.is_some(), "parameter read");
        Ok(match device {
            Some(device) => device.extract(paths),
            None => paths.iter().map(|p| ((*p).to_owned(), None)).collect(),
        })
    }

    pub async fn delete_device(&self, device_id: &str) -> Result<(), CoreError> {
        self.inner.api.delete_device(device_id).await?;
        Ok(())
    }
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}
