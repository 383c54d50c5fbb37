// Device endpoints
//
// Read and delete against the `devices` collection. Devices are created
// by the backend when they inform; this client never creates them.

use tracing::debug;

use crate::client::{NbiClient, Op, require};
use crate::error::Error;
use crate::models::{Collection, DeviceRecord};
use crate::query::Query;

impl NbiClient {
    /// Devices whose `_id` equals `device_id`.
    ///
    /// The search endpoint always answers with a list, so zero or more
    /// records come back. Anything the backend returns that does not carry
    /// exactly the requested id is dropped.
    pub async fn devices_by_id(&self, device_id: &str) -> Result<Vec<DeviceRecord>, Error> {
        self.device_projection(device_id, &[]).await
    }

    /// Like [`devices_by_id`](Self::devices_by_id), restricted to the given
    /// parameter paths (`projection=a,b,c`).
    pub async fn device_projection(
        &self,
        device_id: &str,
        projection: &[&str],
    ) -> Result<Vec<DeviceRecord>, Error> {
        require("device id", device_id)?;
        let mut devices = self
            .find_devices_projected(&Query::by_id(device_id), projection)
            .await?;
        devices.retain(|d| d.id == device_id);
        Ok(devices)
    }

    /// All devices matching `query`. The empty query matches every device.
    ///
    /// `GET /devices/?query=...`
    pub async fn find_devices(&self, query: &Query) -> Result<Vec<DeviceRecord>, Error> {
        self.find_devices_projected(query, &[]).await
    }

    pub async fn find_devices_projected(
        &self,
        query: &Query,
        projection: &[&str],
    ) -> Result<Vec<DeviceRecord>, Error> {
        debug!(%query, ?projection, "searching devices");
        self.search(Collection::Devices, query, projection).await
    }

    /// Every registered device.
    pub async fn list_devices(&self) -> Result<Vec<DeviceRecord>, Error> {
        self.find_devices(&Query::all()).await
    }

    /// Remove a device record. Irreversible from the client's side; the
    /// device reappears only when it informs again.
    ///
    /// `DELETE /devices/{id}`
    pub async fn delete_device(&self, device_id: &str) -> Result<(), Error> {
        require("device id", device_id)?;
        let url = self.url(&[Collection::Devices.as_ref(), device_id]);
        debug!(device_id, "deleting device");
        self.delete(url, &Op::entry("delete device", Collection::Devices, device_id))
            .await
    }
}
