// Device tag endpoints

use tracing::debug;

use crate::client::{NbiClient, Op, require};
use crate::error::Error;
use crate::models::Collection;

impl NbiClient {
    /// `POST /devices/{id}/tags/{tag}`
    pub async fn assign_tag(&self, device_id: &str, tag: &str) -> Result<(), Error> {
        require("device id", device_id)?;
        require("tag", tag)?;
        let url = self.url(&[Collection::Devices.as_ref(), device_id, "tags", tag]);
        debug!(device_id, tag, "assigning tag");
        self.post_empty(url, &Op::entry("assign tag", Collection::Devices, device_id))
            .await
    }

    /// `DELETE /devices/{id}/tags/{tag}`
    pub async fn remove_tag(&self, device_id: &str, tag: &str) -> Result<(), Error> {
        require("device id", device_id)?;
        require("tag", tag)?;
        let url = self.url(&[Collection::Devices.as_ref(), device_id, "tags", tag]);
        debug!(device_id, tag, "removing tag");
        self.delete(url, &Op::entry("remove tag", Collection::Devices, device_id))
            .await
    }
}
