// Preset endpoints

use tracing::debug;

use crate::client::{NbiClient, Op, require};
use crate::error::Error;
use crate::models::{Collection, Preset};
use crate::query::Query;

impl NbiClient {
    /// Create or replace a preset.
    ///
    /// `PUT /presets/{name}`
    pub async fn put_preset(&self, name: &str, preset: &Preset) -> Result<(), Error> {
        require("preset name", name)?;
        let url = self.url(&[Collection::Presets.as_ref(), name]);
        debug!(name, weight = preset.weight, "writing preset");
        self.put_json(url, preset, &Op::entry("put preset", Collection::Presets, name))
            .await
    }

    /// `DELETE /presets/{name}`
    pub async fn delete_preset(&self, name: &str) -> Result<(), Error> {
        require("preset name", name)?;
        let url = self.url(&[Collection::Presets.as_ref(), name]);
        debug!(name, "deleting preset");
        self.delete(url, &Op::entry("delete preset", Collection::Presets, name))
            .await
    }

    /// `GET /presets/?query=...`
    pub async fn find_presets(&self, query: &Query) -> Result<Vec<Preset>, Error> {
        self.search(Collection::Presets, query, &[]).await
    }
}
