// ── Provisioning administration ──
//
// Tags, presets and files. Thin passthroughs to the NBI with errors
// lifted into `CoreError`.

use bytes::Bytes;
use tracing::info;

use acs_api::{FileRecord, FileUpload, Preset, Query};

use crate::client::AcsClient;
use crate::error::CoreError;

impl AcsClient {
    // ── Tags ─────────────────────────────────────────────────────

    pub async fn assign_tag(&self, device_id: &str, tag: &str) -> Result<(), CoreError> {
        self.api().assign_tag(device_id, tag).await?;
        Ok(())
    }

    pub async fn remove_tag(&self, device_id: &str, tag: &str) -> Result<(), CoreError> {
        self.api().remove_tag(device_id, tag).await?;
        Ok(())
    }

    // ── Presets ──────────────────────────────────────────────────

    /// Create or replace a preset.
    pub async fn put_preset(&self, name: &str, preset: &Preset) -> Result<(), CoreError> {
        self.api().put_preset(name, preset).await?;
        info!(name, weight = preset.weight, "preset stored");
        Ok(())
    }

    pub async fn delete_preset(&self, name: &str) -> Result<(), CoreError> {
        self.api().delete_preset(name).await?;
        Ok(())
    }

    pub async fn list_presets(&self) -> Result<Vec<Preset>, CoreError> {
        Ok(self.api().find_presets(&Query::all()).await?)
    }

    // ── Files ────────────────────────────────────────────────────

    pub async fn upload_file(
        &self,
        name: &str,
        content: impl Into<Bytes>,
        meta: &FileUpload,
    ) -> Result<(), CoreError> {
        let content = content.into();
        let size = content.len();
        self.api().upload_file(name, content, meta).await?;
        info!(name, size, "file uploaded");
        Ok(())
    }

    pub async fn file(&self, name: &str) -> Result<FileRecord, CoreError> {
        Ok(self.api().get_file(name).await?)
    }

    pub async fn list_files(&self) -> Result<Vec<FileRecord>, CoreError> {
        Ok(self.api().list_files().await?)
    }

    pub async fn delete_file(&self, name: &str) -> Result<(), CoreError> {
        self.api().delete_file(name).await?;
        Ok(())
    }
}
