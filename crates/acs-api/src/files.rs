// File endpoints
//
// Firmware images and configuration files served to devices through
// `download` tasks. Uploads are raw bodies; the metadata travels in
// headers.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::debug;

use crate::client::{NbiClient, Op, require};
use crate::error::Error;
use crate::models::{Collection, FileRecord, FileUpload};
use crate::query::Query;

fn header_value(header: &'static str, value: &str) -> Result<HeaderValue, Error> {
    HeaderValue::from_str(value).map_err(|_| Error::InvalidHeader {
        header,
        value: value.to_owned(),
    })
}

fn upload_headers(meta: &FileUpload) -> Result<HeaderMap, Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        HeaderName::from_static("filetype"),
        header_value("fileType", meta.file_type.as_ref())?,
    );
    headers.insert(HeaderName::from_static("oui"), header_value("oui", &meta.oui)?);
    headers.insert(
        HeaderName::from_static("productclass"),
        header_value("productClass", &meta.product_class)?,
    );
    headers.insert(
        HeaderName::from_static("version"),
        header_value("version", &meta.version)?,
    );
    Ok(headers)
}

impl NbiClient {
    /// Upload (or replace) a file.
    ///
    /// `PUT /files/{name}` with headers `fileType`, `oui`, `productClass`,
    /// `version`.
    pub async fn upload_file(
        &self,
        name: &str,
        content: impl Into<bytes::Bytes>,
        meta: &FileUpload,
    ) -> Result<(), Error> {
        require("file name", name)?;
        let headers = upload_headers(meta)?;
        let url = self.url(&[Collection::Files.as_ref(), name]);
        debug!(name, file_type = %meta.file_type, "uploading file");
        self.put_bytes(
            url,
            content.into(),
            headers,
            &Op::entry("upload file", Collection::Files, name),
        )
        .await
    }

    /// `GET /files/{name}`
    pub async fn get_file(&self, name: &str) -> Result<FileRecord, Error> {
        require("file name", name)?;
        let url = self.url(&[Collection::Files.as_ref(), name]);
        self.get(url, &Op::entry("get file", Collection::Files, name))
            .await
    }

    /// `GET /files/`
    pub async fn list_files(&self) -> Result<Vec<FileRecord>, Error> {
        let url = self.collection_url(Collection::Files);
        self.get(url, &Op::collection("list files", Collection::Files))
            .await
    }

    /// `GET /files/?query=...`
    pub async fn find_files(&self, query: &Query) -> Result<Vec<FileRecord>, Error> {
        self.search(Collection::Files, query, &[]).await
    }

    /// `DELETE /files/{name}`
    pub async fn delete_file(&self, name: &str) -> Result<(), Error> {
        require("file name", name)?;
        let url = self.url(&[Collection::Files.as_ref(), name]);
        debug!(name, "deleting file");
        self.delete(url, &Op::entry("delete file", Collection::Files, name))
            .await
    }
}
