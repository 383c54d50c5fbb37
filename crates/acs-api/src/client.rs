// NBI HTTP client
//
// Wraps `reqwest::Client` with collection-aware URL construction and
// status handling. Endpoint groups (devices, tasks, tags, presets, files)
// are implemented as inherent methods in separate files so this module
// stays focused on transport mechanics.

use std::time::Duration;

use reqwest::header::HeaderMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::Collection;
use crate::query::Query;
use crate::transport::TransportConfig;

// ── Request context ──────────────────────────────────────────────────

/// What a request was trying to do. Carried into errors so a failure can
/// be diagnosed without re-running it.
#[derive(Debug, Clone)]
pub(crate) struct Op {
    name: &'static str,
    collection: Collection,
    id: Option<String>,
}

impl Op {
    /// Operation addressed at a single entry; a 404 means the entry is gone.
    pub(crate) fn entry(name: &'static str, collection: Collection, id: &str) -> Self {
        Self {
            name,
            collection,
            id: Some(id.to_owned()),
        }
    }

    /// Operation against a whole collection.
    pub(crate) fn collection(name: &'static str, collection: Collection) -> Self {
        Self {
            name,
            collection,
            id: None,
        }
    }

    fn target(&self) -> String {
        self.id
            .clone()
            .unwrap_or_else(|| self.collection.to_string())
    }
}

/// Reject empty identifiers before anything goes on the wire.
pub(crate) fn require(field: &'static str, value: &str) -> Result<(), Error> {
    if value.trim().is_empty() {
        Err(Error::EmptyIdentifier { field })
    } else {
        Ok(())
    }
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the northbound REST interface.
///
/// Stateless between calls: every method performs its request(s) and
/// returns. No caching, no background polling, no automatic retries.
pub struct NbiClient {
    http: reqwest::Client,
    base_url: Url,
    /// Transport timeout the `reqwest::Client` was built with, when known.
    timeout: Option<Duration>,
}

impl NbiClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a base URL (e.g. `http://acs.example.net:7557`) and
    /// transport settings.
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self {
            http,
            base_url,
            timeout: Some(transport.timeout),
        })
    }

    /// Wrap an existing `reqwest::Client` (caller manages TLS and timeouts).
    ///
    /// The client's own timeout bounds every request, connection-request
    /// submissions included. Use [`with_timeout`](Self::with_timeout) to
    /// declare it so those submissions get the backend's wait on top.
    pub fn with_client(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self {
            http,
            base_url,
            timeout: None,
        })
    }

    /// Declare the transport timeout of a client passed to
    /// [`with_client`](Self::with_client).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Strip query/fragment and make sure the path ends with `/` so
    /// collection segments append cleanly.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        if url.cannot_be_a_base() {
            return Err(Error::InvalidBaseUrl { url: raw.into() });
        }
        url.set_query(None);
        url.set_fragment(None);

        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    /// The backend base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Per-request transport timeout, if known.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Append percent-encoded path segments to the base URL.
    pub(crate) fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Checked in `normalize_base_url`: the base URL always has a path.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// `{base}/{collection}/` -- the search endpoint of a collection.
    pub(crate) fn collection_url(&self, collection: Collection) -> Url {
        self.url(&[collection.as_ref(), ""])
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    /// `GET {base}/{collection}/?query=...[&projection=...]`
    pub(crate) async fn search<T: DeserializeOwned>(
        &self,
        collection: Collection,
        query: &Query,
        projection: &[&str],
    ) -> Result<Vec<T>, Error> {
        let url = self.collection_url(collection);
        let mut params = vec![("query", query.to_string())];
        if !projection.is_empty() {
            params.push(("projection", projection.join(",")));
        }
        debug!("GET {url} params={params:?}");

        let resp = self.http.get(url).query(&params).send().await?;
        Self::handle_response(resp, &Op::collection("search", collection))
            .await
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url, op: &Op) -> Result<T, Error> {
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        Self::handle_response(resp, op).await
    }

    pub(crate) async fn post_empty(&self, url: Url, op: &Op) -> Result<(), Error> {
        debug!("POST {url}");

        let resp = self.http.post(url).send().await?;
        Self::handle_empty(resp, op).await
    }

    pub(crate) async fn put_json<B: Serialize + Sync>(
        &self,
        url: Url,
        body: &B,
        op: &Op,
    ) -> Result<(), Error> {
        debug!("PUT {url}");

        let resp = self.http.put(url).json(body).send().await?;
        Self::handle_empty(resp, op).await
    }

    pub(crate) async fn put_bytes(
        &self,
        url: Url,
        body: bytes::Bytes,
        headers: HeaderMap,
        op: &Op,
    ) -> Result<(), Error> {
        debug!("PUT {url} ({} bytes)", body.len());

        let resp = self.http.put(url).headers(headers).body(body).send().await?;
        Self::handle_empty(resp, op).await
    }

    pub(crate) async fn delete(&self, url: Url, op: &Op) -> Result<(), Error> {
        debug!("DELETE {url}");

        let resp = self.http.delete(url).send().await?;
        Self::handle_empty(resp, op).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        resp: reqwest::Response,
        op: &Op,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            decode(body)
        } else {
            Err(Self::parse_error(status, resp, op).await)
        }
    }

    async fn handle_empty(resp: reqwest::Response, op: &Op) -> Result<(), Error> {
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Self::parse_error(status, resp, op).await)
        }
    }

    async fn parse_error(
        status: reqwest::StatusCode,
        resp: reqwest::Response,
        op: &Op,
    ) -> Error {
        if status == reqwest::StatusCode::NOT_FOUND {
            if let Some(id) = &op.id {
                return Error::NotFound {
                    collection: op.collection,
                    id: id.clone(),
                };
            }
        }

        Error::Api {
            operation: op.name,
            target: op.target(),
            status: status.as_u16(),
            message: error_message(status, resp).await,
        }
    }
}

/// Decode a JSON body, keeping a preview of it in the error.
pub(crate) fn decode<T: DeserializeOwned>(body: String) -> Result<T, Error> {
    serde_json::from_str(&body).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body,
        }
    })
}

/// The backend answers errors with a plain-text reason; fall back to the
/// status line when the body is empty.
pub(crate) async fn error_message(status: reqwest::StatusCode, resp: reqwest::Response) -> String {
    let raw = resp.text().await.unwrap_or_default();
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        status.to_string()
    } else {
        trimmed.to_owned()
    }
}
