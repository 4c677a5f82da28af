//! Snapshot source backed by an HTTP deployment.
//!
//! Static snapshots and the manifest are served from a data root
//! (e.g. `https://example.github.io/digest/data/`), the live endpoint from an
//! API root (e.g. `http://localhost:5000/`, serving `/api/{category}`).
//!
//! A `404` maps to [`ResolveError::NotFound`]; any other non-success status
//! is a network failure.

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

use super::{SnapshotSource, check_category, check_filename, parse_body};
use crate::error::{ResolveError, Result};
use crate::models::{Manifest, Snapshot};

/// Configuration for [`HttpSource`].
#[derive(Debug, Clone)]
pub struct HttpSourceConfig {
    /// Root the live `api/{category}` path is joined onto.
    pub api_base: Url,
    /// Root the manifest and snapshot filenames are joined onto.
    pub data_base: Url,
    /// Manifest filename under `data_base`.
    pub manifest_name: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl HttpSourceConfig {
    pub fn new(api_base: Url, data_base: Url) -> Self {
        Self {
            api_base: as_directory(api_base),
            data_base: as_directory(data_base),
            manifest_name: "index.json".to_string(),
            request_timeout: Duration::from_secs(5),
            user_agent: format!("news_digest/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Parse a base URL so relative paths join beneath it rather than replacing
/// its last segment.
pub fn base_url(raw: &str) -> Result<Url> {
    Ok(as_directory(Url::parse(raw)?))
}

fn as_directory(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    config: HttpSourceConfig,
}

impl HttpSource {
    pub fn new(config: HttpSourceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(&config.user_agent)
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &HttpSourceConfig {
        &self.config
    }

    fn live_url(&self, category: &str) -> Result<Url> {
        check_category(category)?;
        Ok(self.config.api_base.join(&format!("api/{category}"))?)
    }

    fn data_url(&self, filename: &str) -> Result<Url> {
        check_filename(filename)?;
        Ok(self.config.data_base.join(filename)?)
    }

    #[instrument(level = "debug", skip_all, fields(%url))]
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            if e.is_timeout() {
                ResolveError::Timeout(self.config.request_timeout)
            } else {
                ResolveError::Http(e)
            }
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ResolveError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            return Err(ResolveError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        debug!(bytes = body.len(), "Downloaded body");
        parse_body(&body, url.as_str())
    }
}

impl SnapshotSource for HttpSource {
    async fn fetch_live(&self, category: &str) -> Result<Snapshot> {
        let url = self.live_url(category)?;
        self.get_json(url).await
    }

    async fn fetch_manifest(&self) -> Result<Manifest> {
        let url = self.data_url(&self.config.manifest_name)?;
        self.get_json(url).await
    }

    async fn fetch_snapshot(&self, filename: &str) -> Result<Snapshot> {
        let url = self.data_url(filename)?;
        self.get_json(url).await
    }
}
