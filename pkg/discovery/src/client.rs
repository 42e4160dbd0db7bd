use anyhow::{Context, bail};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Transport knobs for talking to the API server.
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    /// Per-request timeout; `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Accept self-signed or otherwise invalid TLS certificates.
    pub insecure: bool,
}

/// Read-only JSON client for a Kubernetes-compatible API endpoint.
#[derive(Debug, Clone)]
pub struct ClusterClient {
    http: reqwest::Client,
    base_url: String,
}

impl ClusterClient {
    pub fn new(base_url: &str, options: &ClientOptions) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder().danger_accept_invalid_certs(options.insecure);
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            base_url: trim_base_url(base_url),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET `path` and decode the JSON body. Any non-2xx status is an error.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> anyhow::Result<T> {
        match self.fetch(path, false).await? {
            Some(value) => Ok(value),
            None => bail!("GET {} returned no body", self.url(path)),
        }
    }

    /// Like [`get_json`](Self::get_json), but a 404 yields `None`.
    /// Used for optional API extensions that may not be installed.
    pub async fn get_json_optional<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> anyhow::Result<Option<T>> {
        self.fetch(path, true).await
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        path: &str,
        not_found_ok: bool,
    ) -> anyhow::Result<Option<T>> {
        let url = self.url(path);
        debug!("GET {}", url);
        let resp = self
            .http
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?;

        let status = resp.status();
        if not_found_ok && status == StatusCode::NOT_FOUND {
            debug!("GET {}: 404, treating as absent", url);
            return Ok(None);
        }
        if !status.is_success() {
            bail!(
                "GET {} failed: {} {}",
                url,
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown Status")
            );
        }

        let value = resp
            .json::<T>()
            .await
            .with_context(|| format!("GET {}: invalid response body", url))?;
        Ok(Some(value))
    }
}

/// Strip trailing slashes and surrounding whitespace from a base URL.
pub fn trim_base_url(base_url: &str) -> String {
    base_url.trim().trim_end_matches('/').to_string()
}
