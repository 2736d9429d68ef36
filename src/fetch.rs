//! Page fetching with a cache in front of the network.
//!
//! The [`Fetcher`] consults its [`PageCache`] first and only falls back to a
//! single GET through its [`Transport`] on a miss. There is no retry and no
//! freshness check: a cached page is returned as-is for as long as it exists.

use crate::cache::PageCache;
use crate::error::HarvestError;
use std::time::Instant;
use tracing::{info, instrument, warn};
use url::Url;

/// Browser identity sent with every request. Several front pages reject
/// requests without a realistic agent.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Status and body of one HTTP response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// The network boundary: one GET, no retries.
pub trait Transport {
    async fn get(&self, url: &str) -> Result<HttpResponse, HarvestError>;
}

/// [`Transport`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(user_agent: &str) -> Result<Self, HarvestError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| HarvestError::FetchFailed {
                url: String::new(),
                reason: format!("could not build HTTP client: {e}"),
            })?;
        Ok(Self { client })
    }
}

impl Transport for ReqwestTransport {
    #[instrument(level = "debug", skip_all, fields(%url))]
    async fn get(&self, url: &str) -> Result<HttpResponse, HarvestError> {
        let failed = |e: reqwest::Error| HarvestError::FetchFailed {
            url: url.to_string(),
            reason: e.to_string(),
        };
        let resp = self.client.get(url).send().await.map_err(failed)?;
        let status = resp.status().as_u16();
        let body = resp.bytes().await.map_err(failed)?.to_vec();
        Ok(HttpResponse { status, body })
    }
}

/// URL fetched for a scraped domain entry.
pub fn domain_url(domain: &str) -> String {
    format!("https://{domain}")
}

/// Hostname of `https://{domain}`, used as cache key and log label. Falls
/// back to the text before the first `/` when the URL does not parse.
pub fn domain_host(domain: &str) -> String {
    Url::parse(&domain_url(domain))
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| domain.split('/').next().unwrap_or(domain).to_string())
}

/// Cache-first page fetcher.
#[derive(Debug)]
pub struct Fetcher<C, T> {
    cache: C,
    transport: T,
}

impl<C, T> Fetcher<C, T>
where
    C: PageCache,
    T: Transport,
{
    pub fn new(cache: C, transport: T) -> Self {
        Self { cache, transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    #[cfg(test)]
    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Raw HTML of `https://{domain}`.
    ///
    /// # Errors
    ///
    /// [`HarvestError::FetchFailed`] on a non-200 status or transport error.
    /// Cache failures are logged and never returned.
    #[instrument(level = "info", skip_all, fields(%domain))]
    pub async fn fetch(&self, domain: &str) -> Result<Vec<u8>, HarvestError> {
        let key = domain_host(domain);

        match self.cache.get(&key).await {
            Ok(Some(bytes)) => {
                info!(%key, bytes = bytes.len(), "Using cached HTML content");
                return Ok(bytes);
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Cache read failed; treating as a miss"),
        }

        let url = domain_url(domain);
        info!(%url, "Downloading HTML content");
        let t0 = Instant::now();
        let resp = self.transport.get(&url).await?;

        if resp.status != 200 {
            return Err(HarvestError::FetchFailed {
                url,
                reason: format!("status code {}", resp.status),
            });
        }

        info!(
            bytes = resp.body.len(),
            elapsed = ?t0.elapsed(),
            "HTML content downloaded successfully"
        );

        if let Err(e) = self.cache.put(&key, &resp.body).await {
            warn!(error = %e, "Could not cache page; continuing uncached");
        }
        Ok(resp.body)
    }
}
