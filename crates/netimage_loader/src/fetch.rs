use std::time::Duration;

use anyhow::anyhow;
use bytes::Bytes;
use url::Url;

/// Network fetch capability. One GET per call; redirects, headers and
/// connection reuse are the implementation's business.
pub trait Fetch: Send + Sync + 'static {
    fn fetch(&self, url: &Url) -> anyhow::Result<Bytes>;
}

#[derive(Clone, Debug)]
pub struct FetchOptions {
    pub request_timeout: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Default fetcher backed by a blocking HTTP client.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
    options: FetchOptions,
}

impl HttpFetcher {
    /// # Panics
    ///
    /// Panics if the `reqwest` client builder fails to build.
    #[must_use]
    pub fn new(options: FetchOptions) -> Self {
        let client = reqwest::blocking::Client::builder()
            .build()
            .expect("Failed to build http client");
        Self { client, options }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(FetchOptions::default())
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &Url) -> anyhow::Result<Bytes> {
        let response = self
            .client
            .get(url.clone())
            .timeout(self.options.request_timeout)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("GET {} returned status {}", url, status));
        }

        Ok(response.bytes()?)
    }
}
