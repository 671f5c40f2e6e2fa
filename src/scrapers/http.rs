use crate::scrapers::traits::{FetchedPage, Fetcher};
use crate::scrapers::types::ScrapeConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Plain HTTP fetcher dressed up as desktop Chrome on Windows
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &ScrapeConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("et-EE,et;q=0.9,en-US;q=0.8,en;q=0.7"),
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .cookie_store(true)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {url}"))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .context("Failed to read response body")?;

        debug!("Downloaded {} bytes (status {})", body.len(), status);

        Ok(FetchedPage::new(url, status, body.to_vec()))
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
