use crate::scrapers::traits::{FetchedPage, Fetcher};
use crate::scrapers::types::ScrapeConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Fetcher backed by headless Chrome, for when plain HTTP gets the bot wall
pub struct BrowserFetcher {
    browser: Browser,
    settle: Duration,
}

impl BrowserFetcher {
    /// Launch Chrome
    pub fn new(config: &ScrapeConfig) -> Result<Self> {
        info!("Launching headless Chrome...");

        let options = LaunchOptions::default_builder()
            .headless(true)
            .build()
            .context("Failed to build launch options")?;

        let browser = Browser::new(options).context("Failed to launch Chrome browser")?;

        Ok(Self {
            browser,
            settle: Duration::from_secs(config.browser_settle_secs),
        })
    }

    fn render(browser: &Browser, url: &str, settle: Duration) -> Result<String> {
        let tab = browser.new_tab()?;

        tab.navigate_to(url)?;
        tab.wait_until_navigated()?;

        // Let challenge scripts finish
        thread::sleep(settle);

        let html = tab
            .evaluate("document.documentElement.outerHTML", false)?
            .value
            .and_then(|value| value.as_str().map(str::to_string))
            .unwrap_or_default();

        if let Err(e) = tab.close(true) {
            warn!("Failed to close tab: {}", e);
        }

        Ok(html)
    }
}

#[async_trait]
impl Fetcher for BrowserFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        debug!("Opening {} in Chrome", url);

        let browser = self.browser.clone();
        let settle = self.settle;
        let target = url.to_string();
        let html = tokio::task::spawn_blocking(move || Self::render(&browser, &target, settle))
            .await
            .context("Chrome worker panicked")?
            .with_context(|| format!("Failed to render {url}"))?;

        if html.is_empty() {
            warn!("Chrome returned an empty document for {}", url);
        }

        // CDP does not hand back the document status; a rendered page counts as OK
        Ok(FetchedPage::new(url, 200, html))
    }

    fn name(&self) -> &'static str {
        "chrome"
    }
}
