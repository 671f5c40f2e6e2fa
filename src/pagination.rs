use crate::models::{CarRecord, ScrapeSummary};
use crate::pacing::Pacer;
use crate::scrapers::auto24;
use crate::scrapers::traits::Fetcher;
use crate::scrapers::types::ScrapeConfig;
use crate::storage::{CsvSink, WriteMode};
use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{info, warn};
use url::Url;

/// Query parameter auto24 uses as the result offset
pub const OFFSET_PARAM: &str = "ak";
/// Results per listing page
pub const PAGE_STEP: u64 = 100;

/// Where the scrape currently is
#[derive(Debug, Clone)]
pub struct PageCursor {
    /// Base URL with query and fragment removed
    base: Url,
    /// First non-blank value per key, in their original order; always holds `ak`
    params: Vec<(String, String)>,
    offset: u64,
    page: u32,
    max_pages: Option<u32>,
}

impl PageCursor {
    pub fn new(base_url: &str, start_page: u32, max_pages: Option<u32>) -> Result<Self> {
        let mut base =
            Url::parse(base_url).with_context(|| format!("Invalid base URL: {base_url}"))?;

        let mut params: Vec<(String, String)> = Vec::new();
        for (key, value) in base.query_pairs() {
            if value.is_empty() {
                continue;
            }
            if !params.iter().any(|(seen, _)| *seen == key) {
                params.push((key.into_owned(), value.into_owned()));
            }
        }
        base.set_query(None);
        base.set_fragment(None);

        let mut offset: u64 = match params.iter().find(|(key, _)| key == OFFSET_PARAM) {
            Some((_, value)) => value
                .parse()
                .with_context(|| format!("Offset `{OFFSET_PARAM}={value}` is not a number"))?,
            None => {
                params.push((OFFSET_PARAM.to_string(), "0".to_string()));
                0
            }
        };
        if start_page > 0 {
            offset = u64::from(start_page) * PAGE_STEP;
        }

        Ok(Self {
            base,
            params,
            offset,
            page: 0,
            max_pages,
        })
    }

    /// Listing URL for the current offset
    pub fn page_url(&self) -> String {
        let mut url = self.base.clone();
        let offset = self.offset.to_string();
        url.query_pairs_mut().extend_pairs(self.params.iter().map(|(key, value)| {
            if key == OFFSET_PARAM {
                (key.as_str(), offset.as_str())
            } else {
                (key.as_str(), value.as_str())
            }
        }));
        url.to_string()
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Pages completed so far
    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit_reached(&self) -> bool {
        self.max_pages.is_some_and(|max| self.page >= max)
    }

    pub fn advance(&mut self) {
        self.offset += PAGE_STEP;
        self.page += 1;
    }
}

/// Walks listing pages, scrapes every car on them and flushes one batch per page
pub struct PaginationDriver<'a> {
    fetcher: &'a dyn Fetcher,
    pacer: &'a dyn Pacer,
    sink: &'a CsvSink,
    config: &'a ScrapeConfig,
}

impl<'a> PaginationDriver<'a> {
    pub fn new(
        fetcher: &'a dyn Fetcher,
        pacer: &'a dyn Pacer,
        sink: &'a CsvSink,
        config: &'a ScrapeConfig,
    ) -> Self {
        Self {
            fetcher,
            pacer,
            sink,
            config,
        }
    }

    /// Run until a page has no listings or the page limit is hit
    pub async fn run(&self, mut cursor: PageCursor) -> ScrapeSummary {
        let started_at = Utc::now();
        let mut total_cars = 0;
        let mut created = false;

        info!("Starting scrape from: {} (via {})", self.config.base_url, self.fetcher.name());

        loop {
            if cursor.limit_reached() {
                info!("Reached maximum page limit ({})", cursor.page());
                break;
            }

            let page_no = cursor.page() + 1;
            let current_url = cursor.page_url();

            info!("{}", "=".repeat(60));
            info!("PAGE {} - {}={}", page_no, OFFSET_PARAM, cursor.offset());
            info!("{}", "=".repeat(60));
            info!("Fetching listings from: {}", current_url);

            let car_links =
                auto24::listing_urls(self.fetcher, &current_url, &self.config.site_origin).await;

            if car_links.is_empty() {
                info!("No car listings found on page {}. Stopping.", page_no);
                break;
            }

            info!("Found {} car listings on this page", car_links.len());

            let batch = self.scrape_page(page_no, &car_links).await;

            if batch.is_empty() {
                warn!("Page {} produced no records", page_no);
            } else {
                let mode = if created {
                    WriteMode::Append
                } else {
                    WriteMode::Create
                };
                if self.sink.persist(&batch, mode) {
                    created = true;
                    total_cars += batch.len();
                    info!("✓ Total cars scraped so far: {}", total_cars);
                }
            }

            cursor.advance();

            let delay = self.pacer.pause(self.config.page_delay).await;
            info!("Waited {:.1} seconds before fetching next page", delay.as_secs_f64());
        }

        ScrapeSummary {
            pages: cursor.page(),
            cars: total_cars,
            output: created.then(|| self.sink.path().to_path_buf()),
            started_at,
            finished_at: Utc::now(),
        }
    }

    async fn scrape_page(&self, page_no: u32, car_links: &[String]) -> Vec<CarRecord> {
        let mut batch = Vec::with_capacity(car_links.len());

        for (idx, car_url) in car_links.iter().enumerate() {
            info!(
                "[Page {} - {}/{}] Processing: {}",
                page_no,
                idx + 1,
                car_links.len(),
                car_url
            );

            if let Some(record) = auto24::scrape_car(self.fetcher, car_url).await {
                batch.push(record);
            }

            let delay = self.pacer.pause(self.config.detail_delay).await;
            info!("Waited {:.1} seconds before next request", delay.as_secs_f64());
        }

        batch
    }
}
