//! auto24.ee page handling: listing pages yield detail URLs, detail pages
//! yield one [`CarRecord`] each.

use crate::extract::{self, ExtractionError};
use crate::models::CarRecord;
use crate::scrapers::traits::Fetcher;
use scraper::{Html, Selector};
use tracing::{debug, info, warn};

/// Parse a listing page into absolute detail URLs, in page order
pub fn extract_listing_urls(html: &str, origin: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let (Ok(title_selector), Ok(link_selector)) =
        (Selector::parse("div.title"), Selector::parse("a.main"))
    else {
        warn!("Listing selectors failed to parse");
        return Vec::new();
    };

    document
        .select(&title_selector)
        .filter_map(|title| title.select(&link_selector).next())
        .filter_map(|link| link.value().attr("href"))
        .filter(|href| !href.is_empty())
        .map(|href| format!("{origin}{href}"))
        .collect()
}

/// Detail URLs linked from one listing page.
///
/// A failed fetch and a page without listings both come back empty; the
/// caller cannot tell them apart, only the log can.
pub async fn listing_urls(fetcher: &dyn Fetcher, url: &str, origin: &str) -> Vec<String> {
    let page = match fetcher.fetch(url).await {
        Ok(page) => page,
        Err(e) => {
            warn!("Error getting car links: {:#}", e);
            return Vec::new();
        }
    };

    if !page.is_success() {
        warn!("Listing page {} returned status {}", url, page.status);
        return Vec::new();
    }

    let links = extract_listing_urls(&page.text(), origin);
    if links.is_empty() {
        debug!("No listing titles in {} bytes from {}", page.body.len(), page.url);
    }
    links
}

fn field(url: &str, result: Result<String, ExtractionError>) -> Option<String> {
    match result {
        Ok(value) => Some(value),
        Err(e) if e.is_missing_container() => {
            debug!("{}: {}", url, e);
            None
        }
        Err(e) => {
            warn!("Error scraping {}: {}", url, e);
            None
        }
    }
}

/// Run every extractor; failures become empty fields, never a missing record
pub fn assemble_record(document: &Html, url: &str) -> CarRecord {
    CarRecord {
        url: url.to_string(),
        brand: field(url, extract::extract_brand(document)),
        first_reg: field(url, extract::extract_first_reg(document)),
        kind: field(url, extract::extract_type(document)),
        body_type: field(url, extract::extract_body_type(document)),
        engine: field(url, extract::extract_engine(document)),
        fuel: field(url, extract::extract_fuel(document)),
        mileage: field(url, extract::extract_mileage(document)),
        drive_type: field(url, extract::extract_drive_type(document)),
        gearbox: field(url, extract::extract_gearbox(document)),
        color: field(url, extract::extract_color(document)),
        price: field(url, extract::extract_price(document)),
    }
}

/// Fetch one detail page and build its record; `None` only when the fetch fails
pub async fn scrape_car(fetcher: &dyn Fetcher, url: &str) -> Option<CarRecord> {
    let page = match fetcher.fetch(url).await {
        Ok(page) => page,
        Err(e) => {
            warn!("Error scraping {}: {:#}", url, e);
            return None;
        }
    };

    if !page.is_success() {
        warn!("Error scraping {}: status {}", url, page.status);
        return None;
    }

    info!("=== Scraping: {} ===", url);
    let record = assemble_record(&Html::parse_document(&page.text()), url);

    for (name, value) in record.fields().into_iter().skip(1) {
        info!("{}: {}", name, value.unwrap_or("None"));
    }

    Some(record)
}
