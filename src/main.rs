mod extract;
mod models;
mod pacing;
mod pagination;
mod scrapers;
mod storage;

use clap::Parser;
use pacing::{JitterPacer, NoPause, Pacer};
use pagination::{PageCursor, PaginationDriver};
use scrapers::{BrowserFetcher, Fetcher, HttpFetcher, ScrapeConfig};
use std::path::PathBuf;
use storage::CsvSink;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "car-scout", about = "Scrape auto24.ee used-car listings into CSV")]
struct Cli {
    /// Listing URL with the search filters applied (defaults to the saved search)
    url: Option<String>,

    /// Stop after this many listing pages
    #[arg(short = 'n', long)]
    max_pages: Option<u32>,

    /// Listing page to start from (offset = page * 100)
    #[arg(short, long)]
    start_page: Option<u32>,

    /// CSV file to write
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON file with scrape settings; flags win over it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Fetch pages through headless Chrome instead of plain HTTP
    #[arg(long)]
    browser: bool,

    /// Skip the pauses between requests
    #[arg(long)]
    no_delay: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn into_config(self) -> anyhow::Result<ScrapeConfig> {
        let mut config = match &self.config {
            Some(path) => ScrapeConfig::from_file(path)?,
            None => ScrapeConfig::default(),
        };

        if let Some(url) = self.url {
            config.base_url = url;
        }
        if self.max_pages.is_some() {
            config.max_pages = self.max_pages;
        }
        if let Some(start_page) = self.start_page {
            config.start_page = start_page;
        }
        if let Some(output) = self.output {
            config.output = output;
        }

        Ok(config)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()),
        )
        .init();

    let use_browser = cli.browser;
    let no_delay = cli.no_delay;
    let config = cli.into_config()?;

    info!("🚗 Car Scout - auto24 listing scraper");

    let cursor = PageCursor::new(&config.base_url, config.start_page, config.max_pages)?;

    let fetcher: Box<dyn Fetcher> = if use_browser {
        Box::new(BrowserFetcher::new(&config)?)
    } else {
        Box::new(HttpFetcher::new(&config)?)
    };
    let pacer: Box<dyn Pacer> = if no_delay {
        Box::new(NoPause)
    } else {
        Box::new(JitterPacer)
    };
    let sink = CsvSink::new(&config.output);

    let summary = PaginationDriver::new(fetcher.as_ref(), pacer.as_ref(), &sink, &config)
        .run(cursor)
        .await;

    let elapsed = summary.finished_at - summary.started_at;
    println!();
    println!("{}", "=".repeat(60));
    println!("SCRAPING COMPLETE");
    println!("{}", "=".repeat(60));
    println!("Total pages scraped: {}", summary.pages);
    println!("Total cars scraped: {}", summary.cars);
    if let Some(path) = &summary.output {
        println!("Data saved to: {}", path.display());
    }
    println!("Elapsed: {}s", elapsed.num_seconds());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::parse_from([
            "car-scout",
            "https://www.auto24.ee/kasutatud/nimekiri.php?bn=2",
            "-n",
            "5",
            "--start-page",
            "2",
            "-o",
            "cars.csv",
        ]);
        let config = cli.into_config().unwrap();

        assert_eq!(config.base_url, "https://www.auto24.ee/kasutatud/nimekiri.php?bn=2");
        assert_eq!(config.max_pages, Some(5));
        assert_eq!(config.start_page, 2);
        assert_eq!(config.output, PathBuf::from("cars.csv"));
    }

    #[test]
    fn flags_win_over_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scrape.json");
        std::fs::write(&path, r#"{ "base_url": "https://h/p?ak=0", "max_pages": 9, "start_page": 4 }"#)
            .unwrap();

        let cli = Cli::parse_from(["car-scout", "-c", path.to_str().unwrap(), "-n", "1"]);
        let config = cli.into_config().unwrap();

        assert_eq!(config.base_url, "https://h/p?ak=0");
        assert_eq!(config.max_pages, Some(1));
        assert_eq!(config.start_page, 4);
    }

    #[test]
    fn no_arguments_means_saved_search() {
        let config = Cli::parse_from(["car-scout"]).into_config().unwrap();
        assert_eq!(config.base_url, scrapers::types::DEFAULT_BASE_URL);
        assert_eq!(config.max_pages, None);
    }
}
