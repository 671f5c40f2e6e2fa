use anyhow::{Context, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Saved auto24 search the scraper was first written for
pub const DEFAULT_BASE_URL: &str =
    "https://www.auto24.ee/kasutatud/nimekiri.php?bn=2&a=101102&ae=2&af=100&by=2&ssid=247797544&ak=0";
pub const DEFAULT_SITE_ORIGIN: &str = "https://www.auto24.ee";
pub const DEFAULT_OUTPUT: &str = "auto24_cars_v2.csv";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Uniform pause window, in seconds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DelayRange {
    pub min_secs: f64,
    pub max_secs: f64,
}

impl DelayRange {
    pub const fn new(min_secs: f64, max_secs: f64) -> Self {
        Self { min_secs, max_secs }
    }

    /// Draw a duration; an empty or inverted window collapses to `min_secs`.
    /// Negative or unrepresentable draws become zero.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let width = self.max_secs - self.min_secs;
        let secs = if width.is_finite() && width > 0.0 {
            rng.gen_range(self.min_secs..self.max_secs)
        } else {
            self.min_secs
        };
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO)
    }
}

/// Run parameters for a listing scrape
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    /// Listing URL carrying the site's filter parameters
    pub base_url: String,
    /// Stop after this many pages (None = until a page comes back empty)
    pub max_pages: Option<u32>,
    /// Page to begin at; offset = start_page * 100
    pub start_page: u32,
    pub output: PathBuf,
    /// Prefix for the relative links found on listing pages
    pub site_origin: String,
    /// Pause after each detail page
    pub detail_delay: DelayRange,
    /// Pause after each listing page
    pub page_delay: DelayRange,
    pub user_agent: String,
    pub timeout_secs: u64,
    /// Extra wait after navigation when fetching through Chrome
    pub browser_settle_secs: u64,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            max_pages: None,
            start_page: 0,
            output: PathBuf::from(DEFAULT_OUTPUT),
            site_origin: DEFAULT_SITE_ORIGIN.to_string(),
            detail_delay: DelayRange::new(1.0, 2.5),
            page_delay: DelayRange::new(3.0, 8.0),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 30,
            browser_settle_secs: 2,
        }
    }
}

impl ScrapeConfig {
    /// Load from a JSON file; keys left out keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn samples_stay_in_window() {
        let mut rng = StdRng::seed_from_u64(7);
        let range = DelayRange::new(1.0, 2.5);
        for _ in 0..200 {
            let secs = range.sample(&mut rng).as_secs_f64();
            assert!((1.0..2.5).contains(&secs), "{secs}");
        }
    }

    #[test]
    fn degenerate_window_uses_min() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(DelayRange::new(0.0, 0.0).sample(&mut rng), Duration::ZERO);
        assert_eq!(
            DelayRange::new(3.0, 1.0).sample(&mut rng),
            Duration::from_secs(3)
        );
    }

    #[test]
    fn oversized_window_does_not_panic() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(DelayRange::new(1e20, 1e20).sample(&mut rng), Duration::ZERO);
        assert_eq!(DelayRange::new(1e300, 1e301).sample(&mut rng), Duration::ZERO);
        assert_eq!(DelayRange::new(-f64::MAX, f64::MAX).sample(&mut rng), Duration::ZERO);
        assert_eq!(DelayRange::new(-2.0, -1.0).sample(&mut rng), Duration::ZERO);
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scrape.json");
        std::fs::write(
            &path,
            r#"{ "max_pages": 3, "output": "out.csv", "page_delay": { "min_secs": 0.5, "max_secs": 1.0 } }"#,
        )
        .unwrap();

        let config = ScrapeConfig::from_file(&path).unwrap();
        assert_eq!(config.max_pages, Some(3));
        assert_eq!(config.output, PathBuf::from("out.csv"));
        assert_eq!(config.page_delay, DelayRange::new(0.5, 1.0));
        assert_eq!(config.detail_delay, DelayRange::new(1.0, 2.5));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.start_page, 0);
    }

    #[test]
    fn unreadable_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ScrapeConfig::from_file(&dir.path().join("missing.json")).is_err());
    }
}
