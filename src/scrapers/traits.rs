use anyhow::Result;
use async_trait::async_trait;
use std::borrow::Cow;

/// Raw response for one URL
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: String,
    pub status: u16,
    pub body: Vec<u8>,
}

impl FetchedPage {
    pub fn new(url: impl Into<String>, status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            url: url.into(),
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body decoded as UTF-8; invalid sequences become U+FFFD
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Page source shared by the listing walker and the record assembler.
///
/// Implementations must get past the site's bot checks; tests plug in a
/// canned map of pages.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch one URL. Transport errors are `Err`; HTTP error statuses are not.
    async fn fetch(&self, url: &str) -> Result<FetchedPage>;

    /// Short name for log lines
    fn name(&self) -> &'static str;
}

#[cfg(test)]
pub(crate) mod stub {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory fetcher; unknown URLs fail like a dropped connection
    #[derive(Default)]
    pub struct StubFetcher {
        pages: HashMap<String, FetchedPage>,
        pub requested: Mutex<Vec<String>>,
    }

    impl StubFetcher {
        pub fn page(mut self, url: &str, status: u16, body: &str) -> Self {
            self.pages
                .insert(url.to_string(), FetchedPage::new(url, status, body));
            self
        }

        pub fn requested(&self) -> Vec<String> {
            self.requested.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Fetcher for StubFetcher {
        async fn fetch(&self, url: &str) -> Result<FetchedPage> {
            self.requested.lock().unwrap().push(url.to_string());
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("connection refused: {url}"))
        }

        fn name(&self) -> &'static str {
            "stub"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_is_2xx_only() {
        assert!(FetchedPage::new("u", 200, "").is_success());
        assert!(FetchedPage::new("u", 204, "").is_success());
        assert!(!FetchedPage::new("u", 403, "").is_success());
        assert!(!FetchedPage::new("u", 503, "").is_success());
    }

    #[test]
    fn text_is_lossy() {
        let page = FetchedPage::new("u", 200, vec![b'o', b'k', 0xff]);
        assert_eq!(page.text(), "ok\u{fffd}");
    }
}
