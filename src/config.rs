use std::time::Duration;

pub const DEFAULT_LISTING_URL: &str = "https://smartinvestor.sorted.org.nz/kiwisaver-and-managed-funds/\
?fundTypes=all-fund-types&managedFundTypes=kiwisaver&sort=growth-assets-asc";

/// Browser settings for fetching the fund listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ScraperConfig {
    pub url: String,
    pub headless: bool,
    /// How long to keep looking for the modal close and "load more" controls.
    pub element_wait: Duration,
    /// Pause after each "load more" click while new tiles render.
    pub pagination_delay: Duration,
    /// Upper bound on "load more" clicks.
    pub max_pages: usize,
    pub window_width: u32,
    pub window_height: u32,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_LISTING_URL.to_string(),
            headless: true,
            element_wait: Duration::from_secs(20),
            pagination_delay: Duration::from_secs(5),
            max_pages: 100,
            window_width: 1920,
            window_height: 1080,
        }
    }
}
