use anyhow::{Context, Result};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::Page;
use futures::StreamExt;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::config::ScraperConfig;

const MODAL_CLOSE: &str = ".leadinModal-close";
const LOAD_MORE: &str = ".Pagination__button";
const POLL_INTERVAL: Duration = Duration::from_millis(250);

pub struct SortedScraper {
    browser: Browser,
    config: ScraperConfig,
}

impl SortedScraper {
    pub async fn new(config: ScraperConfig) -> Result<Self> {
        info!("Initializing browser");

        let mut builder = BrowserConfig::builder();
        if !config.headless {
            builder = builder.with_head();
        }
        builder = builder.window_size(config.window_width, config.window_height);
        builder = builder.viewport(None);

        let browser_config = builder
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build browser config: {}", e))?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .context("Failed to launch browser")?;

        tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if let Err(e) = h {
                    error!("Browser handler error: {:?}", e);
                }
            }
        });

        Ok(Self { browser, config })
    }

    /// Loads the listing, expands every page of results and returns the markup.
    pub async fn fetch_listing(&self) -> Result<String> {
        info!("Navigating to fund listing: {}", self.config.url);
        let page = self
            .browser
            .new_page(self.config.url.as_str())
            .await
            .context("Failed to open fund listing")?;
        page.wait_for_navigation().await?;

        self.dismiss_modal(&page).await?;

        let clicks = self.load_all_funds(&page).await;
        info!("Finished scraping after {} load-more clicks", clicks);

        let html = page.content().await.context("Failed to read page markup")?;
        if let Err(e) = page.close().await {
            warn!("Failed to close listing page: {}", e);
        }
        Ok(html)
    }

    /// Closes the signup modal if one appears. Returns whether it was there.
    async fn dismiss_modal(&self, page: &Page) -> Result<bool> {
        match self.find_element(page, MODAL_CLOSE).await {
            Some(button) => {
                button.click().await.context("Failed to close modal")?;
                info!("Closed modal");
                Ok(true)
            }
            None => {
                warn!("No modal to close");
                Ok(false)
            }
        }
    }

    async fn load_all_funds(&self, page: &Page) -> usize {
        let mut clicks = 0;

        while let Some(button) = self.find_element(page, LOAD_MORE).await {
            if clicks >= self.config.max_pages {
                warn!(
                    "Reached maximum of {} load-more clicks, stopping pagination",
                    self.config.max_pages
                );
                break;
            }
            if let Err(e) = button.click().await {
                warn!("Load-more button could not be clicked: {}", e);
                break;
            }
            clicks += 1;
            debug!("Loaded page {}", clicks + 1);
            tokio::time::sleep(self.config.pagination_delay).await;
        }

        clicks
    }

    /// Polls for `selector` until it appears or `element_wait` elapses.
    async fn find_element(&self, page: &Page, selector: &str) -> Option<Element> {
        let deadline = Instant::now() + self.config.element_wait;
        loop {
            match page.find_element(selector).await {
                Ok(element) => return Some(element),
                Err(e) if Instant::now() >= deadline => {
                    debug!("{} not found: {}", selector, e);
                    return None;
                }
                Err(_) => tokio::time::sleep(POLL_INTERVAL).await,
            }
        }
    }

    pub async fn close(mut self) -> Result<()> {
        self.browser.close().await?;
        Ok(())
    }
}
