//! Page fetcher implementation
//!
//! This module retrieves page bodies for the crawler. The retrieval strategy
//! is chosen once from configuration and fixed for the whole run:
//! - `Static`: a plain HTTP GET through a shared `reqwest::Client`
//! - `Rendered`: a headless browser render that waits for navigation to settle
//!
//! No retries happen here. Callers decide what a failure means.

use crate::config::{Config, FetchStrategy, UserAgentConfig};
use crate::ConfigError;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Failure to retrieve a page
#[derive(Debug, Error)]
pub enum FetchError {
    /// Timeouts, refused connections, interrupted bodies
    #[error("transient failure fetching {url}: {message}")]
    Transient { url: String, message: String },

    /// Non-2xx responses and anything else retrying will not fix
    #[error("permanent failure fetching {url}: {message}")]
    Permanent {
        url: String,
        status: Option<u16>,
        message: String,
    },
}

impl FetchError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }
}

/// A successfully retrieved page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL after redirects; relative links resolve against this
    pub final_url: Url,
    pub body: String,
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use catalog_harvest::config::UserAgentConfig;
/// use catalog_harvest::crawler::build_http_client;
/// use std::time::Duration;
///
/// let config = UserAgentConfig {
///     crawler_name: "CatalogHarvest".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config, Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Plain HTTP GET strategy
#[derive(Debug, Clone)]
pub struct StaticFetcher {
    client: Client,
}

impl StaticFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Fetches a URL, mapping every failure onto `FetchError`
    ///
    /// | Condition | Error |
    /// |-----------|-------|
    /// | Timeout | Transient |
    /// | Connection refused | Transient |
    /// | Body read interrupted | Transient |
    /// | Non-2xx status | Permanent |
    /// | Redirect loop or other | Permanent |
    pub async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify_reqwest_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Permanent {
                url: url.to_string(),
                status: Some(status.as_u16()),
                message: format!("HTTP {}", status),
            });
        }

        let final_url = response.url().clone();
        let body = response
            .text()
            .await
            .map_err(|e| classify_reqwest_error(url, e))?;

        debug!("Fetched {} ({} bytes)", final_url, body.len());

        Ok(FetchedPage { final_url, body })
    }
}

fn classify_reqwest_error(url: &Url, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Transient {
            url: url.to_string(),
            message: "Request timeout".to_string(),
        }
    } else if error.is_connect() {
        FetchError::Transient {
            url: url.to_string(),
            message: "Connection refused".to_string(),
        }
    } else if error.is_body() || error.is_decode() {
        FetchError::Transient {
            url: url.to_string(),
            message: error.to_string(),
        }
    } else {
        FetchError::Permanent {
            url: url.to_string(),
            status: error.status().map(|s| s.as_u16()),
            message: error.to_string(),
        }
    }
}

#[cfg(feature = "render")]
pub use rendered::RenderedFetcher;

#[cfg(feature = "render")]
mod rendered {
    use super::{FetchError, FetchedPage};
    use chromiumoxide::browser::{Browser, BrowserConfig};
    use chromiumoxide::Page;
    use futures::StreamExt;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Mutex;
    use tracing::{debug, warn};
    use url::Url;

    /// Headless browser strategy
    ///
    /// The browser is launched lazily on first use and reused for the run.
    pub struct RenderedFetcher {
        browser: Mutex<Option<Arc<Browser>>>,
        user_agent: String,
        timeout: Duration,
    }

    impl RenderedFetcher {
        pub fn new(user_agent: String, timeout: Duration) -> Self {
            Self {
                browser: Mutex::new(None),
                user_agent,
                timeout,
            }
        }

        async fn get_or_launch(&self, url: &Url) -> Result<Arc<Browser>, FetchError> {
            let mut guard = self.browser.lock().await;
            if let Some(ref browser) = *guard {
                return Ok(Arc::clone(browser));
            }

            let browser_config = BrowserConfig::builder()
                .arg("--no-sandbox")
                .arg("--disable-gpu")
                .arg("--disable-dev-shm-usage")
                .arg(format!("--user-agent={}", self.user_agent))
                .build()
                .map_err(|e| FetchError::Permanent {
                    url: url.to_string(),
                    status: None,
                    message: format!("Browser config error: {}", e),
                })?;

            let (browser, mut handler) =
                Browser::launch(browser_config)
                    .await
                    .map_err(|e| FetchError::Permanent {
                        url: url.to_string(),
                        status: None,
                        message: format!("Browser launch failed: {}", e),
                    })?;

            tokio::spawn(async move { while handler.next().await.is_some() {} });

            let shared = Arc::new(browser);
            *guard = Some(Arc::clone(&shared));
            Ok(shared)
        }

        pub async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
            let browser = self.get_or_launch(url).await?;
            let page = tokio::time::timeout(self.timeout, browser.new_page(url.as_str()))
                .await
                .map_err(|_| FetchError::Transient {
                    url: url.to_string(),
                    message: "Render timeout".to_string(),
                })?
                .map_err(|e| FetchError::Transient {
                    url: url.to_string(),
                    message: format!("Failed to open page: {}", e),
                })?;

            let result = self.read_page(&page, url).await;

            if let Err(e) = page.close().await {
                debug!("Page close error for {}: {}", url, e);
            }

            result
        }

        /// Reads the rendered markup and final location of an open page
        ///
        /// Waits for the initial navigation to settle, bounded by the request
        /// timeout. This is not a network-idle wait: requests started by
        /// scripts after navigation completes may still be in flight.
        async fn read_page(&self, page: &Page, url: &Url) -> Result<FetchedPage, FetchError> {
            let _ = tokio::time::timeout(self.timeout, page.wait_for_navigation()).await;

            let body = tokio::time::timeout(self.timeout, page.content())
                .await
                .map_err(|_| FetchError::Transient {
                    url: url.to_string(),
                    message: "Render timeout".to_string(),
                })?
                .map_err(|e| FetchError::Transient {
                    url: url.to_string(),
                    message: format!("Failed to read content: {}", e),
                })?;

            let final_url = page
                .url()
                .await
                .ok()
                .flatten()
                .and_then(|u| Url::parse(&u).ok())
                .unwrap_or_else(|| url.clone());

            Ok(FetchedPage { final_url, body })
        }

        pub async fn shutdown(&self) {
            let mut guard = self.browser.lock().await;
            if let Some(browser) = guard.take() {
                if let Ok(mut browser) = Arc::try_unwrap(browser) {
                    if let Err(e) = browser.close().await {
                        warn!("Browser close error: {}", e);
                    }
                }
            }
        }
    }

}

/// The fetch strategy for a run, fixed at construction
pub enum Fetcher {
    Static(StaticFetcher),
    #[cfg(feature = "render")]
    Rendered(RenderedFetcher),
}

impl Fetcher {
    /// Builds the fetcher selected by `crawler.fetch-strategy`
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let timeout = Duration::from_secs(config.crawler.request_timeout_secs);

        match config.crawler.fetch_strategy {
            FetchStrategy::Static => {
                let client = build_http_client(&config.user_agent, timeout).map_err(|e| {
                    ConfigError::Validation(format!("Failed to build HTTP client: {}", e))
                })?;
                Ok(Self::Static(StaticFetcher::new(client)))
            }
            #[cfg(feature = "render")]
            FetchStrategy::Rendered => Ok(Self::Rendered(RenderedFetcher::new(
                config.user_agent.header_value(),
                timeout,
            ))),
            #[cfg(not(feature = "render"))]
            FetchStrategy::Rendered => Err(ConfigError::Validation(
                "fetch-strategy \"rendered\" requires the `render` feature".to_string(),
            )),
        }
    }

    pub async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        match self {
            Self::Static(fetcher) => fetcher.fetch(url).await,
            #[cfg(feature = "render")]
            Self::Rendered(fetcher) => fetcher.fetch(url).await,
        }
    }

    /// Releases strategy resources (the browser process, if any)
    pub async fn shutdown(&self) {
        match self {
            Self::Static(_) => {}
            #[cfg(feature = "render")]
            Self::Rendered(fetcher) => fetcher.shutdown().await,
        }
    }
}
