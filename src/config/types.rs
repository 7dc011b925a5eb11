use serde::Deserialize;

/// Main configuration structure for Catalog-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// How pages are retrieved for the whole run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchStrategy {
    /// Plain HTTP GET
    Static,
    /// Headless browser render, waiting for the page to settle
    Rendered,
}

impl Default for FetchStrategy {
    fn default() -> Self {
        Self::Static
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Listing page the breadth-first walk starts from
    #[serde(rename = "seed-url")]
    pub seed_url: String,

    /// Extra host patterns treated as same-origin (the seed host is always allowed)
    #[serde(rename = "allowed-domains", default)]
    pub allowed_domains: Vec<String>,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Minimum time between requests to the same origin (milliseconds)
    #[serde(rename = "politeness-delay-ms", default = "default_politeness_ms")]
    pub politeness_delay_ms: u64,

    /// Stop after this many newly accepted records
    #[serde(rename = "max-new-records", default)]
    pub max_new_records: Option<usize>,

    #[serde(rename = "fetch-strategy", default)]
    pub fetch_strategy: FetchStrategy,

    /// Warn when the store holds fewer records than this after a crawl
    #[serde(rename = "expected-minimum-records", default)]
    pub expected_minimum_records: Option<usize>,

    /// Maximum length of a record's full text, in characters
    #[serde(rename = "max-full-text-chars", default = "default_max_full_text")]
    pub max_full_text_chars: usize,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_politeness_ms() -> u64 {
    1000
}

fn default_max_full_text() -> usize {
    20_000
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Format: CrawlerName/Version (+ContactURL; ContactEmail)
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Append-only line-delimited JSON record store
    #[serde(rename = "records-path")]
    pub records_path: String,

    /// Directory receiving one HTML snapshot per accepted product
    #[serde(rename = "archive-dir")]
    pub archive_dir: String,

    /// Path to the SQLite catalog database
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Path to the markdown catalog summary
    #[serde(rename = "summary-path")]
    pub summary_path: String,
}

/// Recommendation API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(rename = "listen-addr", default = "default_listen_addr")]
    pub listen_addr: String,

    /// Result count used when a request omits `top_k`
    #[serde(rename = "default-top-k", default = "default_top_k")]
    pub default_top_k: usize,

    #[serde(rename = "cors-enabled", default = "default_cors")]
    pub cors_enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            default_top_k: default_top_k(),
            cors_enabled: default_cors(),
        }
    }
}

fn default_listen_addr() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_top_k() -> usize {
    5
}

fn default_cors() -> bool {
    true
}
