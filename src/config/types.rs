use serde::Deserialize;

/// Main configuration structure for Catalog-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    pub http: HttpConfig,
    pub crawl: CrawlConfig,
    pub output: OutputConfig,
}

/// Source site configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Root URL of the storefront to harvest
    #[serde(rename = "base-url")]
    pub base_url: String,
}

/// HTTP client behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum attempts per URL for transport-level failures
    #[serde(rename = "retry-attempts", default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Base of the exponential backoff between attempts, in seconds
    #[serde(rename = "backoff-base-secs", default = "default_backoff_base_secs")]
    pub backoff_base_secs: u64,
}

/// Crawl pacing and scoping configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    /// Fixed delay after each product detail fetch (milliseconds)
    #[serde(rename = "request-delay-ms", default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    /// Skip a category entirely if it already has persisted products.
    /// Intended for incremental re-runs; off by default.
    #[serde(rename = "skip-populated-categories", default)]
    pub skip_populated_categories: bool,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite catalog database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Path the JSON snapshot is written to after each run
    #[serde(rename = "snapshot-path")]
    pub snapshot_path: String,
}

fn default_user_agent() -> String {
    "Mozilla/5.0".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_backoff_base_secs() -> u64 {
    2
}

fn default_request_delay_ms() -> u64 {
    300
}
