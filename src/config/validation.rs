use crate::config::types::{Config, CrawlConfig, HttpConfig, OutputConfig, SiteConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_http_config(&config.http)?;
    validate_crawl_config(&config.crawl)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the source site configuration
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    // HTTP is accepted alongside HTTPS so integration tests can point the
    // harvester at local mock servers.
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "base-url must use HTTP or HTTPS, got '{}'",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::Validation(
            "base-url must have a host".to_string(),
        ));
    }

    Ok(())
}

/// Validates HTTP client configuration
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout-secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    if config.retry_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "retry-attempts must be >= 1, got {}",
            config.retry_attempts
        )));
    }

    if config.backoff_base_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "backoff-base-secs must be >= 1, got {}",
            config.backoff_base_secs
        )));
    }

    Ok(())
}

/// Validates crawl pacing configuration
fn validate_crawl_config(config: &CrawlConfig) -> Result<(), ConfigError> {
    if config.request_delay_ms > 60_000 {
        return Err(ConfigError::Validation(format!(
            "request-delay-ms must be <= 60000, got {}",
            config.request_delay_ms
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database-path cannot be empty".to_string(),
        ));
    }

    if config.snapshot_path.is_empty() {
        return Err(ConfigError::Validation(
            "snapshot-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::{CrawlConfig, HttpConfig, OutputConfig, SiteConfig};

    fn valid_config() -> Config {
        Config {
            site: SiteConfig {
                base_url: "https://shop.example.com".to_string(),
            },
            http: HttpConfig {
                user_agent: "Mozilla/5.0".to_string(),
                timeout_secs: 30,
                retry_attempts: 3,
                backoff_base_secs: 2,
            },
            crawl: CrawlConfig {
                request_delay_ms: 300,
                skip_populated_categories: false,
            },
            output: OutputConfig {
                database_path: "./catalog.db".to_string(),
                snapshot_path: "./catalog_snapshot.json".to_string(),
            },
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate(&valid_config()).is_ok());
    }

    #[test]
    fn test_http_base_url_allowed() {
        let mut config = valid_config();
        config.site.base_url = "http://127.0.0.1:8080".to_string();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        let mut config = valid_config();
        config.site.base_url = "ftp://shop.example.com".to_string();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_rejects_malformed_base_url() {
        let mut config = valid_config();
        config.site.base_url = "not a url".to_string();
        assert!(matches!(validate(&config), Err(ConfigError::InvalidUrl(_))));
    }

    #[test]
    fn test_rejects_zero_retry_attempts() {
        let mut config = valid_config();
        config.http.retry_attempts = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_rejects_empty_user_agent() {
        let mut config = valid_config();
        config.http.user_agent = String::new();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_rejects_empty_database_path() {
        let mut config = valid_config();
        config.output.database_path = String::new();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_rejects_excessive_request_delay() {
        let mut config = valid_config();
        config.crawl.request_delay_ms = 120_000;
        assert!(validate(&config).is_err());
    }
}
