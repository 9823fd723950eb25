//! Centralized configuration management for sneaker-admin

use std::path::PathBuf;
use std::time::Duration;
use anyhow::{Result, Context};

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Origin of the store REST API, without trailing slash
    pub api_url: String,
    /// Terminal width (columns) at which lists switch from cards to a table
    pub breakpoint: u16,
    /// HTTP client configuration
    pub http: HttpConfig,
    /// How long a notification stays up before clearing itself
    pub toast_seconds: u64,
    /// Log file written by both the TUI and the CLI
    pub log_file: PathBuf,
}

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            user_agent: "sneaker-admin/0.1.0".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:5000".to_string(),
            breakpoint: 100,
            http: HttpConfig::default(),
            toast_seconds: 4,
            log_file: PathBuf::from("sneaker_admin.log"),
        }
    }
}

impl Config {
    /// Load configuration from environment variables and defaults
    pub fn from_env() -> Result<Self> {
        let defaults = Config::default();

        let api_url = std::env::var("SNEAKER_ADMIN_API_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_url);

        let http = HttpConfig {
            timeout_seconds: parse_env_var("SNEAKER_ADMIN_HTTP_TIMEOUT_SECONDS")?
                .unwrap_or(defaults.http.timeout_seconds),
            user_agent: std::env::var("SNEAKER_ADMIN_USER_AGENT")
                .unwrap_or(defaults.http.user_agent),
        };

        let log_file = std::env::var("SNEAKER_ADMIN_LOG_FILE")
            .map(PathBuf::from)
            .unwrap_or(defaults.log_file);

        Ok(Config {
            api_url,
            breakpoint: parse_env_var("SNEAKER_ADMIN_BREAKPOINT")?.unwrap_or(defaults.breakpoint),
            http,
            toast_seconds: parse_env_var("SNEAKER_ADMIN_TOAST_SECONDS")?
                .unwrap_or(defaults.toast_seconds),
            log_file,
        })
    }

    /// Apply command line overrides on top of the environment
    pub fn with_overrides(mut self, api_url: Option<&str>, breakpoint: Option<u16>) -> Self {
        if let Some(url) = api_url {
            self.api_url = url.trim_end_matches('/').to_string();
        }
        if let Some(bp) = breakpoint {
            self.breakpoint = bp;
        }
        self
    }

    /// Join an API path onto the configured origin
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }

    /// Get HTTP timeout as Duration
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_seconds)
    }

    pub fn toast_timeout(&self) -> Duration {
        Duration::from_secs(self.toast_seconds)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let url = reqwest::Url::parse(&self.api_url)
            .with_context(|| format!("Invalid API url: {}", self.api_url))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(anyhow::anyhow!(
                "API url must use http or https, got: {}",
                url.scheme()
            ));
        }

        if self.breakpoint == 0 {
            return Err(anyhow::anyhow!("Breakpoint must be at least 1 column"));
        }

        if self.http.timeout_seconds == 0 {
            return Err(anyhow::anyhow!("HTTP timeout must be at least 1 second"));
        }

        Ok(())
    }
}

/// Helper function to parse environment variable as a specific type
fn parse_env_var<T>(var_name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display + Send + Sync + std::error::Error + 'static,
{
    match std::env::var(var_name) {
        Ok(val) => val.parse().map(Some).with_context(|| {
            format!("Failed to parse environment variable {} = '{}'", var_name, val)
        }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.api_url, "http://localhost:5000");
        assert_eq!(config.breakpoint, 100);
        assert_eq!(config.http.timeout_seconds, 30);
        assert_eq!(config.toast_timeout(), Duration::from_secs(4));
    }

    #[test]
    fn test_config_validation() {
        Config::default().validate().unwrap();

        let bad_scheme = Config::default().with_overrides(Some("ftp://store.local"), None);
        assert!(bad_scheme.validate().is_err());

        let zero_breakpoint = Config::default().with_overrides(None, Some(0));
        assert!(zero_breakpoint.validate().is_err());
    }

    #[test]
    fn test_endpoint_joining() {
        let config = Config::default().with_overrides(Some("http://api.local:8080/"), None);
        assert_eq!(
            config.endpoint("/product/getallproducts"),
            "http://api.local:8080/product/getallproducts"
        );
        assert_eq!(config.endpoint("product/x"), "http://api.local:8080/product/x");
    }
}
