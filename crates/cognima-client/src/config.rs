//! Public configuration for the retrieval client.

use std::time::Duration;

use cognima_core::{RetrievalError, RetrievalResult};

use crate::retry::RetryPolicy;

/// Default base URL for most endpoints.
pub const DEFAULT_PRIMARY_URL: &str = "https://cog.api.br/api/v1";
/// Default base URL for the secondary cluster (TikTok, Instagram, Pinterest, lyrics).
pub const DEFAULT_SECONDARY_URL: &str = "https://cog2.cognima.com.br/api/v1";
/// Default base URL for people/document lookups.
pub const DEFAULT_LOOKUP_URL: &str = "https://consultas.cog.api.br/api/v1";
/// Default site root, used for catalogue streams outside the versioned API.
pub const DEFAULT_SITE_URL: &str = "https://cog.api.br";

/// Which base URL an endpoint is served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiHost {
    Primary,
    Secondary,
    Lookup,
    Site,
}

/// Configuration for the retrieval client.
///
/// Use the builder pattern methods to customize the client configuration.
///
/// # Example
///
/// ```
/// use cognima_client::{ClientConfig, RetryPolicy};
/// use std::time::Duration;
///
/// let config = ClientConfig::new()
///     .with_timeout(Duration::from_secs(60))
///     .with_user_agent("my-bot/1.0")
///     .with_retry(RetryPolicy::default().with_max_retries(5));
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub(crate) primary_url: String,
    pub(crate) secondary_url: String,
    pub(crate) lookup_url: String,
    pub(crate) site_url: String,
    pub(crate) user_agent: String,
    /// Per-attempt request timeout
    pub(crate) timeout: Duration,
    pub(crate) retry: RetryPolicy,
    /// Upper bound on bytes handed to a sink in one write
    pub(crate) chunk_size: usize,
    /// Default spacing between batch calls
    pub(crate) batch_throttle: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            primary_url: DEFAULT_PRIMARY_URL.to_string(),
            secondary_url: DEFAULT_SECONDARY_URL.to_string(),
            lookup_url: DEFAULT_LOOKUP_URL.to_string(),
            site_url: DEFAULT_SITE_URL.to_string(),
            user_agent: concat!("cognima-client/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
            chunk_size: 64 * 1024,
            batch_throttle: Duration::from_secs(1),
        }
    }
}

impl ClientConfig {
    /// Create a new configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Point every host at one base URL. Handy for tests and self-hosted proxies.
    #[must_use]
    pub fn with_single_host(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.primary_url.clone_from(&url);
        self.secondary_url.clone_from(&url);
        self.lookup_url.clone_from(&url);
        self.site_url = url;
        self
    }

    /// Override the base URL of one host.
    #[must_use]
    pub fn with_host_url(mut self, host: ApiHost, url: impl Into<String>) -> Self {
        let url = url.into();
        match host {
            ApiHost::Primary => self.primary_url = url,
            ApiHost::Secondary => self.secondary_url = url,
            ApiHost::Lookup => self.lookup_url = url,
            ApiHost::Site => self.site_url = url,
        }
        self
    }

    /// Set the user agent string for HTTP requests.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the per-attempt request timeout.
    ///
    /// Defaults to 30 seconds.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry policy for transient failures.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set the largest chunk written to a download sink at once.
    ///
    /// Defaults to 64 KiB.
    #[must_use]
    pub const fn with_chunk_size(mut self, bytes: usize) -> Self {
        self.chunk_size = bytes;
        self
    }

    /// Set the default delay between consecutive batch calls.
    ///
    /// Defaults to 1 second.
    #[must_use]
    pub const fn with_batch_throttle(mut self, throttle: Duration) -> Self {
        self.batch_throttle = throttle;
        self
    }

    /// Base URL for `host`, without a trailing slash.
    #[must_use]
    pub fn base_url(&self, host: ApiHost) -> &str {
        let url = match host {
            ApiHost::Primary => &self.primary_url,
            ApiHost::Secondary => &self.secondary_url,
            ApiHost::Lookup => &self.lookup_url,
            ApiHost::Site => &self.site_url,
        };
        url.trim_end_matches('/')
    }

    #[must_use]
    pub const fn retry(&self) -> &RetryPolicy {
        &self.retry
    }

    #[must_use]
    pub const fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    #[must_use]
    pub const fn batch_throttle(&self) -> Duration {
        self.batch_throttle
    }

    /// Reject settings the client cannot run with.
    pub fn validate(&self) -> RetrievalResult<()> {
        for (option, url) in [
            ("primary_url", &self.primary_url),
            ("secondary_url", &self.secondary_url),
            ("lookup_url", &self.lookup_url),
            ("site_url", &self.site_url),
        ] {
            url::Url::parse(url).map_err(|e| RetrievalError::configuration(option, e.to_string()))?;
        }
        if self.timeout.is_zero() {
            return Err(RetrievalError::configuration(
                "timeout",
                "must be greater than zero",
            ));
        }
        if self.chunk_size == 0 {
            return Err(RetrievalError::configuration(
                "chunk_size",
                "must be greater than zero",
            ));
        }
        self.retry.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url(ApiHost::Primary), DEFAULT_PRIMARY_URL);
        assert_eq!(config.base_url(ApiHost::Lookup), DEFAULT_LOOKUP_URL);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.chunk_size(), 64 * 1024);
        assert_eq!(config.batch_throttle(), Duration::from_secs(1));
        assert!(config.user_agent.starts_with("cognima-client/"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = ClientConfig::new()
            .with_timeout(Duration::from_secs(60))
            .with_user_agent("test/1.0")
            .with_host_url(ApiHost::Secondary, "http://localhost:9000/v1/")
            .with_chunk_size(1024);

        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.user_agent, "test/1.0");
        assert_eq!(config.base_url(ApiHost::Secondary), "http://localhost:9000/v1");
        assert_eq!(config.base_url(ApiHost::Primary), DEFAULT_PRIMARY_URL);
        assert_eq!(config.chunk_size(), 1024);
    }

    #[test]
    fn test_single_host_overrides_all() {
        let config = ClientConfig::new().with_single_host("http://127.0.0.1:8080");
        for host in [ApiHost::Primary, ApiHost::Secondary, ApiHost::Lookup, ApiHost::Site] {
            assert_eq!(config.base_url(host), "http://127.0.0.1:8080");
        }
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad_url = ClientConfig::new().with_host_url(ApiHost::Lookup, "not a url");
        assert!(matches!(
            bad_url.validate(),
            Err(RetrievalError::Configuration { option, .. }) if option == "lookup_url"
        ));

        let zero_chunk = ClientConfig::new().with_chunk_size(0);
        assert!(zero_chunk.validate().is_err());

        let zero_timeout = ClientConfig::new().with_timeout(Duration::ZERO);
        assert!(zero_timeout.validate().is_err());
    }
}
