//! Configuration module for the pet store client.
//!
//! Provides the target deployment, timeouts, the delete `api_key` and the
//! strategy used to pick fixture identities.

use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use url::Url;

use crate::errors::{PetstoreError, PetstoreResult};

/// Default base URL of the public pet store deployment.
pub const DEFAULT_BASE_URL: &str = "https://petstore.swagger.io/v2";

/// Default request timeout (30 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default value sent in the optional `api_key` header.
pub const DEFAULT_API_KEY: &str = "special-key";

/// Fixture identity used by the legacy suite.
pub const LEGACY_FIXTURE_ID: i64 = 100;

/// How scenarios choose identities for caller-assigned fixtures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FixtureIds {
    /// A fresh identity per request, unique within the run.
    #[default]
    Randomized,
    /// The same identity every time. Scenarios then share external state.
    Fixed(i64),
}

impl FixtureIds {
    /// Parses `random`, `fixed` or `fixed:<id>`.
    pub fn parse(value: &str) -> PetstoreResult<Self> {
        let value = value.trim();
        match value {
            "random" | "randomized" => Ok(FixtureIds::Randomized),
            "fixed" => Ok(FixtureIds::Fixed(LEGACY_FIXTURE_ID)),
            _ => {
                let id = value
                    .strip_prefix("fixed:")
                    .and_then(|id| id.parse::<i64>().ok())
                    .filter(|id| *id >= 0)
                    .ok_or_else(|| {
                        PetstoreError::configuration(format!(
                            "Invalid fixture id strategy '{value}', expected random, fixed or fixed:<id>"
                        ))
                    })?;
                Ok(FixtureIds::Fixed(id))
            }
        }
    }
}

/// Configuration for the pet store client.
#[derive(Clone)]
pub struct PetstoreConfig {
    /// Value for the optional delete `api_key` header.
    pub(crate) api_key: SecretString,
    /// Base URL for API requests, without a trailing slash.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Fixture identity strategy.
    pub fixture_ids: FixtureIds,
}

impl PetstoreConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> PetstoreConfigBuilder {
        PetstoreConfigBuilder::new()
    }

    /// Creates a configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `PETSTORE_BASE_URL` (optional): deployment to test
    /// - `PETSTORE_TIMEOUT_SECS` (optional): request timeout in seconds
    /// - `PETSTORE_API_KEY` (optional): delete `api_key` header value
    /// - `PETSTORE_FIXTURE_IDS` (optional): `random`, `fixed` or `fixed:<id>`
    pub fn from_env() -> PetstoreResult<Self> {
        let mut builder = PetstoreConfigBuilder::new();

        if let Ok(base_url) = std::env::var("PETSTORE_BASE_URL") {
            builder = builder.base_url(base_url);
        }

        if let Ok(timeout_str) = std::env::var("PETSTORE_TIMEOUT_SECS") {
            let secs = timeout_str.parse::<u64>().map_err(|_| {
                PetstoreError::configuration(format!(
                    "PETSTORE_TIMEOUT_SECS must be a whole number of seconds, got '{timeout_str}'"
                ))
            })?;
            builder = builder.timeout_secs(secs);
        }

        if let Ok(api_key) = std::env::var("PETSTORE_API_KEY") {
            builder = builder.api_key(api_key);
        }

        if let Ok(strategy) = std::env::var("PETSTORE_FIXTURE_IDS") {
            builder = builder.fixture_ids(FixtureIds::parse(&strategy)?);
        }

        builder.build()
    }

    /// Returns the `api_key` header value (exposing the secret).
    pub(crate) fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

impl Default for PetstoreConfig {
    fn default() -> Self {
        Self {
            api_key: SecretString::new(DEFAULT_API_KEY.to_string()),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            fixture_ids: FixtureIds::default(),
        }
    }
}

impl std::fmt::Debug for PetstoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PetstoreConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("fixture_ids", &self.fixture_ids)
            .finish()
    }
}

/// Builder for `PetstoreConfig`.
#[derive(Default)]
pub struct PetstoreConfigBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    timeout: Option<Duration>,
    fixture_ids: Option<FixtureIds>,
}

impl PetstoreConfigBuilder {
    /// Creates a new configuration builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the `api_key` header value.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Sets the base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the timeout in seconds.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Some(Duration::from_secs(secs));
        self
    }

    /// Sets the fixture identity strategy.
    pub fn fixture_ids(mut self, fixture_ids: FixtureIds) -> Self {
        self.fixture_ids = Some(fixture_ids);
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> PetstoreResult<PetstoreConfig> {
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let parsed = Url::parse(&base_url)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(PetstoreError::configuration(format!(
                "Base URL must use http or https, got '{}'",
                parsed.scheme()
            )));
        }

        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);
        if timeout.is_zero() {
            return Err(PetstoreError::configuration("Timeout must be non-zero"));
        }

        let api_key = self.api_key.unwrap_or_else(|| DEFAULT_API_KEY.to_string());
        if api_key.is_empty() {
            return Err(PetstoreError::configuration("api_key cannot be empty"));
        }

        if let Some(FixtureIds::Fixed(id)) = self.fixture_ids {
            if id < 0 {
                return Err(PetstoreError::configuration(
                    "Fixed fixture id must be non-negative",
                ));
            }
        }

        Ok(PetstoreConfig {
            api_key: SecretString::new(api_key),
            base_url,
            timeout,
            fixture_ids: self.fixture_ids.unwrap_or_default(),
        })
    }
}
