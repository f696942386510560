//! Pet store client.
//!
//! Bundles the pet service, the fixture reconciler and the identity
//! allocator over one transport.

use std::sync::Arc;

use crate::config::{FixtureIds, PetstoreConfig, PetstoreConfigBuilder};
use crate::errors::{PetstoreError, PetstoreResult};
use crate::fixtures::{FixtureReconciler, IdAllocator};
use crate::services::PetService;
use crate::transport::{HttpTransport, HttpTransportImpl};

/// The pet store client.
///
/// # Example
///
/// ```rust,no_run
/// use petstore_conformance::{PetstoreClient, Pet};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = PetstoreClient::builder().build()?;
///
///     let id = client.fresh_id();
///     client.reconciler().ensure_absent(id).await?;
///     let pet = client.reconciler().ensure_present(&Pet::reference(id)).await?;
///     println!("{pet:?}");
///     client.reconciler().ensure_absent(id).await?;
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct PetstoreClient {
    config: Arc<PetstoreConfig>,
    pets: PetService,
    reconciler: FixtureReconciler,
    ids: Arc<IdAllocator>,
}

impl PetstoreClient {
    /// Creates a new client builder.
    pub fn builder() -> PetstoreClientBuilder {
        PetstoreClientBuilder::new()
    }

    /// Creates a client from environment variables.
    ///
    /// See [`PetstoreConfig::from_env`].
    pub fn from_env() -> PetstoreResult<Self> {
        let config = PetstoreConfig::from_env()?;
        PetstoreClientBuilder::from_config(config).build()
    }

    /// Returns the pet service.
    pub fn pets(&self) -> &PetService {
        &self.pets
    }

    /// Returns the fixture reconciler.
    pub fn reconciler(&self) -> &FixtureReconciler {
        &self.reconciler
    }

    /// Returns a fixture identity according to the configured strategy.
    pub fn fresh_id(&self) -> i64 {
        self.ids.next_id()
    }

    /// Returns the identity allocator.
    pub fn ids(&self) -> &IdAllocator {
        &self.ids
    }

    /// Returns the configuration.
    pub fn config(&self) -> &PetstoreConfig {
        &self.config
    }
}

impl std::fmt::Debug for PetstoreClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PetstoreClient")
            .field("config", &self.config)
            .finish()
    }
}

/// Builder for the pet store client.
pub struct PetstoreClientBuilder {
    config_builder: PetstoreConfigBuilder,
    transport: Option<Arc<dyn HttpTransport>>,
}

impl PetstoreClientBuilder {
    /// Creates a new client builder.
    pub fn new() -> Self {
        Self {
            config_builder: PetstoreConfigBuilder::new(),
            transport: None,
        }
    }

    /// Creates a builder from an existing configuration.
    pub fn from_config(config: PetstoreConfig) -> Self {
        Self {
            config_builder: PetstoreConfigBuilder::new()
                .api_key(config.api_key())
                .base_url(&config.base_url)
                .timeout(config.timeout)
                .fixture_ids(config.fixture_ids),
            transport: None,
        }
    }

    /// Sets the base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.base_url(base_url);
        self
    }

    /// Sets the `api_key` header value.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.api_key(api_key);
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: std::time::Duration) -> Self {
        self.config_builder = self.config_builder.timeout(timeout);
        self
    }

    /// Sets the fixture identity strategy.
    pub fn fixture_ids(mut self, fixture_ids: FixtureIds) -> Self {
        self.config_builder = self.config_builder.fixture_ids(fixture_ids);
        self
    }

    /// Sets a custom transport.
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Builds the client.
    pub fn build(self) -> PetstoreResult<PetstoreClient> {
        let config = Arc::new(self.config_builder.build()?);

        let transport: Arc<dyn HttpTransport> = match self.transport {
            Some(t) => t,
            None => Arc::new(
                HttpTransportImpl::new(&config.base_url, config.timeout)
                    .map_err(|e| PetstoreError::configuration(e.to_string()))?,
            ),
        };

        let pets = PetService::new(transport, Arc::clone(&config));
        let reconciler = FixtureReconciler::new(pets.clone());
        let ids = Arc::new(IdAllocator::new(config.fixture_ids));

        tracing::debug!(base_url = %config.base_url, fixture_ids = ?config.fixture_ids, "Pet store client ready");

        Ok(PetstoreClient {
            config,
            pets,
            reconciler,
            ids,
        })
    }
}

impl Default for PetstoreClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
