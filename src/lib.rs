//! Pet Store Conformance Suite
//!
//! Black-box conformance checks for the `/pet` resource of a Swagger Petstore
//! deployment. Every scenario drives its own fixtures into a known state
//! before acting, asserts one behaviour of the API, and removes whatever it
//! touched afterwards, pass or fail.
//!
//! # Features
//!
//! - **Fixture Reconciliation**: idempotent "ensure absent" / "ensure present"
//!   with read-back confirmation
//! - **Superset Matching**: responses may carry extra fields at any depth
//! - **Isolated Fixtures**: fresh identities per scenario, or the legacy
//!   shared id on request
//! - **Scenario Catalogue**: read, search, create, update and delete
//! - **In-Memory Store**: a stateful stand-in for offline runs
//! - **Observability**: tracing spans per scenario, structured logging
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use petstore_conformance::{catalog, PetstoreClient, SuiteRunner};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = PetstoreClient::builder()
//!         .base_url("https://petstore.swagger.io/v2")
//!         .build()?;
//!
//!     let report = SuiteRunner::new(client).run(&catalog()).await;
//!     println!("{report}");
//!     Ok(())
//! }
//! ```
//!
//! # Fixture Example
//!
//! ```rust,no_run
//! use petstore_conformance::{Pet, PetstoreClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = PetstoreClient::from_env()?;
//!     let id = client.fresh_id();
//!
//!     client.reconciler().ensure_absent(id).await?;
//!     let pet = client.reconciler().ensure_present(&Pet::reference(id)).await?;
//!     println!("{pet:?}");
//!     client.reconciler().ensure_absent(id).await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod client;
pub mod config;
pub mod errors;
pub mod fixtures;
pub mod matching;
pub mod observability;
pub mod scenarios;
pub mod services;
pub mod transport;
pub mod types;

// Re-exports for convenience
pub use client::{PetstoreClient, PetstoreClientBuilder};
pub use config::{FixtureIds, PetstoreConfig};
pub use errors::{PetstoreError, PetstoreResult};
pub use fixtures::{DesiredState, FixtureReconciler, FixtureState, IdAllocator};
pub use matching::{contains_subset, is_subset, SubsetMismatch};
pub use scenarios::{
    catalog, RunnerConfig, Scenario, ScenarioContext, ScenarioGroup, ScenarioOutcome,
    SuiteReport, SuiteRunner, Verdict,
};
pub use types::{ApiMessage, Category, Pet, PetStatus, Tag};

/// Mock transports for tests and offline runs.
pub mod mocks;
