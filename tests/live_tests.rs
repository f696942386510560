//! Runs the catalogue against a real deployment.
//!
//! Ignored by default. Run with:
//!
//! ```sh
//! PETSTORE_BASE_URL=https://petstore.swagger.io/v2 cargo test --test live_tests -- --ignored
//! ```

use petstore_conformance::observability::{init_logging, LoggingConfig};
use petstore_conformance::{catalog, PetstoreClient, SuiteRunner};

#[tokio::test]
#[ignore = "talks to a live pet store"]
async fn test_catalog_against_live_deployment() {
    init_logging(&LoggingConfig::for_tests());
    let client = PetstoreClient::from_env().expect("Failed to build client from environment");

    let report = SuiteRunner::new(client).run(&catalog()).await;

    println!("{report}");
    assert!(report.all_passed(), "{}", report.summary());
}
