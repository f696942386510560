//! A failing, erroring or hanging scenario never leaks fixtures or stops the run.

mod common;

use petstore_conformance::mocks::{InMemoryPetStore, MockFailure};
use petstore_conformance::scenarios::{expect, ScenarioFuture};
use petstore_conformance::transport::HttpMethod;
use petstore_conformance::{
    Pet, RunnerConfig, Scenario, ScenarioContext, ScenarioGroup, SuiteRunner, Verdict,
};
use petstore_conformance::scenarios::FailureKind;
use std::sync::Arc;
use std::time::Duration;

fn creates_then_fails(ctx: &mut ScenarioContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        ctx.fresh_fixture(Pet::reference(0)).await?;
        ctx.create_and_capture(&serde_json::json!({"name": "captured"}))
            .await?;
        expect::that(false, "body failed after setup")
    })
}

fn creates_then_hangs(ctx: &mut ScenarioContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        ctx.fresh_fixture(Pet::reference(0)).await?;
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(())
    })
}

fn reads_fixture(ctx: &mut ScenarioContext) -> ScenarioFuture<'_> {
    Box::pin(async move {
        let pet = ctx.fresh_fixture(Pet::reference(0)).await?;
        let id = pet.id.unwrap_or_default();
        let response = ctx.pets().get_raw(&id.to_string()).await?;
        expect::status(&response, 200)
    })
}

fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new(ScenarioGroup::Create, "fails", "fails after setup", creates_then_fails),
        Scenario::new(ScenarioGroup::Create, "hangs", "hangs after setup", creates_then_hangs),
        Scenario::new(ScenarioGroup::Read, "reads", "reads its fixture", reads_fixture),
    ]
}

#[tokio::test]
async fn test_failures_are_isolated() {
    let store = Arc::new(InMemoryPetStore::new());
    let runner = SuiteRunner::new(common::in_memory_client(store.clone())).with_config(
        RunnerConfig::default().with_scenario_timeout(Duration::from_millis(200)),
    );

    let report = runner.run(&scenarios()).await;

    assert_eq!(report.outcomes.len(), 3);
    let failed = report.outcome("create/fails").unwrap();
    assert!(matches!(
        failed.verdict,
        Verdict::Failed {
            kind: FailureKind::Assertion,
            ..
        }
    ));
    assert_eq!(failed.fixture_ids.len(), 2);

    let hung = report.outcome("create/hangs").unwrap();
    assert!(matches!(
        hung.verdict,
        Verdict::Failed {
            kind: FailureKind::Timeout,
            ..
        }
    ));

    assert!(report.outcome("read/reads").unwrap().passed());
    assert_eq!(report.failed(), 2);
    assert!(store.is_empty(), "left behind: {:?}", store.ids());
}

#[tokio::test]
async fn test_transport_failure_during_setup_is_a_reconciliation_failure() {
    let store = Arc::new(InMemoryPetStore::new());
    let runner = SuiteRunner::new(common::in_memory_client(store.clone()));
    store.fail_next(HttpMethod::Post, "pet", MockFailure::Connection);

    let report = runner.run(&scenarios()[2..]).await;

    let outcome = &report.outcomes[0];
    assert!(matches!(
        outcome.verdict,
        Verdict::Failed {
            kind: FailureKind::Reconciliation,
            ..
        }
    ));
    assert!(outcome.teardown_errors.is_empty());
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_fixed_fixture_ids_reuse_the_legacy_id() {
    let store = Arc::new(InMemoryPetStore::new());
    let client = petstore_conformance::PetstoreClient::builder()
        .transport(store.clone())
        .fixture_ids(petstore_conformance::FixtureIds::Fixed(100))
        .build()
        .unwrap();
    let runner = SuiteRunner::new(client);

    let report = runner.run(&scenarios()[2..]).await;

    assert!(report.all_passed(), "{report}");
    assert_eq!(report.outcomes[0].fixture_ids, vec![100]);
    assert!(store.is_empty());
}
