//! Sequential suite execution with per-scenario timeouts and unconditional
//! teardown.

use chrono::{DateTime, Utc};
use std::fmt;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::Instrument;
use uuid::Uuid;

use super::{Scenario, ScenarioContext, ScenarioGroup};
use crate::client::PetstoreClient;
use crate::errors::PetstoreError;
use crate::fixtures::FixtureState;
use crate::transport::TransportError;

/// Default limit on one scenario body.
pub const DEFAULT_SCENARIO_TIMEOUT: Duration = Duration::from_secs(60);

/// Default limit on one scenario's teardown.
pub const DEFAULT_TEARDOWN_TIMEOUT: Duration = Duration::from_secs(60);

/// Runner configuration.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Limit on each scenario body.
    pub scenario_timeout: Duration,
    /// Limit on each teardown.
    pub teardown_timeout: Duration,
    /// Only scenarios whose `group/name` contains this text are run.
    pub filter: Option<String>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            scenario_timeout: DEFAULT_SCENARIO_TIMEOUT,
            teardown_timeout: DEFAULT_TEARDOWN_TIMEOUT,
            filter: None,
        }
    }
}

impl RunnerConfig {
    /// Sets the scenario timeout.
    pub fn with_scenario_timeout(mut self, timeout: Duration) -> Self {
        self.scenario_timeout = timeout;
        self
    }

    /// Sets the teardown timeout.
    pub fn with_teardown_timeout(mut self, timeout: Duration) -> Self {
        self.teardown_timeout = timeout;
        self
    }

    /// Restricts the run to matching scenarios.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Returns true if `scenario` passes the filter.
    pub fn selects(&self, scenario: &Scenario) -> bool {
        self.filter
            .as_deref()
            .map_or(true, |filter| scenario.id().contains(filter))
    }
}

/// Category of a scenario failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// A fixture could not be set up.
    Reconciliation,
    /// The API answered, but not as expected.
    Assertion,
    /// A typed call surfaced an API error the scenario did not handle.
    Api,
    /// The request did not complete.
    Transport,
    /// The scenario or a request ran out of time.
    Timeout,
}

impl FailureKind {
    /// Classifies a scenario error.
    pub fn of(error: &PetstoreError) -> Self {
        match error {
            PetstoreError::Reconciliation { .. } => FailureKind::Reconciliation,
            PetstoreError::Assertion { .. } => FailureKind::Assertion,
            PetstoreError::Transport(TransportError::Timeout { .. }) => FailureKind::Timeout,
            PetstoreError::Transport(_) => FailureKind::Transport,
            _ => FailureKind::Api,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::Reconciliation => "reconciliation",
            FailureKind::Assertion => "assertion",
            FailureKind::Api => "api",
            FailureKind::Transport => "transport",
            FailureKind::Timeout => "timeout",
        };
        f.write_str(name)
    }
}

/// Result of a scenario body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Every expectation held.
    Passed,
    /// The first failure.
    Failed {
        /// Failure category.
        kind: FailureKind,
        /// Rendered error.
        message: String,
    },
}

impl Verdict {
    fn from_result(result: &Result<(), PetstoreError>) -> Self {
        match result {
            Ok(()) => Verdict::Passed,
            Err(error) => Verdict::Failed {
                kind: FailureKind::of(error),
                message: error.to_string(),
            },
        }
    }

    /// Returns true for [`Verdict::Passed`].
    pub fn is_passed(&self) -> bool {
        matches!(self, Verdict::Passed)
    }
}

/// Outcome of one scenario, teardown included.
#[derive(Debug)]
pub struct ScenarioOutcome {
    /// Endpoint exercised.
    pub group: ScenarioGroup,
    /// Scenario name.
    pub name: &'static str,
    /// Behaviour asserted.
    pub description: &'static str,
    /// Body result.
    pub verdict: Verdict,
    /// Identities teardown could not remove.
    pub teardown_errors: Vec<(i64, PetstoreError)>,
    /// Every identity the scenario touched.
    pub fixture_ids: Vec<i64>,
    /// Wall time, teardown included.
    pub duration: Duration,
}

impl ScenarioOutcome {
    /// `group/name`.
    pub fn id(&self) -> String {
        format!("{}/{}", self.group, self.name)
    }

    /// Returns true if the body passed and teardown left nothing behind.
    pub fn passed(&self) -> bool {
        self.verdict.is_passed() && self.teardown_errors.is_empty()
    }
}

impl fmt::Display for ScenarioOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = if self.passed() { "PASS" } else { "FAIL" };
        write!(f, "{mark} {} ({} ms)", self.id(), self.duration.as_millis())?;
        if let Verdict::Failed { kind, message } = &self.verdict {
            write!(f, "\n    expected: {}", self.description)?;
            write!(f, "\n    {kind}: {message}")?;
        }
        for (id, error) in &self.teardown_errors {
            write!(f, "\n    teardown of pet {id}: {error}")?;
        }
        Ok(())
    }
}

/// Outcome of a suite run.
#[derive(Debug)]
pub struct SuiteReport {
    /// Identifies the run in logs.
    pub run_id: Uuid,
    /// When the first scenario started.
    pub started_at: DateTime<Utc>,
    /// When the last teardown finished.
    pub finished_at: DateTime<Utc>,
    /// One entry per selected scenario, in run order.
    pub outcomes: Vec<ScenarioOutcome>,
}

impl SuiteReport {
    /// Number of passing scenarios.
    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed()).count()
    }

    /// Number of failing scenarios.
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.passed()
    }

    /// Returns true if every scenario passed.
    pub fn all_passed(&self) -> bool {
        self.outcomes.iter().all(ScenarioOutcome::passed)
    }

    /// Failing outcomes.
    pub fn failures(&self) -> impl Iterator<Item = &ScenarioOutcome> {
        self.outcomes.iter().filter(|o| !o.passed())
    }

    /// Looks up an outcome by `group/name`.
    pub fn outcome(&self, id: &str) -> Option<&ScenarioOutcome> {
        self.outcomes.iter().find(|o| o.id() == id)
    }

    /// One-line tally.
    pub fn summary(&self) -> String {
        let elapsed = self.finished_at - self.started_at;
        format!(
            "{} scenarios, {} passed, {} failed in {} ms",
            self.outcomes.len(),
            self.passed(),
            self.failed(),
            elapsed.num_milliseconds()
        )
    }
}

impl fmt::Display for SuiteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "run {}", self.run_id)?;
        for outcome in &self.outcomes {
            writeln!(f, "{outcome}")?;
        }
        write!(f, "{}", self.summary())
    }
}

/// Runs scenarios one after another against a single client.
#[derive(Debug, Clone)]
pub struct SuiteRunner {
    client: PetstoreClient,
    config: RunnerConfig,
}

impl SuiteRunner {
    /// Creates a runner with the default configuration.
    pub fn new(client: PetstoreClient) -> Self {
        Self {
            client,
            config: RunnerConfig::default(),
        }
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, config: RunnerConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Runs every selected scenario in order.
    ///
    /// A failing scenario never prevents the next one from running.
    pub async fn run(&self, scenarios: &[Scenario]) -> SuiteReport {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let span = tracing::info_span!("suite", %run_id);

        let outcomes = async {
            let mut outcomes = Vec::new();
            for scenario in scenarios.iter().filter(|s| self.config.selects(s)) {
                outcomes.push(self.run_one(scenario).await);
            }
            outcomes
        }
        .instrument(span)
        .await;

        let report = SuiteReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            outcomes,
        };
        tracing::info!(%run_id, summary = %report.summary(), "Suite finished");
        report
    }

    /// Runs one scenario, then tears down every identity it touched.
    pub async fn run_one(&self, scenario: &Scenario) -> ScenarioOutcome {
        let span = tracing::info_span!("scenario", id = %scenario.id());
        self.execute(scenario).instrument(span).await
    }

    async fn execute(&self, scenario: &Scenario) -> ScenarioOutcome {
        let start = Instant::now();
        let mut ctx = ScenarioContext::new(self.client.clone());

        let limit = self.config.scenario_timeout;
        let result = match timeout(limit, scenario.run(&mut ctx)).await {
            Ok(result) => result,
            Err(_) => Err(PetstoreError::from(TransportError::Timeout { timeout: limit })),
        };

        let teardown_errors = self.teardown(&mut ctx).await;
        let verdict = Verdict::from_result(&result);
        let duration = start.elapsed();

        match &verdict {
            Verdict::Passed => tracing::info!(
                duration_ms = duration.as_millis() as u64,
                "Scenario passed"
            ),
            Verdict::Failed { kind, message } => tracing::warn!(
                %kind,
                error = %message,
                duration_ms = duration.as_millis() as u64,
                "Scenario failed"
            ),
        }

        ScenarioOutcome {
            group: scenario.group,
            name: scenario.name,
            description: scenario.description,
            verdict,
            teardown_errors,
            fixture_ids: ctx.fixture_ids(),
            duration,
        }
    }

    async fn teardown(&self, ctx: &mut ScenarioContext) -> Vec<(i64, PetstoreError)> {
        let limit = self.config.teardown_timeout;
        match timeout(limit, ctx.teardown()).await {
            Ok(errors) => errors,
            Err(_) => {
                tracing::warn!(timeout = ?limit, "Teardown timed out");
                ctx.fixture_ids()
                    .into_iter()
                    .filter(|id| ctx.state(*id) != Some(&FixtureState::Absent))
                    .map(|id| (id, PetstoreError::from(TransportError::Timeout { timeout: limit })))
                    .collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FixtureIds;
    use crate::mocks::{InMemoryPetStore, MockFailure};
    use crate::scenarios::{expect, ScenarioFuture};
    use crate::services::WriteRequest;
    use crate::transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};
    use crate::types::Pet;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use test_case::test_case;

    fn client(store: Arc<InMemoryPetStore>) -> PetstoreClient {
        PetstoreClient::builder()
            .transport(store)
            .fixture_ids(FixtureIds::Randomized)
            .build()
            .unwrap()
    }

    fn passes(ctx: &mut ScenarioContext) -> ScenarioFuture<'_> {
        Box::pin(async move {
            ctx.fresh_fixture(Pet::reference(0)).await?;
            Ok(())
        })
    }

    fn fails_after_setup(ctx: &mut ScenarioContext) -> ScenarioFuture<'_> {
        Box::pin(async move {
            ctx.fresh_fixture(Pet::reference(0)).await?;
            expect::that(false, "deliberate")
        })
    }

    fn hangs_after_setup(ctx: &mut ScenarioContext) -> ScenarioFuture<'_> {
        Box::pin(async move {
            ctx.fresh_fixture(Pet::reference(0)).await?;
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(())
        })
    }

    fn scenario(name: &'static str, body: crate::scenarios::ScenarioFn) -> Scenario {
        Scenario::new(ScenarioGroup::Read, name, "test", body)
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_the_run() {
        let store = Arc::new(InMemoryPetStore::new());
        let runner = SuiteRunner::new(client(store.clone()));

        let report = runner
            .run(&[
                scenario("fails", fails_after_setup),
                scenario("passes", passes),
            ])
            .await;

        assert_eq!(report.outcomes.len(), 2);
        assert_eq!(report.passed(), 1);
        assert_eq!(report.failed(), 1);
        assert!(!report.all_passed());
        let failed = report.outcome("read/fails").unwrap();
        assert!(matches!(
            failed.verdict,
            Verdict::Failed {
                kind: FailureKind::Assertion,
                ..
            }
        ));
        assert!(failed.to_string().contains("expected: test"));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_timeout_still_tears_down() {
        let store = Arc::new(InMemoryPetStore::new());
        let runner = SuiteRunner::new(client(store.clone())).with_config(
            RunnerConfig::default().with_scenario_timeout(Duration::from_millis(100)),
        );

        let outcome = runner.run_one(&scenario("hangs", hangs_after_setup)).await;

        assert!(matches!(
            outcome.verdict,
            Verdict::Failed {
                kind: FailureKind::Timeout,
                ..
            }
        ));
        assert_eq!(outcome.fixture_ids.len(), 1);
        assert!(outcome.teardown_errors.is_empty());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_teardown_reports_fixtures_left_behind() {
        let store = Arc::new(InMemoryPetStore::new());
        let runner = SuiteRunner::new(client(store.clone()));
        let mut ctx = ScenarioContext::new(runner.client.clone());
        passes(&mut ctx).await.unwrap();
        let id = ctx.fixture_ids()[0];
        store.fail_next(HttpMethod::Delete, format!("pet/{id}"), MockFailure::Connection);

        let errors = runner.teardown(&mut ctx).await;

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].0, id);
        assert!(store.contains(id));
    }

    /// Delegates to a store, stalling deletes once `stall` is set.
    struct StallingDeletes {
        store: Arc<InMemoryPetStore>,
        stall: AtomicBool,
    }

    #[async_trait::async_trait]
    impl HttpTransport for StallingDeletes {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            if request.method == HttpMethod::Delete && self.stall.load(Ordering::SeqCst) {
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
            self.store.send(request).await
        }
    }

    #[tokio::test]
    async fn test_teardown_timeout_reports_pets_recreated_after_setup() {
        let store = Arc::new(InMemoryPetStore::new());
        let transport = Arc::new(StallingDeletes {
            store: store.clone(),
            stall: AtomicBool::new(false),
        });
        let client = PetstoreClient::builder()
            .transport(transport.clone())
            .build()
            .unwrap();
        let runner = SuiteRunner::new(client.clone()).with_config(
            RunnerConfig::default().with_teardown_timeout(Duration::from_millis(100)),
        );
        let mut ctx = ScenarioContext::new(client);
        let id = ctx.fresh_id();
        ctx.ensure_absent(id).await.unwrap();
        ctx.pets()
            .create_raw(WriteRequest::json(&Pet::reference(id).to_value()))
            .await
            .unwrap();
        transport.stall.store(true, Ordering::SeqCst);

        let errors = runner.teardown(&mut ctx).await;

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].0, id);
        assert!(errors[0].1.is_transport());
        assert!(store.contains(id));
    }

    #[tokio::test]
    async fn test_filter_selects_by_id_substring() {
        let store = Arc::new(InMemoryPetStore::new());
        let runner = SuiteRunner::new(client(store))
            .with_config(RunnerConfig::default().with_filter("read/pass"));

        let report = runner
            .run(&[scenario("fails", fails_after_setup), scenario("passes", passes)])
            .await;

        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(report.outcomes[0].name, "passes");
        assert!(report.all_passed());
        assert!(report.summary().starts_with("1 scenarios, 1 passed, 0 failed"));
    }

    #[test_case(PetstoreError::assertion("x") => FailureKind::Assertion; "assertion")]
    #[test_case(TransportError::Timeout { timeout: Duration::from_secs(1) }.into() => FailureKind::Timeout; "timeout")]
    #[test_case(TransportError::Connection { message: "refused".into() }.into() => FailureKind::Transport; "connection")]
    #[test_case(PetstoreError::NotFound { message: "Pet not found".into() } => FailureKind::Api; "api")]
    fn test_failure_kind(error: PetstoreError) -> FailureKind {
        FailureKind::of(&error)
    }

    #[test]
    fn test_reconciliation_failure_kind() {
        let error = PetstoreError::assertion("mismatch")
            .during(crate::errors::ReconcileStep::Create, crate::errors::FixtureId::Known(1));
        assert_eq!(FailureKind::of(&error), FailureKind::Reconciliation);
    }
}
