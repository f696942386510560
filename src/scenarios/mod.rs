//! Conformance scenarios for the `/pet` endpoints, and the runner executing them.
//!
//! A scenario is a plain async function over a [`ScenarioContext`]. It obtains
//! its own fixture identities, reconciles them, exercises one behaviour of the
//! API and returns the first failed expectation. The runner tears down every
//! identity the scenario touched afterwards, whatever the outcome.

mod context;
mod create;
mod delete;
pub mod expect;
mod read;
mod runner;
mod search;
mod update;

pub use context::ScenarioContext;
pub use runner::{FailureKind, RunnerConfig, ScenarioOutcome, SuiteReport, SuiteRunner, Verdict};

use futures::future::BoxFuture;

use crate::errors::PetstoreResult;

/// Identity one past `i64::MAX`, rejected by every operation taking an id.
pub const OVERFLOW_ID: &str = "9223372036854775808";

/// Future returned by a scenario body.
pub type ScenarioFuture<'a> = BoxFuture<'a, PetstoreResult<()>>;

/// Scenario body.
pub type ScenarioFn = for<'a> fn(&'a mut ScenarioContext) -> ScenarioFuture<'a>;

/// Endpoint a scenario exercises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScenarioGroup {
    /// `GET /pet/{petId}`
    Read,
    /// `GET /pet/findByStatus`
    Search,
    /// `POST /pet`
    Create,
    /// `PUT /pet`
    Update,
    /// `DELETE /pet/{petId}`
    Delete,
}

impl ScenarioGroup {
    /// Short lowercase name, used in filters.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioGroup::Read => "read",
            ScenarioGroup::Search => "search",
            ScenarioGroup::Create => "create",
            ScenarioGroup::Update => "update",
            ScenarioGroup::Delete => "delete",
        }
    }
}

impl std::fmt::Display for ScenarioGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One conformance scenario.
#[derive(Clone, Copy)]
pub struct Scenario {
    /// Endpoint exercised.
    pub group: ScenarioGroup,
    /// Unique name within the group.
    pub name: &'static str,
    /// Behaviour asserted.
    pub description: &'static str,
    body: ScenarioFn,
}

impl Scenario {
    /// Creates a scenario.
    pub const fn new(
        group: ScenarioGroup,
        name: &'static str,
        description: &'static str,
        body: ScenarioFn,
    ) -> Self {
        Self {
            group,
            name,
            description,
            body,
        }
    }

    /// `group/name`, unique across the catalogue.
    pub fn id(&self) -> String {
        format!("{}/{}", self.group, self.name)
    }

    /// Runs the scenario body.
    pub fn run<'a>(&self, ctx: &'a mut ScenarioContext) -> ScenarioFuture<'a> {
        (self.body)(ctx)
    }
}

impl std::fmt::Debug for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scenario")
            .field("group", &self.group)
            .field("name", &self.name)
            .finish()
    }
}

/// Every scenario, grouped by endpoint.
pub fn catalog() -> Vec<Scenario> {
    let mut scenarios = Vec::new();
    scenarios.extend(read::scenarios());
    scenarios.extend(search::scenarios());
    scenarios.extend(create::scenarios());
    scenarios.extend(update::scenarios());
    scenarios.extend(delete::scenarios());
    scenarios
}

/// Scenarios of one group.
pub fn group(group: ScenarioGroup) -> Vec<Scenario> {
    catalog().into_iter().filter(|s| s.group == group).collect()
}

/// Tracks the identity of a create that was expected to fail but succeeded,
/// so teardown still removes it.
fn track_if_created(ctx: &mut ScenarioContext, response: &crate::transport::HttpResponse) {
    if response.status == 200 {
        if let Ok(body) = response.json::<serde_json::Value>() {
            ctx.track_echoed(&body);
        }
    }
}
