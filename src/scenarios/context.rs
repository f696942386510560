//! Per-scenario state: the client, and every fixture identity touched.

use serde_json::Value;
use std::collections::BTreeMap;

use crate::client::PetstoreClient;
use crate::errors::{PetstoreError, PetstoreResult};
use crate::fixtures::FixtureState;
use crate::services::PetService;
use crate::types::Pet;

/// State owned by one scenario run.
///
/// Every identity a scenario creates or reconciles is tracked here, and
/// [`ScenarioContext::teardown`] drives all of them back to absent whether or
/// not the scenario passed.
#[derive(Debug)]
pub struct ScenarioContext {
    client: PetstoreClient,
    fixtures: BTreeMap<i64, FixtureState>,
}

impl ScenarioContext {
    /// Creates a context with no tracked fixtures.
    pub fn new(client: PetstoreClient) -> Self {
        Self {
            client,
            fixtures: BTreeMap::new(),
        }
    }

    /// Returns the client.
    pub fn client(&self) -> &PetstoreClient {
        &self.client
    }

    /// Returns the pet service.
    pub fn pets(&self) -> &PetService {
        self.client.pets()
    }

    /// Allocates a fixture identity and tracks it for teardown.
    pub fn fresh_id(&mut self) -> i64 {
        let id = self.client.fresh_id();
        self.track(id);
        id
    }

    /// Tracks an identity created outside the reconciler, e.g. by a raw create.
    pub fn track(&mut self, id: i64) {
        self.fixtures.entry(id).or_default();
    }

    /// Tracks the `id` echoed in a create response body, if there is one.
    pub fn track_echoed(&mut self, body: &Value) -> Option<i64> {
        let id = body.get("id").and_then(Value::as_i64)?;
        self.track(id);
        Some(id)
    }

    /// Reconciles `id` to absent.
    pub async fn ensure_absent(&mut self, id: i64) -> PetstoreResult<()> {
        self.track(id);
        self.client.reconciler().ensure_absent(id).await?;
        self.fixtures.insert(id, FixtureState::Absent);
        Ok(())
    }

    /// Reconciles `shape` to present under its own identity.
    pub async fn ensure_present(&mut self, shape: &Pet) -> PetstoreResult<Pet> {
        if let Some(id) = shape.id {
            self.track(id);
        }
        let pet = self.client.reconciler().ensure_present(shape).await?;
        if let Some(id) = pet.id {
            self.fixtures.insert(id, FixtureState::Present(pet.clone()));
        }
        Ok(pet)
    }

    /// Allocates a fresh identity and reconciles `shape` to present under it.
    pub async fn fresh_fixture(&mut self, shape: Pet) -> PetstoreResult<Pet> {
        let id = self.fresh_id();
        self.ensure_absent(id).await?;
        self.ensure_present(&shape.with_id(id)).await
    }

    /// Creates `shape` with a server-assigned identity and tracks it.
    pub async fn create_and_capture(&mut self, shape: &Value) -> PetstoreResult<i64> {
        let id = match self.client.reconciler().create_and_capture(shape).await {
            Ok(id) => id,
            Err(error) => {
                if let Some(id) = error.fixture_id() {
                    self.track(id);
                }
                return Err(error);
            }
        };
        self.track(id);
        if let Ok(pet) = serde_json::from_value::<Pet>(crate::types::project_known_fields(shape)) {
            self.fixtures
                .insert(id, FixtureState::Present(pet.with_id(id)));
        }
        Ok(id)
    }

    /// Records that `id` was removed by the scenario itself.
    pub fn mark_absent(&mut self, id: i64) {
        self.fixtures.insert(id, FixtureState::Absent);
    }

    /// Returns the last observed state of `id`.
    pub fn state(&self, id: i64) -> Option<&FixtureState> {
        self.fixtures.get(&id)
    }

    /// Returns every tracked identity.
    pub fn fixture_ids(&self) -> Vec<i64> {
        self.fixtures.keys().copied().collect()
    }

    /// Drives every tracked identity to absent.
    ///
    /// Every identity starts over as [`FixtureState::Unknown`], since raw calls
    /// in the scenario body may have changed it after the last observation;
    /// only identities confirmed here end up [`FixtureState::Absent`]. A
    /// failure on one identity does not stop the others.
    pub async fn teardown(&mut self) -> Vec<(i64, PetstoreError)> {
        for state in self.fixtures.values_mut() {
            *state = FixtureState::Unknown;
        }
        let mut failures = Vec::new();
        for id in self.fixture_ids() {
            match self.client.reconciler().ensure_absent(id).await {
                Ok(()) => {
                    self.fixtures.insert(id, FixtureState::Absent);
                }
                Err(error) => {
                    tracing::warn!(id, error = %error, "Teardown could not remove fixture");
                    failures.push((id, error));
                }
            }
        }
        failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FixtureIds;
    use crate::mocks::{InMemoryPetStore, MockFailure};
    use crate::transport::HttpMethod;
    use serde_json::json;
    use std::sync::Arc;

    fn context(store: Arc<InMemoryPetStore>) -> ScenarioContext {
        let client = PetstoreClient::builder()
            .transport(store)
            .fixture_ids(FixtureIds::Randomized)
            .build()
            .unwrap();
        ScenarioContext::new(client)
    }

    #[tokio::test]
    async fn test_teardown_removes_every_tracked_fixture() {
        let store = Arc::new(InMemoryPetStore::new());
        let mut ctx = context(store.clone());

        let pet = ctx.fresh_fixture(Pet::reference(0)).await.unwrap();
        let captured = ctx.create_and_capture(&json!({})).await.unwrap();
        assert_eq!(store.len(), 2);
        assert!(matches!(
            ctx.state(pet.id.unwrap()),
            Some(FixtureState::Present(_))
        ));

        let failures = ctx.teardown().await;

        assert!(failures.is_empty());
        assert!(store.is_empty());
        assert_eq!(ctx.state(captured), Some(&FixtureState::Absent));
    }

    #[tokio::test]
    async fn test_teardown_continues_past_failures() {
        let store = Arc::new(InMemoryPetStore::new());
        let mut ctx = context(store.clone());

        let first = ctx.fresh_fixture(Pet::reference(0)).await.unwrap().id.unwrap();
        let second = ctx.fresh_fixture(Pet::reference(0)).await.unwrap().id.unwrap();
        let (failing, surviving) = if first < second { (first, second) } else { (second, first) };
        store.fail_next(HttpMethod::Delete, format!("pet/{failing}"), MockFailure::Connection);

        let failures = ctx.teardown().await;

        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, failing);
        assert!(failures[0].1.is_transport());
        assert!(!store.contains(surviving));
    }

    #[test]
    fn test_track_echoed_ignores_missing_id() {
        let store = Arc::new(InMemoryPetStore::new());
        let mut ctx = context(store);

        assert_eq!(ctx.track_echoed(&json!({"id": 5})), Some(5));
        assert_eq!(ctx.track_echoed(&json!({"name": "x"})), None);
        assert_eq!(ctx.fixture_ids(), vec![5]);
    }

    #[tokio::test]
    async fn test_capture_tracks_pet_when_read_back_fails() {
        let store = Arc::new(InMemoryPetStore::new());
        let mut ctx = context(store.clone());
        store.fail_next(
            HttpMethod::Get,
            "pet/9223372000000000000",
            MockFailure::Connection,
        );

        let error = ctx.create_and_capture(&json!({"name": "x"})).await.unwrap_err();
        assert!(error.is_reconciliation());
        assert_eq!(ctx.fixture_ids(), vec![9_223_372_000_000_000_000]);
        assert_eq!(store.len(), 1);

        let failures = ctx.teardown().await;

        assert!(failures.is_empty());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_teardown_forgets_earlier_observations() {
        let store = Arc::new(InMemoryPetStore::new());
        let mut ctx = context(store.clone());
        let id = ctx.fresh_id();
        ctx.ensure_absent(id).await.unwrap();
        ctx.pets()
            .create_raw(crate::services::WriteRequest::json(&Pet::reference(id).to_value()))
            .await
            .unwrap();
        store.fail_next(HttpMethod::Delete, format!("pet/{id}"), MockFailure::Connection);

        let failures = ctx.teardown().await;

        assert_eq!(failures.len(), 1);
        assert_eq!(ctx.state(id), Some(&FixtureState::Unknown));
        assert!(store.contains(id));
    }
}
