//! Fixture reconciliation.
//!
//! Drives one pet identity on the external store into a desired existence
//! state and reads it back before returning. A prior run may have left the
//! identity in either state; both are tolerated. Any other outcome is a
//! [`PetstoreError::Reconciliation`] that aborts the owning scenario.

mod ids;

pub use ids::{IdAllocator, RANDOM_ID_RANGE};

use serde_json::Value;
use tracing::instrument;

use crate::errors::{FixtureId, PetstoreError, PetstoreResult, ReconcileStep, PET_NOT_FOUND};
use crate::matching::contains_subset;
use crate::services::{PetService, WriteRequest};
use crate::transport::HttpResponse;
use crate::types::{project_known_fields, Pet};

/// Existence state a scenario needs before its assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DesiredState {
    /// Present and containing at least this shape.
    Present(Pet),
    /// Not held by the store.
    Absent,
}

/// Last observed state of a fixture identity.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FixtureState {
    /// Not yet observed; a previous run may have left anything behind.
    #[default]
    Unknown,
    /// Confirmed absent.
    Absent,
    /// Confirmed present with this record.
    Present(Pet),
}

/// Drives fixture identities into a desired state.
#[derive(Debug, Clone)]
pub struct FixtureReconciler {
    pets: PetService,
}

impl FixtureReconciler {
    /// Creates a reconciler over the given pet service.
    pub fn new(pets: PetService) -> Self {
        Self { pets }
    }

    /// Makes sure the store does not hold `id`.
    ///
    /// A delete answered with 200 or 404 both count as success. The read-back
    /// must then answer 404 with "Pet not found".
    #[instrument(skip(self))]
    pub async fn ensure_absent(&self, id: i64) -> PetstoreResult<()> {
        let key = FixtureId::Known(id);
        let segment = id.to_string();

        let deleted = self
            .pets
            .delete_raw(&segment, false)
            .await
            .map_err(|e| e.during(ReconcileStep::Delete, key))?;
        if !matches!(deleted.status, 200 | 404) {
            return Err(PetstoreError::from_response(&deleted).during(ReconcileStep::Delete, key));
        }

        let read = self
            .pets
            .get_raw(&segment)
            .await
            .map_err(|e| e.during(ReconcileStep::ConfirmAbsent, key))?;
        if read.status != 404 || read.message().as_deref() != Some(PET_NOT_FOUND) {
            return Err(
                PetstoreError::from_response(&read).during(ReconcileStep::ConfirmAbsent, key)
            );
        }

        tracing::debug!(id, deleted = deleted.status == 200, "Fixture absent");
        Ok(())
    }

    /// Creates `shape` under its caller-assigned identity and confirms it.
    ///
    /// Both the create echo and the read-back must contain `shape`.
    #[instrument(skip(self, shape), fields(id = ?shape.id))]
    pub async fn ensure_present(&self, shape: &Pet) -> PetstoreResult<Pet> {
        let Some(id) = shape.id else {
            return Err(PetstoreError::configuration(
                "ensure_present needs a caller-assigned id; use create_and_capture instead",
            ));
        };
        let key = FixtureId::Known(id);
        let expected = shape.to_value();

        let created = self
            .pets
            .create_raw(WriteRequest::json(&expected))
            .await
            .map_err(|e| e.during(ReconcileStep::Create, key))?;
        let echoed = expect_ok_json(&created).map_err(|e| e.during(ReconcileStep::Create, key))?;
        expect_subset(&echoed, &expected).map_err(|e| e.during(ReconcileStep::Create, key))?;

        let confirmed = self.confirm_present(id, &expected).await?;
        tracing::debug!(id, "Fixture present");
        serde_json::from_value(confirmed)
            .map_err(|e| PetstoreError::from(e).during(ReconcileStep::ConfirmPresent, key))
    }

    /// Creates `shape` without a caller-assigned identity and returns the one
    /// the server assigned.
    ///
    /// Used for payloads whose identity cannot be predicted, such as `{}`.
    /// Fields outside the pet schema are sent but not expected back.
    #[instrument(skip(self, shape))]
    pub async fn create_and_capture(&self, shape: &Value) -> PetstoreResult<i64> {
        let expected = project_known_fields(shape);

        let created = self
            .pets
            .create_raw(WriteRequest::json(shape))
            .await
            .map_err(|e| e.during(ReconcileStep::Create, FixtureId::Pending))?;
        let echoed = expect_ok_json(&created)
            .map_err(|e| e.during(ReconcileStep::Create, FixtureId::Pending))?;

        let id = echoed.get("id").and_then(Value::as_i64).ok_or_else(|| {
            PetstoreError::assertion(format!("create echoed no numeric id: {echoed}"))
                .during(ReconcileStep::Create, FixtureId::Pending)
        })?;
        let key = FixtureId::Known(id);
        expect_subset(&echoed, &expected).map_err(|e| e.during(ReconcileStep::Create, key))?;

        self.confirm_present(id, &expected).await?;
        tracing::debug!(id, "Captured server-assigned fixture");
        Ok(id)
    }

    /// Drives `id` into `desired`, passing through `Absent` first.
    pub async fn reconcile(&self, id: i64, desired: &DesiredState) -> PetstoreResult<FixtureState> {
        self.ensure_absent(id).await?;
        match desired {
            DesiredState::Absent => Ok(FixtureState::Absent),
            DesiredState::Present(shape) => {
                let shape = shape.clone().with_id(id);
                let pet = self.ensure_present(&shape).await?;
                Ok(FixtureState::Present(pet))
            }
        }
    }

    async fn confirm_present(&self, id: i64, expected: &Value) -> PetstoreResult<Value> {
        let key = FixtureId::Known(id);
        let read = self
            .pets
            .get_raw(&id.to_string())
            .await
            .map_err(|e| e.during(ReconcileStep::ConfirmPresent, key))?;
        let body = expect_ok_json(&read).map_err(|e| e.during(ReconcileStep::ConfirmPresent, key))?;
        expect_subset(&body, expected).map_err(|e| e.during(ReconcileStep::ConfirmPresent, key))?;
        Ok(body)
    }
}

fn expect_ok_json(response: &HttpResponse) -> PetstoreResult<Value> {
    if response.status != 200 {
        return Err(PetstoreError::from_response(response));
    }
    Ok(response.json()?)
}

fn expect_subset(actual: &Value, expected: &Value) -> PetstoreResult<()> {
    contains_subset(actual, expected)
        .map_err(|mismatch| PetstoreError::assertion(format!("response is not a superset: {mismatch}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PetstoreConfig;
    use crate::mocks::{InMemoryPetStore, MockFailure, MockResponse, MockTransport};
    use crate::transport::HttpMethod;
    use serde_json::json;
    use std::sync::Arc;

    fn reconciler(transport: Arc<dyn crate::transport::HttpTransport>) -> FixtureReconciler {
        FixtureReconciler::new(PetService::new(transport, Arc::new(PetstoreConfig::default())))
    }

    fn not_found() -> MockResponse {
        MockResponse::message(404, 1, "error", PET_NOT_FOUND)
    }

    #[tokio::test]
    async fn test_ensure_absent_accepts_200_or_404() {
        for delete_status in [200, 404] {
            let transport = Arc::new(MockTransport::new());
            transport.queue(MockResponse::message(delete_status, 1, "unknown", "100"));
            transport.queue(not_found());

            reconciler(transport.clone()).ensure_absent(100).await.unwrap();

            let requests = transport.requests();
            assert_eq!(requests[0].method, HttpMethod::Delete);
            assert_eq!(requests[1].method, HttpMethod::Get);
            assert_eq!(requests[1].path, "pet/100");
        }
    }

    #[tokio::test]
    async fn test_ensure_absent_rejects_other_delete_status() {
        let transport = Arc::new(MockTransport::new());
        transport.queue(MockResponse::message(500, 500, "unknown", "boom"));

        let error = reconciler(transport.clone()).ensure_absent(100).await.unwrap_err();

        assert!(matches!(
            error,
            PetstoreError::Reconciliation { step: ReconcileStep::Delete, .. }
        ));
        assert_eq!(transport.request_count(), 1, "must not read back after a failed delete");
    }

    #[tokio::test]
    async fn test_ensure_absent_fails_when_pet_survives() {
        let transport = Arc::new(MockTransport::new());
        transport.queue(MockResponse::message(200, 200, "unknown", "100"));
        transport.queue(MockResponse::json(&Pet::reference(100)));

        let error = reconciler(transport).ensure_absent(100).await.unwrap_err();

        assert!(matches!(
            error,
            PetstoreError::Reconciliation { step: ReconcileStep::ConfirmAbsent, .. }
        ));
        assert_eq!(error.status(), Some(200));
    }

    #[tokio::test]
    async fn test_ensure_absent_requires_exact_message() {
        let transport = Arc::new(MockTransport::new());
        transport.queue(MockResponse::message(404, 1, "error", PET_NOT_FOUND));
        transport.queue(MockResponse::message(404, 1, "error", "Route not found"));

        let error = reconciler(transport).ensure_absent(100).await.unwrap_err();
        assert!(error.is_reconciliation());
    }

    #[tokio::test]
    async fn test_transport_failure_is_reported_as_transport() {
        let transport = Arc::new(MockTransport::new());
        transport.queue_failure(MockFailure::Timeout);

        let error = reconciler(transport).ensure_absent(100).await.unwrap_err();

        assert!(error.is_reconciliation());
        assert!(error.is_transport());
    }

    #[tokio::test]
    async fn test_ensure_present_checks_echo_and_read_back() {
        let store = Arc::new(InMemoryPetStore::new());

        let pet = reconciler(store.clone())
            .ensure_present(&Pet::reference(100))
            .await
            .unwrap();

        assert_eq!(pet, Pet::reference(100));
        assert!(store.contains(100));
    }

    #[tokio::test]
    async fn test_ensure_present_rejects_altered_echo() {
        let transport = Arc::new(MockTransport::new());
        let mut altered = Pet::reference(100);
        altered.name = Some("Other".to_string());
        transport.queue_json(&altered);

        let error = reconciler(transport)
            .ensure_present(&Pet::reference(100))
            .await
            .unwrap_err();

        assert!(matches!(
            error,
            PetstoreError::Reconciliation { step: ReconcileStep::Create, .. }
        ));
        assert!(error.to_string().contains("$.name"));
    }

    #[tokio::test]
    async fn test_ensure_present_requires_id() {
        let store = Arc::new(InMemoryPetStore::new());
        let result = reconciler(store)
            .ensure_present(&Pet::reference(1).without_id())
            .await;
        assert!(matches!(result, Err(PetstoreError::Configuration { .. })));
    }

    #[tokio::test]
    async fn test_create_and_capture_returns_server_id() {
        let store = Arc::new(InMemoryPetStore::new());
        let reconciler = reconciler(store.clone());

        let id = reconciler
            .create_and_capture(&json!({"test": "test"}))
            .await
            .unwrap();

        assert!(store.contains(id));
        reconciler.ensure_absent(id).await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_reconcile_walks_state_machine() {
        let store = Arc::new(InMemoryPetStore::new());
        let reconciler = reconciler(store.clone());
        let shape = Pet::reference(0);

        let state = reconciler
            .reconcile(42, &DesiredState::Present(shape.clone()))
            .await
            .unwrap();
        assert_eq!(state, FixtureState::Present(shape.with_id(42)));

        // Present again over an existing record: passes through Absent first.
        let state = reconciler
            .reconcile(42, &DesiredState::Present(Pet::reference(42)))
            .await
            .unwrap();
        assert!(matches!(state, FixtureState::Present(_)));

        let state = reconciler.reconcile(42, &DesiredState::Absent).await.unwrap();
        assert_eq!(state, FixtureState::Absent);
        assert!(!store.contains(42));
    }
}
