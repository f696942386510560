//! In-memory pet store honouring the public deployment's observable contract.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Mutex;

use super::{MockFailure, MockResponse};
use crate::errors::{INVALID_ID_SUPPLIED, INVALID_INPUT, PET_NOT_FOUND, VALIDATION_EXCEPTION};
use crate::transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, TransportError};
use crate::types::PET_FIELDS;

/// Status answered for `GET /pet/` by the public deployment.
pub const DEFAULT_EMPTY_SEGMENT_STATUS: u16 = 405;

const FIRST_ASSIGNED_ID: i64 = 9_223_372_000_000_000_000;

/// Stateful stand-in for the pet store.
///
/// Unknown fields are dropped on write, identities are caller-assigned when
/// given and server-assigned otherwise, and every error carries the same
/// status and message the real service uses.
pub struct InMemoryPetStore {
    state: Mutex<StoreState>,
    faults: Mutex<Vec<Fault>>,
    empty_segment_status: u16,
}

struct StoreState {
    pets: BTreeMap<i64, Value>,
    next_id: i64,
}

struct Fault {
    method: HttpMethod,
    path: String,
    failure: MockFailure,
}

enum ShapeError {
    Id,
    Field,
}

impl InMemoryPetStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(StoreState {
                pets: BTreeMap::new(),
                next_id: FIRST_ASSIGNED_ID,
            }),
            faults: Mutex::new(Vec::new()),
            empty_segment_status: DEFAULT_EMPTY_SEGMENT_STATUS,
        }
    }

    /// Answers `GET /pet/` with `status` instead of 405, like other deployments.
    pub fn with_empty_segment_status(mut self, status: u16) -> Self {
        self.empty_segment_status = status;
        self
    }

    /// Makes the next request matching `method` and `path` fail at transport level.
    pub fn fail_next(&self, method: HttpMethod, path: impl Into<String>, failure: MockFailure) {
        self.faults.lock().unwrap().push(Fault {
            method,
            path: path.into(),
            failure,
        });
    }

    /// Returns the stored record for `id`.
    pub fn get(&self, id: i64) -> Option<Value> {
        self.state.lock().unwrap().pets.get(&id).cloned()
    }

    /// Returns true if the store holds `id`.
    pub fn contains(&self, id: i64) -> bool {
        self.state.lock().unwrap().pets.contains_key(&id)
    }

    /// Returns the identities currently held.
    pub fn ids(&self) -> Vec<i64> {
        self.state.lock().unwrap().pets.keys().copied().collect()
    }

    /// Returns the number of stored pets.
    pub fn len(&self) -> usize {
        self.state.lock().unwrap().pets.len()
    }

    /// Returns true if no pets are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Handles one request against the store.
    pub fn handle(&self, request: &HttpRequest) -> MockResponse {
        let path = request.path.trim_start_matches('/');
        let Some(rest) = path.strip_prefix("pet") else {
            return MockResponse::message(404, 404, "unknown", "not found");
        };

        match (request.method, rest) {
            (HttpMethod::Post, "" | "/") => self.create(request),
            (HttpMethod::Put, "" | "/") => self.update(request),
            (HttpMethod::Get, "/") => MockResponse::empty(self.empty_segment_status),
            (_, "" | "/") => MockResponse::empty(405),
            (method, rest) if rest.starts_with('/') && !rest[1..].contains('/') => {
                let segment = &rest[1..];
                match method {
                    HttpMethod::Get if segment == "findByStatus" => self.find_by_status(request),
                    HttpMethod::Get => self.read(segment),
                    HttpMethod::Delete => self.delete(segment),
                    HttpMethod::Post => {
                        MockResponse::message(415, 415, "unknown", "Unsupported Media Type")
                    }
                    HttpMethod::Put => MockResponse::empty(405),
                }
            }
            _ => MockResponse::message(404, 404, "unknown", "not found"),
        }
    }

    fn create(&self, request: &HttpRequest) -> MockResponse {
        if let Some(rejection) = reject_content_type(request) {
            return rejection;
        }
        let Some(body) = request.body.as_deref().filter(|b| !b.is_empty()) else {
            return MockResponse::message(405, 405, "unknown", "no data");
        };
        let Ok(Value::Object(fields)) = serde_json::from_slice::<Value>(body) else {
            return MockResponse::message(400, 400, "unknown", "bad input");
        };

        let (id, record) = match normalize(&fields) {
            Ok(normalized) => normalized,
            Err(_) => return invalid_input(),
        };

        let mut state = self.state.lock().unwrap();
        let id = match id {
            Some(id) if state.pets.contains_key(&id) => return invalid_input(),
            Some(id) => id,
            None => state.assign_id(),
        };
        let record = with_id(record, id);
        state.pets.insert(id, record.clone());
        MockResponse::json(&record)
    }

    fn update(&self, request: &HttpRequest) -> MockResponse {
        if let Some(rejection) = reject_content_type(request) {
            return rejection;
        }
        let fields = match request
            .body
            .as_deref()
            .map(serde_json::from_slice::<Value>)
        {
            Some(Ok(Value::Object(fields))) => fields,
            _ => return validation_exception(),
        };

        let (id, record) = match normalize(&fields) {
            Ok(normalized) => normalized,
            Err(ShapeError::Id) => return invalid_id(),
            Err(ShapeError::Field) => return validation_exception(),
        };
        let Some(id) = id else {
            return validation_exception();
        };

        let mut state = self.state.lock().unwrap();
        if !state.pets.contains_key(&id) {
            return pet_not_found();
        }
        let record = with_id(record, id);
        state.pets.insert(id, record.clone());
        MockResponse::json(&record)
    }

    fn read(&self, segment: &str) -> MockResponse {
        let Ok(id) = segment.parse::<i64>() else {
            return invalid_id();
        };
        match self.get(id) {
            Some(record) => MockResponse::json(&record),
            None => pet_not_found(),
        }
    }

    fn delete(&self, segment: &str) -> MockResponse {
        let Ok(id) = segment.parse::<i64>() else {
            return invalid_id();
        };
        match self.state.lock().unwrap().pets.remove(&id) {
            Some(_) => MockResponse::message(200, 200, "unknown", &id.to_string()),
            None => pet_not_found(),
        }
    }

    fn find_by_status(&self, request: &HttpRequest) -> MockResponse {
        let wanted: Vec<&str> = request
            .query
            .iter()
            .filter(|(name, _)| name == "status")
            .flat_map(|(_, value)| value.split(','))
            .collect();

        let state = self.state.lock().unwrap();
        let matches: Vec<&Value> = state
            .pets
            .values()
            .filter(|pet| {
                pet.get("status")
                    .and_then(Value::as_str)
                    .is_some_and(|status| wanted.contains(&status))
            })
            .collect();
        MockResponse::json(&matches)
    }

    fn take_fault(&self, request: &HttpRequest) -> Option<MockFailure> {
        let mut faults = self.faults.lock().unwrap();
        let index = faults
            .iter()
            .position(|f| f.method == request.method && f.path == request.path)?;
        Some(faults.remove(index).failure)
    }
}

impl StoreState {
    fn assign_id(&mut self) -> i64 {
        while self.pets.contains_key(&self.next_id) {
            self.next_id += 1;
        }
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl Default for InMemoryPetStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for InMemoryPetStore {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        if let Some(failure) = self.take_fault(&request) {
            return Err(failure.to_error());
        }
        Ok(self.handle(&request).into())
    }
}

impl std::fmt::Debug for InMemoryPetStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryPetStore")
            .field("pets", &self.len())
            .field("empty_segment_status", &self.empty_segment_status)
            .finish()
    }
}

/// Validates a write payload and keeps only schema fields.
fn normalize(fields: &Map<String, Value>) -> Result<(Option<i64>, Map<String, Value>), ShapeError> {
    let id = match fields.get("id") {
        None | Some(Value::Null) => None,
        Some(value) => Some(value.as_i64().filter(|id| *id >= 0).ok_or(ShapeError::Id)?),
    };

    let mut record = Map::new();
    for (key, value) in fields {
        if key == "id" || !PET_FIELDS.contains(&key.as_str()) || value.is_null() {
            continue;
        }
        let valid = match key.as_str() {
            "category" => is_named_ref(value),
            "name" | "status" => value.is_string(),
            "photoUrls" => value
                .as_array()
                .is_some_and(|urls| urls.iter().all(Value::is_string)),
            "tags" => value
                .as_array()
                .is_some_and(|tags| tags.iter().all(is_named_ref)),
            _ => true,
        };
        if !valid {
            return Err(ShapeError::Field);
        }
        record.insert(key.clone(), value.clone());
    }
    record
        .entry("photoUrls")
        .or_insert_with(|| Value::Array(Vec::new()));
    record.entry("tags").or_insert_with(|| Value::Array(Vec::new()));

    Ok((id, record))
}

/// `{id: integer, name: string}` with both parts optional.
fn is_named_ref(value: &Value) -> bool {
    let Some(object) = value.as_object() else {
        return false;
    };
    let id_ok = object
        .get("id")
        .map_or(true, |id| id.is_null() || id.as_i64().is_some());
    let name_ok = object
        .get("name")
        .map_or(true, |name| name.is_null() || name.is_string());
    id_ok && name_ok
}

fn with_id(mut record: Map<String, Value>, id: i64) -> Value {
    record.insert("id".to_string(), Value::from(id));
    Value::Object(record)
}

fn reject_content_type(request: &HttpRequest) -> Option<MockResponse> {
    let is_json = request
        .header("content-type")
        .is_some_and(|ct| ct.starts_with("application/json"));
    (!is_json).then(|| MockResponse::message(415, 415, "unknown", "Unsupported Media Type"))
}

fn pet_not_found() -> MockResponse {
    MockResponse::message(404, 1, "error", PET_NOT_FOUND)
}

fn invalid_id() -> MockResponse {
    MockResponse::message(400, 400, "unknown", INVALID_ID_SUPPLIED)
}

fn invalid_input() -> MockResponse {
    MockResponse::message(405, 405, "unknown", INVALID_INPUT)
}

fn validation_exception() -> MockResponse {
    MockResponse::message(405, 405, "unknown", VALIDATION_EXCEPTION)
}
