//! Pet service.
//!
//! Each contract operation comes in two flavours: a `*_raw` call that returns
//! the response untouched, for scenarios asserting on odd statuses, and a
//! typed call that maps non-success statuses into [`PetstoreError`].

use serde_json::Value;
use std::sync::Arc;
use tracing::instrument;

use crate::config::PetstoreConfig;
use crate::errors::{PetstoreError, PetstoreResult};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport};
use crate::types::{Pet, PetStatus};

/// Content type sent with JSON payloads.
pub const JSON_CONTENT_TYPE: &str = "application/json";

const PET_PATH: &str = "pet";

/// Body and headers of a create or update call.
#[derive(Debug, Clone, Default)]
pub struct WriteRequest {
    path_suffix: Option<String>,
    body: Option<Vec<u8>>,
    content_type: Option<String>,
}

impl WriteRequest {
    /// A JSON payload with `content-type: application/json`.
    pub fn json(value: &Value) -> Self {
        Self {
            path_suffix: None,
            body: Some(value.to_string().into_bytes()),
            content_type: Some(JSON_CONTENT_TYPE.to_string()),
        }
    }

    /// Arbitrary bytes with `content-type: application/json`.
    pub fn raw(body: impl Into<Vec<u8>>) -> Self {
        Self {
            path_suffix: None,
            body: Some(body.into()),
            content_type: Some(JSON_CONTENT_TYPE.to_string()),
        }
    }

    /// No body, with `content-type: application/json`.
    pub fn empty() -> Self {
        Self {
            path_suffix: None,
            body: None,
            content_type: Some(JSON_CONTENT_TYPE.to_string()),
        }
    }

    /// Overrides the content type.
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Appends a path segment after `/pet`.
    pub fn path_segment(mut self, segment: impl Into<String>) -> Self {
        self.path_suffix = Some(segment.into());
        self
    }

    fn into_request(self, build: fn(String) -> HttpRequest) -> HttpRequest {
        let path = match self.path_suffix {
            Some(segment) => format!("{PET_PATH}/{segment}"),
            None => PET_PATH.to_string(),
        };
        let mut request = build(path);
        if let Some(content_type) = self.content_type {
            request = request.with_header("content-type", content_type);
        }
        if let Some(body) = self.body {
            request = request.with_body(body);
        }
        request
    }
}

/// Result of a tolerant delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The store held the pet and removed it (200).
    Deleted,
    /// The store did not hold the pet (404).
    AlreadyAbsent,
}

/// Service for the `/pet` endpoints.
#[derive(Clone)]
pub struct PetService {
    transport: Arc<dyn HttpTransport>,
    config: Arc<PetstoreConfig>,
}

impl PetService {
    /// Creates a new pet service.
    pub fn new(transport: Arc<dyn HttpTransport>, config: Arc<PetstoreConfig>) -> Self {
        Self { transport, config }
    }

    async fn send(&self, request: HttpRequest) -> PetstoreResult<HttpResponse> {
        let method = request.method;
        let path = request.path.clone();
        let response = self.transport.send(request).await?;
        tracing::debug!(
            method = method.as_str(),
            path = %path,
            status = response.status,
            "Pet store responded"
        );
        Ok(response)
    }

    /// `POST /pet` with the given payload.
    #[instrument(skip(self, request))]
    pub async fn create_raw(&self, request: WriteRequest) -> PetstoreResult<HttpResponse> {
        self.send(request.into_request(HttpRequest::post)).await
    }

    /// `PUT /pet` with the given payload.
    #[instrument(skip(self, request))]
    pub async fn update_raw(&self, request: WriteRequest) -> PetstoreResult<HttpResponse> {
        self.send(request.into_request(HttpRequest::put)).await
    }

    /// `GET /pet/{segment}`; the segment is sent verbatim.
    #[instrument(skip(self))]
    pub async fn get_raw(&self, segment: &str) -> PetstoreResult<HttpResponse> {
        self.send(HttpRequest::get(format!("{PET_PATH}/{segment}")))
            .await
    }

    /// `DELETE /pet/{segment}`, optionally with the configured `api_key`.
    #[instrument(skip(self))]
    pub async fn delete_raw(&self, segment: &str, with_api_key: bool) -> PetstoreResult<HttpResponse> {
        let mut request = HttpRequest::delete(format!("{PET_PATH}/{segment}"));
        if with_api_key {
            request = request.with_header("api_key", self.config.api_key());
        }
        self.send(request).await
    }

    /// `GET /pet/findByStatus?status={status}`.
    #[instrument(skip(self))]
    pub async fn find_by_status_raw(&self, status: &str) -> PetstoreResult<HttpResponse> {
        self.send(HttpRequest::get(format!("{PET_PATH}/findByStatus")).with_query("status", status))
            .await
    }

    /// Creates a pet from an arbitrary JSON shape and returns the echoed body.
    pub async fn create_value(&self, shape: &Value) -> PetstoreResult<Value> {
        let response = self.create_raw(WriteRequest::json(shape)).await?;
        expect_ok_json(&response)
    }

    /// Creates a pet.
    pub async fn create(&self, pet: &Pet) -> PetstoreResult<Pet> {
        let body = self.create_value(&pet.to_value()).await?;
        Ok(serde_json::from_value(body)?)
    }

    /// Replaces a pet from an arbitrary JSON shape and returns the echoed body.
    pub async fn update_value(&self, shape: &Value) -> PetstoreResult<Value> {
        let response = self.update_raw(WriteRequest::json(shape)).await?;
        expect_ok_json(&response)
    }

    /// Replaces a pet.
    pub async fn update(&self, pet: &Pet) -> PetstoreResult<Pet> {
        let body = self.update_value(&pet.to_value()).await?;
        Ok(serde_json::from_value(body)?)
    }

    /// Reads a pet as raw JSON.
    pub async fn read_value(&self, id: i64) -> PetstoreResult<Value> {
        let response = self.get_raw(&id.to_string()).await?;
        expect_ok_json(&response)
    }

    /// Reads a pet.
    pub async fn read(&self, id: i64) -> PetstoreResult<Pet> {
        let body = self.read_value(id).await?;
        Ok(serde_json::from_value(body)?)
    }

    /// Deletes a pet, treating 404 as already deleted.
    pub async fn delete(&self, id: i64) -> PetstoreResult<DeleteOutcome> {
        let response = self.delete_raw(&id.to_string(), false).await?;
        match response.status {
            200 => Ok(DeleteOutcome::Deleted),
            404 => Ok(DeleteOutcome::AlreadyAbsent),
            _ => Err(PetstoreError::from_response(&response)),
        }
    }

    /// Lists pets with the given status as raw JSON records.
    pub async fn find_by_status(&self, status: PetStatus) -> PetstoreResult<Vec<Value>> {
        let response = self.find_by_status_raw(status.as_str()).await?;
        let body = expect_ok_json(&response)?;
        serde_json::from_value(body).map_err(Into::into)
    }
}

impl std::fmt::Debug for PetService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PetService")
            .field("base_url", &self.config.base_url)
            .finish()
    }
}

fn expect_ok_json(response: &HttpResponse) -> PetstoreResult<Value> {
    if response.status != 200 {
        return Err(PetstoreError::from_response(response));
    }
    Ok(response.json()?)
}
