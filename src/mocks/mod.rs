//! Mock implementations for testing.
//!
//! `MockTransport` replays scripted responses and records what was sent.
//! `InMemoryPetStore` is a stateful stand-in that honours the pet store
//! contract, so whole scenarios can run without the network.

mod petstore;

pub use petstore::{InMemoryPetStore, DEFAULT_EMPTY_SEGMENT_STATUS};

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use crate::transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, TransportError};
use crate::types::ApiMessage;

/// Mock HTTP transport for testing.
pub struct MockTransport {
    replies: Mutex<Vec<MockReply>>,
    requests: Mutex<Vec<RecordedRequest>>,
    default_response: Mutex<Option<MockResponse>>,
}

/// A recorded request.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Request path.
    pub path: String,
    /// Query parameters.
    pub query: Vec<(String, String)>,
    /// Request body.
    pub body: Option<Vec<u8>>,
    /// Request headers.
    pub headers: HashMap<String, String>,
}

impl From<&HttpRequest> for RecordedRequest {
    fn from(request: &HttpRequest) -> Self {
        Self {
            method: request.method,
            path: request.path.clone(),
            query: request.query.clone(),
            body: request.body.clone(),
            headers: request.headers.clone(),
        }
    }
}

/// A mock response.
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HashMap<String, String>,
    /// Response body.
    pub body: Vec<u8>,
}

impl MockResponse {
    /// Creates a successful JSON response.
    pub fn json<T: serde::Serialize>(value: &T) -> Self {
        Self::json_with_status(200, value)
    }

    /// Creates a JSON response with a custom status.
    pub fn json_with_status<T: serde::Serialize>(status: u16, value: &T) -> Self {
        let body = serde_json::to_vec(value).unwrap_or_default();
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());

        Self {
            status,
            headers,
            body,
        }
    }

    /// Creates a `{code, type, message}` response, the store's error shape.
    pub fn message(status: u16, code: i64, kind: &str, message: &str) -> Self {
        Self::json_with_status(status, &ApiMessage::new(code, kind, message))
    }

    /// Creates an empty response.
    pub fn empty(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    /// Adds a header.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }
}

impl From<MockResponse> for HttpResponse {
    fn from(response: MockResponse) -> Self {
        HttpResponse {
            status: response.status,
            headers: response.headers,
            body: response.body,
        }
    }
}

/// A transport-level failure to replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    /// The request timed out.
    Timeout,
    /// The connection could not be established.
    Connection,
}

impl MockFailure {
    pub(crate) fn to_error(self) -> TransportError {
        match self {
            MockFailure::Timeout => TransportError::Timeout {
                timeout: Duration::from_secs(30),
            },
            MockFailure::Connection => TransportError::Connection {
                message: "connection refused".to_string(),
            },
        }
    }
}

#[derive(Debug, Clone)]
enum MockReply {
    Response(MockResponse),
    Failure(MockFailure),
}

impl MockTransport {
    /// Creates a new mock transport.
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
            default_response: Mutex::new(None),
        }
    }

    /// Queues a response.
    pub fn queue(&self, response: MockResponse) {
        self.replies.lock().unwrap().push(MockReply::Response(response));
    }

    /// Queues a JSON response.
    pub fn queue_json<T: serde::Serialize>(&self, value: &T) {
        self.queue(MockResponse::json(value));
    }

    /// Queues a transport failure.
    pub fn queue_failure(&self, failure: MockFailure) {
        self.replies.lock().unwrap().push(MockReply::Failure(failure));
    }

    /// Sets the default response.
    pub fn set_default(&self, response: MockResponse) {
        *self.default_response.lock().unwrap() = Some(response);
    }

    /// Gets all recorded requests.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Gets the last recorded request.
    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    /// Returns the number of requests made.
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn next_reply(&self) -> MockReply {
        let mut replies = self.replies.lock().unwrap();
        if replies.is_empty() {
            MockReply::Response(
                self.default_response
                    .lock()
                    .unwrap()
                    .clone()
                    .unwrap_or_else(|| MockResponse::message(500, 500, "error", "No mock response configured")),
            )
        } else {
            replies.remove(0)
        }
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(RecordedRequest::from(&request));

        match self.next_reply() {
            MockReply::Response(response) => Ok(response.into()),
            MockReply::Failure(failure) => Err(failure.to_error()),
        }
    }
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport")
            .field("request_count", &self.request_count())
            .finish()
    }
}
