//! Shared helpers for the integration tests.
//!
//! `StoreResponder` serves an [`InMemoryPetStore`] behind a wiremock server, so
//! the reqwest transport can be exercised end to end without the network.

#![allow(dead_code)]

use petstore_conformance::mocks::InMemoryPetStore;
use petstore_conformance::transport::HttpRequest;
use petstore_conformance::{FixtureIds, PetstoreClient};
use std::sync::Arc;
use wiremock::matchers::any;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Answers every request from an in-memory store.
pub struct StoreResponder {
    store: Arc<InMemoryPetStore>,
}

impl StoreResponder {
    pub fn new(store: Arc<InMemoryPetStore>) -> Self {
        Self { store }
    }
}

impl Respond for StoreResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let response = self.store.handle(&to_http_request(request));

        let mut template = ResponseTemplate::new(response.status);
        for (name, value) in &response.headers {
            if !name.eq_ignore_ascii_case("content-type") {
                template = template.insert_header(name.as_str(), value.as_str());
            }
        }
        match response.headers.get("content-type") {
            Some(content_type) => template.set_body_raw(response.body, content_type),
            None => template.set_body_bytes(response.body),
        }
    }
}

fn to_http_request(request: &Request) -> HttpRequest {
    let path = request.url.path().trim_start_matches('/').to_string();
    let mut converted = match request.method.as_str() {
        "POST" => HttpRequest::post(path),
        "PUT" => HttpRequest::put(path),
        "DELETE" => HttpRequest::delete(path),
        _ => HttpRequest::get(path),
    };
    for (name, value) in request.url.query_pairs() {
        converted = converted.with_query(name, value);
    }
    for (name, value) in &request.headers {
        if let Ok(value) = value.to_str() {
            converted = converted.with_header(name.as_str(), value);
        }
    }
    if !request.body.is_empty() {
        converted = converted.with_body(request.body.clone());
    }
    converted
}

/// Starts a mock server backed by `store`.
pub async fn serve(store: Arc<InMemoryPetStore>) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(StoreResponder::new(store))
        .mount(&server)
        .await;
    server
}

/// Builds a client talking to `server` over HTTP.
pub fn http_client(server: &MockServer) -> PetstoreClient {
    PetstoreClient::builder()
        .base_url(server.uri())
        .fixture_ids(FixtureIds::Randomized)
        .build()
        .expect("Failed to build client")
}

/// Builds a client calling `store` directly.
pub fn in_memory_client(store: Arc<InMemoryPetStore>) -> PetstoreClient {
    PetstoreClient::builder()
        .transport(store)
        .fixture_ids(FixtureIds::Randomized)
        .build()
        .expect("Failed to build client")
}
