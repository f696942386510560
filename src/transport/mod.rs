//! HTTP transport layer for the pet store client.
//!
//! Provides the transport abstraction every API call goes through, and the
//! reqwest-backed implementation used against real deployments.

mod http;

pub use http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, HttpTransportImpl};

use std::time::Duration;

/// Transport error types.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Connection error.
    #[error("Connection error: {message}")]
    Connection {
        /// Error message.
        message: String,
    },

    /// Timeout error.
    #[error("Timeout after {timeout:?}")]
    Timeout {
        /// Timeout duration.
        timeout: Duration,
    },

    /// Invalid response.
    #[error("Invalid response: {message}")]
    InvalidResponse {
        /// Error message.
        message: String,
    },
}

/// Header names whose values never reach the logs.
const SENSITIVE_HEADERS: &[&str] = &["api_key", "authorization"];

/// Returns a copy of `headers` with credential values masked.
pub(crate) fn redact_headers<'a>(
    headers: impl IntoIterator<Item = (&'a String, &'a String)>,
) -> Vec<(String, String)> {
    headers
        .into_iter()
        .map(|(name, value)| {
            let value = if SENSITIVE_HEADERS
                .iter()
                .any(|sensitive| name.eq_ignore_ascii_case(sensitive))
            {
                "***".to_string()
            } else {
                value.clone()
            };
            (name.clone(), value)
        })
        .collect()
}
