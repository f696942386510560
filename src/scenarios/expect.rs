//! Expectations used by scenario bodies.
//!
//! Each check returns [`PetstoreError::Assertion`] describing what the
//! response actually carried, so a failed scenario explains itself.

use serde_json::Value;

use crate::errors::{PetstoreError, PetstoreResult};
use crate::matching::contains_subset;
use crate::services::JSON_CONTENT_TYPE;
use crate::transport::HttpResponse;

fn describe(response: &HttpResponse) -> String {
    let body = response.text();
    if body.is_empty() {
        format!("HTTP {} with empty body", response.status)
    } else {
        format!("HTTP {} with body {body}", response.status)
    }
}

/// The status is exactly `expected`.
pub fn status(response: &HttpResponse, expected: u16) -> PetstoreResult<()> {
    status_in(response, &[expected])
}

/// The status is one of `allowed`.
pub fn status_in(response: &HttpResponse, allowed: &[u16]) -> PetstoreResult<()> {
    if allowed.contains(&response.status) {
        Ok(())
    } else {
        Err(PetstoreError::assertion(format!(
            "expected status in {allowed:?}, got {}",
            describe(response)
        )))
    }
}

/// The status is at least `minimum`.
pub fn status_at_least(response: &HttpResponse, minimum: u16) -> PetstoreResult<()> {
    if response.status >= minimum {
        Ok(())
    } else {
        Err(PetstoreError::assertion(format!(
            "expected status >= {minimum}, got {}",
            describe(response)
        )))
    }
}

/// The body is an API message whose `message` equals `expected`.
pub fn message(response: &HttpResponse, expected: &str) -> PetstoreResult<()> {
    match response.message() {
        Some(actual) if actual == expected => Ok(()),
        _ => Err(PetstoreError::assertion(format!(
            "expected message {expected:?}, got {}",
            describe(response)
        ))),
    }
}

/// The `content-type` header is `application/json`, parameters allowed.
pub fn json_content_type(response: &HttpResponse) -> PetstoreResult<()> {
    match response.content_type() {
        Some(ct) if ct.split(';').next().map(str::trim) == Some(JSON_CONTENT_TYPE) => Ok(()),
        other => Err(PetstoreError::assertion(format!(
            "expected content-type {JSON_CONTENT_TYPE}, got {other:?}"
        ))),
    }
}

/// Parses the body as JSON.
pub fn json_body(response: &HttpResponse) -> PetstoreResult<Value> {
    response.json().map_err(|e| {
        PetstoreError::assertion(format!(
            "expected a JSON body ({e}), got {}",
            describe(response)
        ))
    })
}

/// `actual` contains every field of `expected`.
pub fn subset(actual: &Value, expected: &Value) -> PetstoreResult<()> {
    contains_subset(actual, expected)
        .map_err(|mismatch| PetstoreError::assertion(format!("response is not a superset: {mismatch}")))
}

/// `value` at `field` is an integer.
pub fn integer_field(value: &Value, field: &str) -> PetstoreResult<i64> {
    value.get(field).and_then(Value::as_i64).ok_or_else(|| {
        PetstoreError::assertion(format!("expected integer field {field:?} in {value}"))
    })
}

/// `condition` holds.
pub fn that(condition: bool, message: impl Into<String>) -> PetstoreResult<()> {
    if condition {
        Ok(())
    } else {
        Err(PetstoreError::assertion(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn response(status: u16, content_type: Option<&str>, body: &str) -> HttpResponse {
        let mut headers = HashMap::new();
        if let Some(ct) = content_type {
            headers.insert("content-type".to_string(), ct.to_string());
        }
        HttpResponse {
            status,
            headers,
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn test_status_checks() {
        let ok = response(200, None, "");
        assert!(status(&ok, 200).is_ok());
        assert!(status_in(&ok, &[200, 404]).is_ok());
        assert!(status_at_least(&ok, 400).is_err());

        let error = status(&response(405, None, "{}"), 200).unwrap_err().to_string();
        assert!(error.contains("405"));
    }

    #[test]
    fn test_message_check() {
        let not_found = response(404, None, r#"{"code":1,"type":"error","message":"Pet not found"}"#);
        assert!(message(&not_found, "Pet not found").is_ok());
        assert!(message(&not_found, "Invalid ID supplied").is_err());
        assert!(message(&response(404, None, ""), "Pet not found").is_err());
    }

    #[test]
    fn test_content_type_allows_parameters() {
        assert!(json_content_type(&response(200, Some("application/json"), "")).is_ok());
        assert!(json_content_type(&response(200, Some("application/json; charset=utf-8"), "")).is_ok());
        assert!(json_content_type(&response(200, Some("application/xml"), "")).is_err());
        assert!(json_content_type(&response(200, None, "")).is_err());
    }

    #[test]
    fn test_integer_field() {
        assert_eq!(integer_field(&json!({"id": 7}), "id").unwrap(), 7);
        assert!(integer_field(&json!({"id": "7"}), "id").is_err());
    }
}
