//! Error types for the pet store conformance suite.
//!
//! Separates what the API said (validation and not-found responses) from what
//! the network did (transport failures), and wraps both when they happen while
//! reconciling fixtures.

use thiserror::Error;

use crate::transport::{HttpResponse, TransportError};

/// Result type alias for pet store operations.
pub type PetstoreResult<T> = Result<T, PetstoreError>;

/// Message the pet store returns for an identity it does not hold.
pub const PET_NOT_FOUND: &str = "Pet not found";

/// Message the pet store returns for an unparseable or out-of-range identity.
pub const INVALID_ID_SUPPLIED: &str = "Invalid ID supplied";

/// Message the pet store returns for a rejected create payload.
pub const INVALID_INPUT: &str = "Invalid input";

/// Message the pet store returns for a rejected update payload.
pub const VALIDATION_EXCEPTION: &str = "Validation exception";

/// Error type for pet store client and suite operations.
#[derive(Debug, Error)]
pub enum PetstoreError {
    /// Configuration error (invalid base URL, timeout, fixture id strategy).
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message describing the configuration issue.
        message: String,
    },

    /// 4xx response carrying a message body, other than "Pet not found".
    #[error("Client validation error (HTTP {status}): {message}")]
    ClientValidation {
        /// HTTP status code.
        status: u16,
        /// Message reported by the API.
        message: String,
    },

    /// 404 response for an identity the store does not hold.
    #[error("Not found: {message}")]
    NotFound {
        /// Message reported by the API.
        message: String,
    },

    /// Timeout, connection failure or unreadable response.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Any status the caller did not anticipate.
    #[error("Unexpected status (HTTP {status}): {body}")]
    UnexpectedStatus {
        /// HTTP status code.
        status: u16,
        /// Raw response body, lossily decoded.
        body: String,
    },

    /// Serialization/deserialization error.
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error message.
        message: String,
    },

    /// A fixture could not be driven into its desired state.
    #[error("Reconciliation failed during {step} of pet {id}: {source}")]
    Reconciliation {
        /// Step that failed.
        step: ReconcileStep,
        /// Identity being reconciled, when known.
        id: FixtureId,
        /// Underlying failure.
        #[source]
        source: Box<PetstoreError>,
    },

    /// A scenario expectation did not hold.
    #[error("Assertion failed: {message}")]
    Assertion {
        /// Description of the mismatch.
        message: String,
    },
}

/// Step of the reconciliation protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileStep {
    /// Issuing the delete.
    Delete,
    /// Reading back to confirm absence.
    ConfirmAbsent,
    /// Issuing the create.
    Create,
    /// Reading back to confirm presence.
    ConfirmPresent,
}

impl std::fmt::Display for ReconcileStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let step = match self {
            ReconcileStep::Delete => "delete",
            ReconcileStep::ConfirmAbsent => "confirm-absent",
            ReconcileStep::Create => "create",
            ReconcileStep::ConfirmPresent => "confirm-present",
        };
        f.write_str(step)
    }
}

/// Identity attached to a reconciliation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureId {
    /// Caller-assigned or captured identity.
    Known(i64),
    /// Server had not assigned an identity yet.
    Pending,
}

impl std::fmt::Display for FixtureId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FixtureId::Known(id) => write!(f, "{id}"),
            FixtureId::Pending => f.write_str("<unassigned>"),
        }
    }
}

impl PetstoreError {
    /// Classifies a non-success response into the error taxonomy.
    pub fn from_response(response: &HttpResponse) -> Self {
        let message = response.message();

        match (response.status, message) {
            (404, Some(message)) if message == PET_NOT_FOUND => PetstoreError::NotFound { message },
            (status @ 400..=499, Some(message)) => {
                PetstoreError::ClientValidation { status, message }
            }
            (status, _) => PetstoreError::UnexpectedStatus {
                status,
                body: response.text(),
            },
        }
    }

    /// Creates an assertion error.
    pub fn assertion(message: impl Into<String>) -> Self {
        PetstoreError::Assertion {
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        PetstoreError::Configuration {
            message: message.into(),
        }
    }

    /// Wraps this error as a failure of the given reconciliation step.
    pub fn during(self, step: ReconcileStep, id: FixtureId) -> Self {
        PetstoreError::Reconciliation {
            step,
            id,
            source: Box::new(self),
        }
    }

    /// Returns true if the error came from the network rather than the API.
    pub fn is_transport(&self) -> bool {
        match self {
            PetstoreError::Transport(_) => true,
            PetstoreError::Reconciliation { source, .. } => source.is_transport(),
            _ => false,
        }
    }

    /// Returns the identity a reconciliation failure concerns, once known.
    ///
    /// A failure after the create was accepted still names the pet, which
    /// the store may now hold.
    pub fn fixture_id(&self) -> Option<i64> {
        match self {
            PetstoreError::Reconciliation {
                id: FixtureId::Known(id),
                ..
            } => Some(*id),
            _ => None,
        }
    }

    /// Returns true if the error was raised while reconciling a fixture.
    pub fn is_reconciliation(&self) -> bool {
        matches!(self, PetstoreError::Reconciliation { .. })
    }

    /// Returns the HTTP status code behind the error, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            PetstoreError::ClientValidation { status, .. }
            | PetstoreError::UnexpectedStatus { status, .. } => Some(*status),
            PetstoreError::NotFound { .. } => Some(404),
            PetstoreError::Reconciliation { source, .. } => source.status(),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for PetstoreError {
    fn from(err: serde_json::Error) -> Self {
        PetstoreError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<url::ParseError> for PetstoreError {
    fn from(err: url::ParseError) -> Self {
        PetstoreError::Configuration {
            message: format!("Invalid URL: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: HashMap::new(),
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn test_not_found_classification() {
        let error = PetstoreError::from_response(&response(
            404,
            r#"{"code":1,"type":"error","message":"Pet not found"}"#,
        ));

        assert!(matches!(error, PetstoreError::NotFound { ref message } if message == PET_NOT_FOUND));
        assert_eq!(error.status(), Some(404));
    }

    #[test]
    fn test_client_validation_classification() {
        let error = PetstoreError::from_response(&response(
            405,
            r#"{"code":405,"type":"unknown","message":"Invalid input"}"#,
        ));

        if let PetstoreError::ClientValidation { status, message } = error {
            assert_eq!(status, 405);
            assert_eq!(message, INVALID_INPUT);
        } else {
            panic!("Expected ClientValidation error");
        }
    }

    #[test]
    fn test_404_with_other_message_is_validation() {
        let error = PetstoreError::from_response(&response(404, r#"{"message":"no route"}"#));
        assert!(matches!(error, PetstoreError::ClientValidation { status: 404, .. }));
    }

    #[test]
    fn test_body_without_message_is_unexpected() {
        let error = PetstoreError::from_response(&response(500, "boom"));

        if let PetstoreError::UnexpectedStatus { status, body } = error {
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
        } else {
            panic!("Expected UnexpectedStatus error");
        }
    }

    #[test]
    fn test_transport_errors_are_distinguished() {
        let error: PetstoreError = TransportError::Timeout {
            timeout: Duration::from_secs(1),
        }
        .into();
        assert!(error.is_transport());
        assert_eq!(error.status(), None);

        let wrapped = error.during(ReconcileStep::Delete, FixtureId::Known(7));
        assert!(wrapped.is_transport());
        assert!(wrapped.is_reconciliation());

        let api_error = PetstoreError::NotFound {
            message: PET_NOT_FOUND.to_string(),
        };
        assert!(!api_error.is_transport());
    }

    #[test]
    fn test_reconciliation_display() {
        let error = PetstoreError::assertion("status was 500")
            .during(ReconcileStep::ConfirmAbsent, FixtureId::Known(100));

        let text = error.to_string();
        assert!(text.contains("confirm-absent"));
        assert!(text.contains("100"));
        assert!(text.contains("status was 500"));
    }

    #[test]
    fn test_fixture_id_only_for_known_reconciliation_targets() {
        let known = PetstoreError::assertion("mismatch")
            .during(ReconcileStep::ConfirmPresent, FixtureId::Known(42));
        let pending = PetstoreError::assertion("no id")
            .during(ReconcileStep::Create, FixtureId::Pending);

        assert_eq!(known.fixture_id(), Some(42));
        assert_eq!(pending.fixture_id(), None);
        assert_eq!(PetstoreError::assertion("plain").fixture_id(), None);
    }
}
