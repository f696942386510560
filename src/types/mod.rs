//! Type definitions for the pet store API.

pub mod pet;

pub use pet::{project_known_fields, Category, Pet, PetBuilder, PetStatus, Tag, PET_FIELDS};

use serde::{Deserialize, Serialize};

/// Message body the store returns for errors and delete acknowledgements.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ApiMessage {
    /// Numeric code; not always the HTTP status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
    /// Message type, e.g. `"error"` or `"unknown"`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Human-readable message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiMessage {
    /// Creates a message body.
    pub fn new(code: i64, kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            kind: Some(kind.into()),
            message: Some(message.into()),
        }
    }
}
