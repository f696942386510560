//! Service implementations for the pet store API.

pub mod pets;

pub use pets::{DeleteOutcome, PetService, WriteRequest, JSON_CONTENT_TYPE};
