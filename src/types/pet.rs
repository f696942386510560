//! Pet record types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Top-level fields of the pet schema, in wire spelling.
pub const PET_FIELDS: &[&str] = &["id", "category", "name", "photoUrls", "tags", "status"];

/// Lifecycle status of a pet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PetStatus {
    /// Available for sale.
    Available,
    /// Sale pending.
    Pending,
    /// Sold.
    Sold,
}

impl PetStatus {
    /// All statuses, in contract order.
    pub const ALL: [PetStatus; 3] = [PetStatus::Available, PetStatus::Pending, PetStatus::Sold];

    /// Returns the wire spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            PetStatus::Available => "available",
            PetStatus::Pending => "pending",
            PetStatus::Sold => "sold",
        }
    }
}

impl std::fmt::Display for PetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pet category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Category id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Category name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Category {
    /// Creates a category.
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            name: Some(name.into()),
        }
    }
}

/// Pet tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Tag id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Tag name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Tag {
    /// Creates a tag.
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            name: Some(name.into()),
        }
    }
}

/// A pet record as exchanged with the store.
///
/// Every field is optional on the wire; absent fields are left out when
/// serializing so a shape only asserts what the caller set.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    /// Identity; caller-assigned for fixtures, server-assigned otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    /// Name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Photo URLs.
    #[serde(default)]
    pub photo_urls: Vec<String>,
    /// Tags.
    #[serde(default)]
    pub tags: Vec<Tag>,
    /// Status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PetStatus>,
}

impl Pet {
    /// Creates a new pet builder.
    pub fn builder() -> PetBuilder {
        PetBuilder::default()
    }

    /// The reference fixture: a cat named "Pet" with one photo and one tag.
    pub fn reference(id: i64) -> Self {
        Pet::builder()
            .id(id)
            .category(Category::new(0, "Cat"))
            .name("Pet")
            .photo_url("url")
            .tag(Tag::new(0, "my_tag"))
            .status(PetStatus::Available)
            .build()
    }

    /// Returns this pet with a different identity.
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    /// Returns this pet without an identity, for server-assigned creation.
    pub fn without_id(mut self) -> Self {
        self.id = None;
        self
    }

    /// Serializes to a JSON value.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Keeps only the schema fields of a JSON object; other values pass through.
///
/// The store ignores unknown fields, so a shape's extra keys are not part of
/// what a read-back can be expected to contain.
pub fn project_known_fields(shape: &Value) -> Value {
    match shape {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(key, _)| PET_FIELDS.contains(&key.as_str()))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Builder for [`Pet`].
#[derive(Debug, Default)]
pub struct PetBuilder {
    pet: Pet,
}

impl PetBuilder {
    /// Sets the id.
    pub fn id(mut self, id: i64) -> Self {
        self.pet.id = Some(id);
        self
    }

    /// Sets the category.
    pub fn category(mut self, category: Category) -> Self {
        self.pet.category = Some(category);
        self
    }

    /// Sets the name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.pet.name = Some(name.into());
        self
    }

    /// Adds a photo URL.
    pub fn photo_url(mut self, url: impl Into<String>) -> Self {
        self.pet.photo_urls.push(url.into());
        self
    }

    /// Adds a tag.
    pub fn tag(mut self, tag: Tag) -> Self {
        self.pet.tags.push(tag);
        self
    }

    /// Sets the status.
    pub fn status(mut self, status: PetStatus) -> Self {
        self.pet.status = Some(status);
        self
    }

    /// Builds the pet.
    pub fn build(self) -> Pet {
        self.pet
    }
}
