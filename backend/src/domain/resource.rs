//! Library resources: categorised reference documents.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Validation errors returned by resource constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResourceValidationError {
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("content must not be empty")]
    EmptyContent,
    #[error("category must be one of cicd, infrastructure, monitoring, security")]
    UnknownCategory { value: String },
}

/// Repository-assigned resource identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(i32);

impl ResourceId {
    /// Wrap a raw identifier.
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    /// Access the raw identifier.
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Resource category. The set is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Cicd,
    Infrastructure,
    Monitoring,
    Security,
}

impl Category {
    /// Every category in display order.
    pub const ALL: [Self; 4] = [
        Self::Cicd,
        Self::Infrastructure,
        Self::Monitoring,
        Self::Security,
    ];

    /// Wire and storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cicd => "cicd",
            Self::Infrastructure => "infrastructure",
            Self::Monitoring => "monitoring",
            Self::Security => "security",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ResourceValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| ResourceValidationError::UnknownCategory {
                value: s.to_owned(),
            })
    }
}

/// Non-empty resource title, trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceTitle(String);

impl ResourceTitle {
    /// Validate and construct a title.
    pub fn new(title: impl AsRef<str>) -> Result<Self, ResourceValidationError> {
        let trimmed = title.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ResourceValidationError::EmptyTitle);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<ResourceTitle> for String {
    fn from(value: ResourceTitle) -> Self {
        value.0
    }
}

impl TryFrom<String> for ResourceTitle {
    type Error = ResourceValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Opaque document body. Stored verbatim; only blank bodies are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceContent(String);

impl ResourceContent {
    /// Validate and construct a content body.
    pub fn new(content: impl Into<String>) -> Result<Self, ResourceValidationError> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(ResourceValidationError::EmptyContent);
        }
        Ok(Self(content))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<ResourceContent> for String {
    fn from(value: ResourceContent) -> Self {
        value.0
    }
}

impl TryFrom<String> for ResourceContent {
    type Error = ResourceValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A library document.
///
/// ## Invariants
/// - `requires_admin` resources are only visible to administrators; see
///   [`crate::domain::authorization::can_read_resource`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    #[schema(value_type = i32, example = 1)]
    pub id: ResourceId,
    #[schema(value_type = String, example = "Blue/green deployments")]
    pub title: ResourceTitle,
    pub category: Category,
    #[schema(value_type = String)]
    pub content: ResourceContent,
    pub requires_admin: bool,
}

/// Values required to insert a new resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewResource {
    pub title: ResourceTitle,
    pub category: Category,
    pub content: ResourceContent,
    pub requires_admin: bool,
}

/// Partial update. Absent fields are left untouched; the id is never writable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourcePatch {
    pub title: Option<ResourceTitle>,
    pub category: Option<Category>,
    pub content: Option<ResourceContent>,
    pub requires_admin: Option<bool>,
}

impl ResourcePatch {
    /// Whether the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.category.is_none()
            && self.content.is_none()
            && self.requires_admin.is_none()
    }

    /// Apply the patch to an existing record.
    pub fn apply_to(self, resource: &mut Resource) {
        if let Some(title) = self.title {
            resource.title = title;
        }
        if let Some(category) = self.category {
            resource.category = category;
        }
        if let Some(content) = self.content {
            resource.content = content;
        }
        if let Some(requires_admin) = self.requires_admin {
            resource.requires_admin = requires_admin;
        }
    }
}
