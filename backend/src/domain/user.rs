//! User data model.
//!
//! A [`User`] is the public projection of an account: it never carries the
//! credential record. Persistence adapters pair it with the stored credential
//! in a [`UserAccount`] for the login flow only.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::CredentialRecord;

/// Validation errors returned by user constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    #[error("username must not be empty")]
    EmptyUsername,
}

/// Repository-assigned user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i32);

impl UserId {
    /// Wrap a raw identifier.
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    /// Access the raw identifier.
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique login name.
///
/// ## Invariants
/// - Never blank.
/// - Names built with [`Username::new`] are trimmed. Names read back from
///   storage keep whatever padding they were stored with, so accounts created
///   before trimming was enforced can still sign in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and construct a [`Username`].
    pub fn new(username: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = username.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Accept a name exactly as stored or typed, rejecting only blank input.
    pub fn stored(username: impl Into<String>) -> Result<Self, UserValidationError> {
        let raw = username.into();
        if raw.trim().is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }
        Ok(Self(raw))
    }

    /// The trimmed form of this name, when it differs.
    pub fn trimmed(&self) -> Option<Self> {
        let trimmed = self.0.trim();
        (trimmed.len() != self.0.len()).then(|| Self(trimmed.to_owned()))
    }

    /// Borrow the username as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl TryFrom<String> for Username {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Public user identity returned by the API.
///
/// ## Invariants
/// - Serialises as `{ id, username, isAdmin }`; the credential is not part
///   of this type.
///
/// # Examples
/// ```
/// use resource_library::domain::{User, UserId, Username};
///
/// let user = User::new(UserId::new(1), Username::new("alice").unwrap(), false);
/// assert_eq!(user.username().as_str(), "alice");
/// assert!(!user.is_admin());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[schema(value_type = i32, example = 1)]
    id: UserId,
    #[schema(value_type = String, example = "alice")]
    username: Username,
    is_admin: bool,
}

impl User {
    /// Build a new [`User`].
    pub fn new(id: UserId, username: Username, is_admin: bool) -> Self {
        Self {
            id,
            username,
            is_admin,
        }
    }

    /// Stable user identifier.
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Login name.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Whether the user holds the administrator role.
    pub fn is_admin(&self) -> bool {
        self.is_admin
    }
}

/// A user paired with the stored credential record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    pub user: User,
    pub credential: CredentialRecord,
}

/// Values required to insert a new user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: Username,
    pub credential: CredentialRecord,
    pub is_admin: bool,
}

/// Partial update applied by administrators. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub is_admin: Option<bool>,
    pub credential: Option<CredentialRecord>,
}

impl UserPatch {
    /// Whether the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        self.is_admin.is_none() && self.credential.is_none()
    }
}
