//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{NewUser, User, UserAccount, UserId, UserPatch, Username};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// The username is already taken.
        DuplicateUsername { username: String } => "username already exists: {username}",
        /// The update would leave no administrator.
        LastAdmin { id: i32 } => "user {id} is the last administrator",
    }
}

/// Storage for user accounts. No authorization is applied at this layer.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user, assigning a fresh identifier.
    async fn create(&self, user: NewUser) -> Result<User, UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user together with the stored credential, for login.
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<UserAccount>, UserPersistenceError>;

    /// All users in ascending id order.
    async fn list(&self) -> Result<Vec<User>, UserPersistenceError>;

    /// Apply a partial update. Returns `None` when the id is unknown.
    ///
    /// Demoting the only remaining administrator fails with
    /// [`UserPersistenceError::LastAdmin`]; the check and the write are atomic.
    async fn update(
        &self,
        id: UserId,
        patch: UserPatch,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Remove a user. Returns whether a row was deleted.
    async fn delete(&self, id: UserId) -> Result<bool, UserPersistenceError>;

    /// Number of users holding the administrator role.
    async fn count_admins(&self) -> Result<u64, UserPersistenceError>;
}
