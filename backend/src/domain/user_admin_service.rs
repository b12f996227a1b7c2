//! User administration: listing, role and password changes, deletion.

use std::sync::Arc;

use tracing::info;
use zeroize::Zeroizing;

use super::auth_service::hash_password;
use super::authorization::{can_delete_user, require_user_manager};
use super::persistence_error_mapping::map_user_persistence_error;
use super::ports::UserRepository;
use super::{CredentialHasher, Error, User, UserId, UserPatch};

/// Requested account changes before the password is hashed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    pub is_admin: Option<bool>,
    pub password: Option<Zeroizing<String>>,
}

fn user_not_found(id: UserId) -> Error {
    Error::not_found(format!("user {id} not found"))
}

/// Administrator-only user management.
#[derive(Clone)]
pub struct UserAdminService {
    users: Arc<dyn UserRepository>,
    hasher: CredentialHasher,
}

impl UserAdminService {
    pub fn new(users: Arc<dyn UserRepository>, hasher: CredentialHasher) -> Self {
        Self { users, hasher }
    }

    pub async fn list(&self, actor: &User) -> Result<Vec<User>, Error> {
        require_user_manager(actor)?;
        self.users.list().await.map_err(map_user_persistence_error)
    }

    /// Change a user's role and/or password.
    ///
    /// Demoting the last remaining administrator is rejected.
    pub async fn update(&self, actor: &User, id: UserId, update: UserUpdate) -> Result<User, Error> {
        require_user_manager(actor)?;
        if update.is_admin.is_none() && update.password.is_none() {
            return Err(Error::invalid_request("no fields to update"));
        }
        if update.password.as_ref().is_some_and(|pw| pw.is_empty()) {
            return Err(Error::invalid_request("password must not be empty"));
        }

        let target = self
            .users
            .find_by_id(id)
            .await
            .map_err(map_user_persistence_error)?
            .ok_or_else(|| user_not_found(id))?;
        if target.is_admin() && update.is_admin == Some(false) {
            self.ensure_other_admin_remains().await?;
        }

        let credential = match update.password {
            Some(password) => Some(hash_password(self.hasher, password).await?),
            None => None,
        };
        let patch = UserPatch {
            is_admin: update.is_admin,
            credential,
        };
        let updated = self
            .users
            .update(id, patch)
            .await
            .map_err(map_user_persistence_error)?
            .ok_or_else(|| user_not_found(id))?;
        info!(user_id = %id, actor = %actor.id(), is_admin = updated.is_admin(), "user updated");
        Ok(updated)
    }

    /// Delete an account other than the caller's own.
    pub async fn delete(&self, actor: &User, id: UserId) -> Result<(), Error> {
        require_user_manager(actor)?;
        if !can_delete_user(actor, id) {
            return Err(Error::invalid_request("Cannot delete your own account"));
        }
        let deleted = self
            .users
            .delete(id)
            .await
            .map_err(map_user_persistence_error)?;
        if !deleted {
            return Err(user_not_found(id));
        }
        info!(user_id = %id, actor = %actor.id(), "user deleted");
        Ok(())
    }

    async fn ensure_other_admin_remains(&self) -> Result<(), Error> {
        let admins = self
            .users
            .count_admins()
            .await
            .map_err(map_user_persistence_error)?;
        if admins <= 1 {
            return Err(Error::invalid_request(
                "Cannot remove the last administrator",
            ));
        }
        Ok(())
    }
}
