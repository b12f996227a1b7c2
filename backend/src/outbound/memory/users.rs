//! In-memory `UserRepository`.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{NewUser, User, UserAccount, UserId, UserPatch, Username};

#[derive(Default)]
struct UserTable {
    next_id: i32,
    rows: BTreeMap<UserId, UserAccount>,
}

/// `UserRepository` backed by an ordered map.
#[derive(Default)]
pub struct InMemoryUserRepository {
    table: Mutex<UserTable>,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, UserPersistenceError> {
        let mut table = self.table.lock().await;
        if table
            .rows
            .values()
            .any(|account| account.user.username() == &user.username)
        {
            return Err(UserPersistenceError::duplicate_username(
                user.username.as_str(),
            ));
        }
        table.next_id += 1;
        let id = UserId::new(table.next_id);
        let created = User::new(id, user.username, user.is_admin);
        table.rows.insert(
            id,
            UserAccount {
                user: created.clone(),
                credential: user.credential,
            },
        );
        Ok(created)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let table = self.table.lock().await;
        Ok(table.rows.get(&id).map(|account| account.user.clone()))
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        let table = self.table.lock().await;
        Ok(table
            .rows
            .values()
            .find(|account| account.user.username() == username)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        let table = self.table.lock().await;
        Ok(table
            .rows
            .values()
            .map(|account| account.user.clone())
            .collect())
    }

    async fn update(
        &self,
        id: UserId,
        patch: UserPatch,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut table = self.table.lock().await;
        let admins = table
            .rows
            .values()
            .filter(|account| account.user.is_admin())
            .count();
        let Some(account) = table.rows.get_mut(&id) else {
            return Ok(None);
        };
        if patch.is_admin == Some(false) && account.user.is_admin() && admins <= 1 {
            return Err(UserPersistenceError::last_admin(id.get()));
        }
        if let Some(is_admin) = patch.is_admin {
            account.user = User::new(account.user.id(), account.user.username().clone(), is_admin);
        }
        if let Some(credential) = patch.credential {
            account.credential = credential;
        }
        Ok(Some(account.user.clone()))
    }

    async fn delete(&self, id: UserId) -> Result<bool, UserPersistenceError> {
        let mut table = self.table.lock().await;
        Ok(table.rows.remove(&id).is_some())
    }

    async fn count_admins(&self) -> Result<u64, UserPersistenceError> {
        let table = self.table.lock().await;
        let admins = table
            .rows
            .values()
            .filter(|account| account.user.is_admin())
            .count();
        Ok(u64::try_from(admins).unwrap_or(u64::MAX))
    }
}
