//! PostgreSQL-backed `UserRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::warn;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{CredentialRecord, NewUser, User, UserAccount, UserId, UserPatch, Username};

use super::diesel_error_mapping::{is_unique_violation, map_diesel_error, map_pool_error};
use super::models::{NewUserRow, UserChangeset, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel adapter for the `users` table.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> UserPersistenceError {
    map_pool_error(error, UserPersistenceError::connection)
}

fn diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    map_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

enum GuardedUpdateError {
    Diesel(diesel::result::Error),
    LastAdmin,
}

impl From<diesel::result::Error> for GuardedUpdateError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

fn row_to_account(row: UserRow) -> Result<UserAccount, UserPersistenceError> {
    let username = Username::stored(row.username.as_str()).map_err(|err| {
        warn!(user_id = row.id, "stored username failed validation");
        UserPersistenceError::query(format!("invalid stored username: {err}"))
    })?;
    Ok(UserAccount {
        user: User::new(UserId::new(row.id), username, row.is_admin),
        credential: CredentialRecord::from_stored(row.password),
    })
}

fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    row_to_account(row).map(|account| account.user)
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = NewUserRow {
            username: user.username.as_str(),
            password: user.credential.as_str(),
            is_admin: user.is_admin,
        };
        let inserted: UserRow = diesel::insert_into(users::table)
            .values(&row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    UserPersistenceError::duplicate_username(user.username.as_str())
                } else {
                    diesel_error(err)
                }
            })?;
        row_to_user(inserted)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        users::table
            .find(id.get())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?
            .map(row_to_user)
            .transpose()
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        users::table
            .filter(users::username.eq(username.as_str()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?
            .map(row_to_account)
            .transpose()
    }

    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows: Vec<UserRow> = users::table
            .order(users::id.asc())
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        rows.into_iter().map(row_to_user).collect()
    }

    async fn update(
        &self,
        id: UserId,
        patch: UserPatch,
    ) -> Result<Option<User>, UserPersistenceError> {
        if patch.is_empty() {
            return self.find_by_id(id).await;
        }
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let demote = patch.is_admin == Some(false);
        let is_admin = patch.is_admin;
        let password = patch.credential.map(|record| record.as_str().to_owned());
        // Locking every admin row serialises concurrent demotions.
        let outcome = conn
            .transaction::<_, GuardedUpdateError, _>(move |conn| {
                async move {
                    if demote {
                        let admins: Vec<i32> = users::table
                            .filter(users::is_admin.eq(true))
                            .select(users::id)
                            .for_update()
                            .load(conn)
                            .await?;
                        if admins.len() <= 1 && admins.contains(&id.get()) {
                            return Err(GuardedUpdateError::LastAdmin);
                        }
                    }
                    let changes = UserChangeset {
                        password: password.as_deref(),
                        is_admin,
                    };
                    let row = diesel::update(users::table.find(id.get()))
                        .set(&changes)
                        .returning(UserRow::as_returning())
                        .get_result(conn)
                        .await
                        .optional()?;
                    Ok(row)
                }
                .scope_boxed()
            })
            .await;
        match outcome {
            Ok(row) => row.map(row_to_user).transpose(),
            Err(GuardedUpdateError::LastAdmin) => Err(UserPersistenceError::last_admin(id.get())),
            Err(GuardedUpdateError::Diesel(err)) => Err(diesel_error(err)),
        }
    }

    async fn delete(&self, id: UserId) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let deleted = diesel::delete(users::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(deleted > 0)
    }

    async fn count_admins(&self) -> Result<u64, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let admins: i64 = users::table
            .filter(users::is_admin.eq(true))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(u64::try_from(admins).unwrap_or_default())
    }
}
