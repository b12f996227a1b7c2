//! Internal Diesel row structs. Never exposed to the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::{resources, user_sessions, users};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i32,
    pub username: String,
    pub password: String,
    pub is_admin: bool,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub is_admin: bool,
}

/// Partial update; `None` columns are left untouched.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserChangeset<'a> {
    pub password: Option<&'a str>,
    pub is_admin: Option<bool>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = resources)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ResourceRow {
    pub id: i32,
    pub title: String,
    pub category: String,
    pub content: String,
    pub requires_admin: bool,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = resources)]
pub(crate) struct NewResourceRow<'a> {
    pub title: &'a str,
    pub category: &'a str,
    pub content: &'a str,
    pub requires_admin: bool,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = resources)]
pub(crate) struct ResourceChangeset<'a> {
    pub title: Option<&'a str>,
    pub category: Option<&'a str>,
    pub content: Option<&'a str>,
    pub requires_admin: Option<bool>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = user_sessions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SessionRow {
    pub sid: String,
    pub user_id: i32,
    pub expire: DateTime<Utc>,
}
