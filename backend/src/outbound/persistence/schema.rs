//! Diesel table definitions for the PostgreSQL schema.
//!
//! `users` and `resources` mirror `migrations/`. `user_sessions` is created at
//! runtime by [`super::DieselSessionRepository::connect`] and must match the DDL
//! there.

diesel::table! {
    /// Accounts. `password` holds the `hex(key).hex(salt)` credential record.
    users (id) {
        id -> Int4,
        username -> Text,
        password -> Text,
        is_admin -> Bool,
    }
}

diesel::table! {
    /// Library entries.
    resources (id) {
        id -> Int4,
        title -> Text,
        category -> Text,
        content -> Text,
        requires_admin -> Bool,
    }
}

diesel::table! {
    /// Durable login sessions keyed by the cookie token.
    user_sessions (sid) {
        sid -> Varchar,
        user_id -> Int4,
        expire -> Timestamptz,
    }
}

diesel::joinable!(user_sessions -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(resources, user_sessions, users);
