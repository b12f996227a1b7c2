//! PostgreSQL persistence adapters.
//!
//! Diesel models and schema are private to this module; repositories only
//! translate rows to domain types and map failures onto port errors.

mod diesel_error_mapping;
mod diesel_resource_repository;
mod diesel_session_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_resource_repository::DieselResourceRepository;
pub use diesel_session_repository::DieselSessionRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_pending as run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
