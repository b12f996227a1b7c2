//! Outbound adapters implementing the domain ports.
//!
//! - **memory**: process-local repositories for tests and development runs.
//! - **persistence**: PostgreSQL repositories using Diesel.

pub mod memory;
pub mod persistence;
