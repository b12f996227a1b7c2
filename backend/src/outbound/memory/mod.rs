//! In-process adapters for the driven ports.
//!
//! Used by tests and by `--in-memory` development runs. State lives behind a
//! `tokio` mutex and disappears with the process.

mod resources;
mod sessions;
mod users;

pub use resources::InMemoryResourceRepository;
pub use sessions::InMemorySessionRepository;
pub use users::InMemoryUserRepository;
