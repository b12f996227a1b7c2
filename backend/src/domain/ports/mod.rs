//! Driven ports for the hexagonal boundary.
//!
//! Domain services depend only on these traits; persistence adapters live in
//! [`crate::outbound`].

mod macros;
pub(crate) use macros::define_port_error;

mod resource_repository;
mod session_repository;
mod user_repository;

#[cfg(test)]
pub use resource_repository::MockResourceRepository;
pub use resource_repository::{ResourcePersistenceError, ResourceRepository};
#[cfg(test)]
pub use session_repository::MockSessionRepository;
pub use session_repository::{SessionPersistenceError, SessionRepository};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
