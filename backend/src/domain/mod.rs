//! Domain primitives, policy and use-cases.
//!
//! Purpose: Define strongly typed entities for users, resources and sessions,
//! the credential hasher and authorization guard, and the services that
//! combine them. Nothing here knows about HTTP or SQL; adapters reach the
//! outside world through [`ports`].
//!
//! Public surface:
//! - Error / ErrorCode — transport-agnostic failure payload.
//! - User, Resource, Session and their identifiers.
//! - CredentialHasher — salted scrypt hashing.
//! - authorization — pure role and visibility checks.
//! - SessionStore, AuthService, LibraryService, UserAdminService — use-cases.

pub mod auth;
pub mod auth_service;
pub mod authorization;
pub mod credentials;
pub mod error;
pub mod library_service;
mod persistence_error_mapping;
pub mod ports;
pub mod resource;
pub mod session;
pub mod session_store;
pub mod trace_id;
pub mod user;
pub mod user_admin_service;

pub use self::auth::{LoginCredentials, LoginValidationError, Registration};
pub use self::auth_service::AuthService;
pub use self::credentials::{CredentialError, CredentialHasher, CredentialRecord, ScryptCost};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::library_service::LibraryService;
pub use self::resource::{
    Category, NewResource, Resource, ResourceContent, ResourceId, ResourcePatch, ResourceTitle,
    ResourceValidationError,
};
pub use self::session::{Session, SessionId, SessionIdValidationError};
pub use self::session_store::SessionStore;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{NewUser, User, UserAccount, UserId, UserPatch, UserValidationError, Username};
pub use self::user_admin_service::{UserAdminService, UserUpdate};
