//! Shared mapping from persistence failures to transport-agnostic errors.
//!
//! Connection failures surface as `service_unavailable`; everything else is an
//! internal error whose detail is logged and redacted at the HTTP boundary.

use tracing::error;

use super::Error;
use super::ports::{ResourcePersistenceError, SessionPersistenceError, UserPersistenceError};

pub(crate) fn map_user_persistence_error(err: UserPersistenceError) -> Error {
    match err {
        UserPersistenceError::Connection { message } => {
            error!(%message, "user repository unavailable");
            Error::service_unavailable("user store unavailable")
        }
        UserPersistenceError::Query { message } => {
            error!(%message, "user repository query failed");
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateUsername { .. } => {
            Error::invalid_request("Username already exists")
        }
        UserPersistenceError::LastAdmin { .. } => {
            Error::invalid_request("Cannot remove the last administrator")
        }
    }
}

pub(crate) fn map_resource_persistence_error(err: ResourcePersistenceError) -> Error {
    match err {
        ResourcePersistenceError::Connection { message } => {
            error!(%message, "resource repository unavailable");
            Error::service_unavailable("resource store unavailable")
        }
        ResourcePersistenceError::Query { message } => {
            error!(%message, "resource repository query failed");
            Error::internal(format!("resource repository error: {message}"))
        }
    }
}

pub(crate) fn map_session_persistence_error(err: SessionPersistenceError) -> Error {
    match err {
        SessionPersistenceError::Connection { message } => {
            error!(%message, "session repository unavailable");
            Error::service_unavailable("session store unavailable")
        }
        SessionPersistenceError::Query { message } => {
            error!(%message, "session repository query failed");
            Error::internal(format!("session repository error: {message}"))
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case(UserPersistenceError::connection("refused"), ErrorCode::ServiceUnavailable)]
    #[case(UserPersistenceError::query("syntax"), ErrorCode::InternalError)]
    #[case(UserPersistenceError::duplicate_username("alice"), ErrorCode::InvalidRequest)]
    #[case(UserPersistenceError::last_admin(1), ErrorCode::InvalidRequest)]
    fn user_errors_map_to_codes(#[case] err: UserPersistenceError, #[case] expected: ErrorCode) {
        assert_eq!(map_user_persistence_error(err).code(), expected);
    }

    #[rstest]
    #[case(ResourcePersistenceError::connection("refused"), ErrorCode::ServiceUnavailable)]
    #[case(ResourcePersistenceError::query("syntax"), ErrorCode::InternalError)]
    fn resource_errors_map_to_codes(
        #[case] err: ResourcePersistenceError,
        #[case] expected: ErrorCode,
    ) {
        assert_eq!(map_resource_persistence_error(err).code(), expected);
    }

    #[rstest]
    #[case(SessionPersistenceError::connection("refused"), ErrorCode::ServiceUnavailable)]
    #[case(SessionPersistenceError::query("syntax"), ErrorCode::InternalError)]
    fn session_errors_map_to_codes(
        #[case] err: SessionPersistenceError,
        #[case] expected: ErrorCode,
    ) {
        assert_eq!(map_session_persistence_error(err).code(), expected);
    }
}
