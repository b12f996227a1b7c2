//! Authentication inputs: login credentials and registrations.
//!
//! Inbound adapters build these from raw strings so the services only ever
//! see validated values.

use zeroize::Zeroizing;

use super::Username;

/// Domain error returned when credential payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginValidationError {
    /// Username was missing or blank once trimmed.
    #[error("username must not be empty")]
    EmptyUsername,
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
}

impl LoginValidationError {
    /// Name of the offending payload field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyUsername => "username",
            Self::EmptyPassword => "password",
        }
    }

    /// Stable machine-readable reason.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyUsername => "empty_username",
            Self::EmptyPassword => "empty_password",
        }
    }
}

fn validate_password(password: &str) -> Result<Zeroizing<String>, LoginValidationError> {
    if password.is_empty() {
        return Err(LoginValidationError::EmptyPassword);
    }
    Ok(Zeroizing::new(password.to_owned()))
}

/// Validated login credentials used by authentication services.
///
/// ## Invariants
/// - `username` must not be blank. It is kept as typed; the auth service
///   falls back to the trimmed form when the exact name is unknown.
/// - `password` is required to be non-empty but retains caller-provided
///   whitespace to avoid surprising credential comparisons.
///
/// # Examples
/// ```
/// use resource_library::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("admin", "password").unwrap();
/// assert_eq!(creds.username().as_str(), "admin");
/// assert_eq!(creds.password(), "password");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: Username,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw username/password inputs.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, LoginValidationError> {
        let username = Username::stored(username).map_err(|_| LoginValidationError::EmptyUsername)?;
        let password = validate_password(password)?;
        Ok(Self { username, password })
    }

    /// Username suitable for user lookups.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Password provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    pub(crate) fn password_secret(&self) -> Zeroizing<String> {
        self.password.clone()
    }
}

/// A request to open a new account.
///
/// `is_admin` is only a request: the auth service grants it solely when the
/// caller is already an administrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    username: Username,
    password: Zeroizing<String>,
    is_admin: bool,
}

impl Registration {
    /// Construct a registration from raw inputs. The username is trimmed.
    pub fn try_from_parts(
        username: &str,
        password: &str,
        is_admin: bool,
    ) -> Result<Self, LoginValidationError> {
        let username = Username::new(username).map_err(|_| LoginValidationError::EmptyUsername)?;
        let password = validate_password(password)?;
        Ok(Self {
            username,
            password,
            is_admin,
        })
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Whether the caller asked for the administrator role.
    pub fn requests_admin(&self) -> bool {
        self.is_admin
    }

    pub(crate) fn password_secret(&self) -> Zeroizing<String> {
        self.password.clone()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw", LoginValidationError::EmptyUsername)]
    #[case("   ", "pw", LoginValidationError::EmptyUsername)]
    #[case("user", "", LoginValidationError::EmptyPassword)]
    fn invalid_credentials(
        #[case] username: &str,
        #[case] password: &str,
        #[case] expected: LoginValidationError,
    ) {
        let err = LoginCredentials::try_from_parts(username, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(err, expected);
        let err = Registration::try_from_parts(username, password, false)
            .expect_err("invalid inputs must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    #[case("  admin  ", "secret")]
    #[case("alice", " padded password ")]
    fn login_credentials_are_kept_as_typed(#[case] username: &str, #[case] password: &str) {
        let creds = LoginCredentials::try_from_parts(username, password)
            .expect("valid inputs should succeed");
        assert_eq!(creds.username().as_str(), username);
        assert_eq!(creds.password(), password);
    }

    #[rstest]
    fn registration_trims_the_username() {
        let registration =
            Registration::try_from_parts("  carol ", "pw", false).expect("valid registration");
        assert_eq!(registration.username().as_str(), "carol");
    }

    #[rstest]
    fn registration_records_admin_request() {
        let registration =
            Registration::try_from_parts("bob", "pw", true).expect("valid registration");
        assert!(registration.requests_admin());
        assert_eq!(registration.username().as_str(), "bob");
    }

    #[rstest]
    #[case(LoginValidationError::EmptyUsername, "username", "empty_username")]
    #[case(LoginValidationError::EmptyPassword, "password", "empty_password")]
    fn validation_errors_describe_field(
        #[case] err: LoginValidationError,
        #[case] field: &str,
        #[case] code: &str,
    ) {
        assert_eq!(err.field(), field);
        assert_eq!(err.code(), code);
    }
}
