//! Registration and login payloads.
//!
//! Inbound adapters hand raw strings to these constructors and map the
//! resulting validation errors; services only ever see validated values.

use std::fmt;

use zeroize::Zeroizing;

use super::user::{DisplayName, EmailAddress, UserValidationError};

/// Domain error returned when credential payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialsValidationError {
    /// Email was missing or blank once trimmed.
    EmptyEmail,
    /// Email was present but not a usable address.
    InvalidEmail(UserValidationError),
    /// Password was blank.
    EmptyPassword,
    /// Display name was missing or blank.
    EmptyName,
    /// Display name failed validation.
    InvalidName(UserValidationError),
}

impl fmt::Display for CredentialsValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::InvalidEmail(reason) | Self::InvalidName(reason) => write!(f, "{reason}"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::EmptyName => write!(f, "name must not be empty"),
        }
    }
}

impl std::error::Error for CredentialsValidationError {}

fn parse_email(raw: &str) -> Result<EmailAddress, CredentialsValidationError> {
    match EmailAddress::new(raw) {
        Ok(email) => Ok(email),
        Err(UserValidationError::EmptyEmail) => Err(CredentialsValidationError::EmptyEmail),
        Err(other) => Err(CredentialsValidationError::InvalidEmail(other)),
    }
}

fn require_password(raw: &str) -> Result<Zeroizing<String>, CredentialsValidationError> {
    if raw.is_empty() {
        return Err(CredentialsValidationError::EmptyPassword);
    }
    Ok(Zeroizing::new(raw.to_owned()))
}

/// Validated login credentials used by the account service.
///
/// ## Invariants
/// - `email` is normalised (see [`EmailAddress`]).
/// - `password` is non-empty but otherwise kept verbatim, whitespace included.
///
/// # Examples
/// ```
/// use filelocker::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("Ada@Example.com", "pw").unwrap();
/// assert_eq!(creds.email().as_ref(), "ada@example.com");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, CredentialsValidationError> {
        Ok(Self {
            email: parse_email(email)?,
            password: require_password(password)?,
        })
    }

    /// Identity to look up.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    pub(crate) fn password_buffer(&self) -> Zeroizing<String> {
        self.password.clone()
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Validated registration request.
#[derive(Clone, PartialEq, Eq)]
pub struct Registration {
    email: EmailAddress,
    password: Zeroizing<String>,
    display_name: DisplayName,
}

impl Registration {
    /// Construct a registration from raw email, password and name inputs.
    ///
    /// Fields are checked in that order; the first failure is reported.
    pub fn try_from_parts(
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<Self, CredentialsValidationError> {
        let email = parse_email(email)?;
        let password = require_password(password)?;
        let display_name = match DisplayName::new(name) {
            Ok(value) => value,
            Err(UserValidationError::EmptyDisplayName) => {
                return Err(CredentialsValidationError::EmptyName);
            }
            Err(other) => return Err(CredentialsValidationError::InvalidName(other)),
        };
        Ok(Self {
            email,
            password,
            display_name,
        })
    }

    /// Identity to register.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    /// Display name for the new account.
    pub fn display_name(&self) -> &DisplayName {
        &self.display_name
    }

    pub(crate) fn password_buffer(&self) -> Zeroizing<String> {
        self.password.clone()
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("email", &self.email)
            .field("display_name", &self.display_name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw", CredentialsValidationError::EmptyEmail)]
    #[case("   ", "pw", CredentialsValidationError::EmptyEmail)]
    #[case(
        "not-an-email",
        "pw",
        CredentialsValidationError::InvalidEmail(UserValidationError::InvalidEmail)
    )]
    #[case("ada@example.com", "", CredentialsValidationError::EmptyPassword)]
    fn login_rejects_invalid_parts(
        #[case] email: &str,
        #[case] password: &str,
        #[case] expected: CredentialsValidationError,
    ) {
        assert_eq!(
            LoginCredentials::try_from_parts(email, password).err(),
            Some(expected)
        );
    }

    #[rstest]
    fn login_keeps_password_whitespace() {
        let creds = LoginCredentials::try_from_parts("ada@example.com", " pw ").expect("valid");
        assert_eq!(creds.password(), " pw ");
    }

    #[rstest]
    #[case("ada@example.com", "pw", "", CredentialsValidationError::EmptyName)]
    #[case("", "", "", CredentialsValidationError::EmptyEmail)]
    #[case("ada@example.com", "", "Ada", CredentialsValidationError::EmptyPassword)]
    fn registration_reports_first_failure(
        #[case] email: &str,
        #[case] password: &str,
        #[case] name: &str,
        #[case] expected: CredentialsValidationError,
    ) {
        assert_eq!(
            Registration::try_from_parts(email, password, name).err(),
            Some(expected)
        );
    }

    #[rstest]
    fn debug_output_omits_password() {
        let registration =
            Registration::try_from_parts("ada@example.com", "hunter2", "Ada").expect("valid");
        assert!(!format!("{registration:?}").contains("hunter2"));
    }
}
