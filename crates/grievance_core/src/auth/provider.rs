//! Identity provider contract and error taxonomy.

use crate::model::identity::SessionUser;
use crate::repo::grievance_repo::RepoError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_CHARS: usize = 6;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

pub type AuthResult<T> = Result<T, AuthError>;

/// Login/signup/logout failures.
#[derive(Debug)]
pub enum AuthError {
    InvalidCredential,
    UserNotFound,
    TooManyRequests,
    EmailAlreadyInUse,
    WeakPassword { min_len: usize },
    InvalidEmail,
    /// Signup password and confirmation differ.
    PasswordMismatch,
    /// Requested action is not valid from the current session state.
    InvalidTransition {
        from: &'static str,
        action: &'static str,
    },
    Storage(RepoError),
    Other(String),
}

impl AuthError {
    /// Stable error code in the hosted-auth style (`invalid-credential`).
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidCredential => "invalid-credential",
            Self::UserNotFound => "user-not-found",
            Self::TooManyRequests => "too-many-requests",
            Self::EmailAlreadyInUse => "email-already-in-use",
            Self::WeakPassword { .. } => "weak-password",
            Self::InvalidEmail => "invalid-email",
            Self::PasswordMismatch => "password-mismatch",
            Self::InvalidTransition { .. } | Self::Storage(_) | Self::Other(_) => "other",
        }
    }

    /// Message suitable for a toast notice.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidCredential | Self::UserNotFound => "Invalid email or password.",
            Self::TooManyRequests => "Too many failed attempts. Please try again later.",
            Self::EmailAlreadyInUse => "An account with this email already exists.",
            Self::WeakPassword { .. } => "Password should be at least 6 characters long.",
            Self::InvalidEmail => "Invalid email address.",
            Self::PasswordMismatch => "Passwords don't match!",
            Self::InvalidTransition { .. } | Self::Storage(_) | Self::Other(_) => {
                "Please try again later."
            }
        }
    }
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WeakPassword { min_len } => {
                write!(f, "weak-password: minimum length is {min_len} characters")
            }
            Self::InvalidTransition { from, action } => {
                write!(f, "cannot {action} while session is {from}")
            }
            Self::Storage(err) => write!(f, "credential store error: {err}"),
            Self::Other(message) => write!(f, "{message}"),
            other => f.write_str(other.code()),
        }
    }
}

impl Error for AuthError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for AuthError {
    fn from(value: RepoError) -> Self {
        Self::Storage(value)
    }
}

/// Signup form input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignupProfile {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub confirm_password: String,
}

/// External identity boundary.
///
/// Implementations talk to whatever holds credentials; callers only see
/// `SessionUser` values and `AuthError`s.
pub trait AuthProvider {
    /// Returns the persisted session, if one survives from an earlier run.
    fn restore_session(&self) -> AuthResult<Option<SessionUser>>;
    fn login(&self, email: &str, password: &str) -> AuthResult<SessionUser>;
    fn signup(&self, profile: &SignupProfile) -> AuthResult<SessionUser>;
    fn logout(&self) -> AuthResult<()>;
}

impl<T: AuthProvider + ?Sized> AuthProvider for &T {
    fn restore_session(&self) -> AuthResult<Option<SessionUser>> {
        (**self).restore_session()
    }

    fn login(&self, email: &str, password: &str) -> AuthResult<SessionUser> {
        (**self).login(email, password)
    }

    fn signup(&self, profile: &SignupProfile) -> AuthResult<SessionUser> {
        (**self).signup(profile)
    }

    fn logout(&self) -> AuthResult<()> {
        (**self).logout()
    }
}

/// Lowercases and trims an email address.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Checks the `local@domain.tld` shape.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

/// Rejects passwords shorter than [`MIN_PASSWORD_CHARS`].
pub fn check_password_strength(password: &str) -> AuthResult<()> {
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(AuthError::WeakPassword {
            min_len: MIN_PASSWORD_CHARS,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{check_password_strength, is_valid_email, AuthError};

    #[test]
    fn email_shape_check() {
        assert!(is_valid_email("citizen@example.in"));
        assert!(!is_valid_email("citizen@localhost"));
        assert!(!is_valid_email("no at sign.com"));
    }

    #[test]
    fn four_character_password_is_weak() {
        let err = check_password_strength("abcd").expect_err("weak password must fail");
        assert!(matches!(err, AuthError::WeakPassword { min_len: 6 }));
        assert!(err.to_string().contains('6'));
    }

    #[test]
    fn unknown_failures_collapse_to_generic_message() {
        let err = AuthError::Other("socket closed".to_string());
        assert_eq!(err.code(), "other");
        assert_eq!(err.user_message(), "Please try again later.");
    }
}
