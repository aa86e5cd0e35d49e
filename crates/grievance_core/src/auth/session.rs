//! Session state machine over an `AuthProvider`.
//!
//! ```text
//! Uninitialized -> Loading -> Authenticated(user) | Anonymous
//! Anonymous --login/signup--> Authenticated
//! Authenticated --logout--> Anonymous
//! ```
//!
//! Every other transition is rejected with `AuthError::InvalidTransition`.

use super::provider::{
    check_password_strength, AuthError, AuthProvider, AuthResult, SignupProfile,
};
use crate::model::identity::SessionUser;
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Uninitialized,
    Loading,
    Authenticated(SessionUser),
    Anonymous,
}

impl SessionState {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Loading => "loading",
            Self::Authenticated(_) => "authenticated",
            Self::Anonymous => "anonymous",
        }
    }
}

/// Why protected content cannot be shown yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessError {
    /// The initial session check has not completed.
    SessionLoading,
    /// Loading finished and nobody is signed in.
    AuthRequired,
}

impl Display for AccessError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SessionLoading => write!(f, "session check still in progress"),
            Self::AuthRequired => write!(f, "authentication required"),
        }
    }
}

impl Error for AccessError {}

/// Current-user context handed explicitly to services and views.
pub struct SessionContext<P: AuthProvider> {
    provider: P,
    state: SessionState,
}

impl<P: AuthProvider> SessionContext<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            state: SessionState::Uninitialized,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// True until the initial session check has completed.
    pub fn is_loading(&self) -> bool {
        matches!(
            self.state,
            SessionState::Uninitialized | SessionState::Loading
        )
    }

    pub fn current_user(&self) -> Option<&SessionUser> {
        match &self.state {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    /// Gate for protected content.
    pub fn require_user(&self) -> Result<&SessionUser, AccessError> {
        match &self.state {
            SessionState::Authenticated(user) => Ok(user),
            SessionState::Anonymous => Err(AccessError::AuthRequired),
            SessionState::Uninitialized | SessionState::Loading => {
                Err(AccessError::SessionLoading)
            }
        }
    }

    /// Moves `Uninitialized -> Loading`.
    ///
    /// Hosts that restore the session asynchronously call this, run
    /// `restore_session` elsewhere, then hand the outcome to
    /// [`SessionContext::finish_loading`].
    pub fn begin_loading(&mut self) -> AuthResult<()> {
        self.expect_state(matches!(self.state, SessionState::Uninitialized), "load")?;
        self.state = SessionState::Loading;
        Ok(())
    }

    /// Resolves `Loading` into `Authenticated` or `Anonymous`.
    ///
    /// A failed session check leaves the context `Anonymous` and returns the
    /// failure so the caller can surface it.
    pub fn finish_loading(&mut self, restored: AuthResult<Option<SessionUser>>) -> AuthResult<()> {
        self.expect_state(matches!(self.state, SessionState::Loading), "finish loading")?;
        match restored {
            Ok(Some(user)) => {
                self.state = SessionState::Authenticated(user);
                Ok(())
            }
            Ok(None) => {
                self.state = SessionState::Anonymous;
                Ok(())
            }
            Err(err) => {
                warn!(
                    "event=session_restore module=auth status=error error_code={}",
                    err.code()
                );
                self.state = SessionState::Anonymous;
                Err(err)
            }
        }
    }

    /// Runs the initial session check synchronously.
    pub fn initialize(&mut self) -> AuthResult<()> {
        self.begin_loading()?;
        let restored = self.provider.restore_session();
        self.finish_loading(restored)
    }

    pub fn login(&mut self, email: &str, password: &str) -> AuthResult<SessionUser> {
        self.expect_state(matches!(self.state, SessionState::Anonymous), "log in")?;
        let user = self.provider.login(email, password)?;
        Ok(self.authenticate(user))
    }

    /// Creates an account and signs it in.
    ///
    /// Confirmation mismatch and short passwords are rejected before the
    /// provider is contacted.
    pub fn signup(&mut self, profile: &SignupProfile) -> AuthResult<SessionUser> {
        self.expect_state(matches!(self.state, SessionState::Anonymous), "sign up")?;
        if profile.password != profile.confirm_password {
            return Err(AuthError::PasswordMismatch);
        }
        check_password_strength(&profile.password)?;
        let user = self.provider.signup(profile)?;
        Ok(self.authenticate(user))
    }

    pub fn logout(&mut self) -> AuthResult<()> {
        self.expect_state(
            matches!(self.state, SessionState::Authenticated(_)),
            "log out",
        )?;
        self.provider.logout()?;
        self.state = SessionState::Anonymous;
        Ok(())
    }

    fn authenticate(&mut self, user: SessionUser) -> SessionUser {
        self.state = SessionState::Authenticated(user.clone());
        user
    }

    fn expect_state(&self, allowed: bool, action: &'static str) -> AuthResult<()> {
        if allowed {
            return Ok(());
        }
        Err(AuthError::InvalidTransition {
            from: self.state.label(),
            action,
        })
    }
}
