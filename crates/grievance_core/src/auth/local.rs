//! SQLite credential store implementing `AuthProvider`.
//!
//! # Invariants
//! - Passwords are stored only as argon2id hashes.
//! - An account is locked for `LOCKOUT_MS` after `MAX_FAILED_ATTEMPTS`
//!   consecutive failed logins.
//! - At most one active session is persisted.

use super::password::{hash_password, verify_password};
use super::provider::{
    check_password_strength, is_valid_email, normalize_email, AuthError, AuthProvider, AuthResult,
    SignupProfile,
};
use crate::model::identity::{Role, SessionUser};
use crate::repo::grievance_repo::now_epoch_ms;
use crate::repo::user_repo::{NewUser, SqliteUserRepository};
use log::{info, warn};
use rusqlite::Connection;
use uuid::Uuid;

pub const MAX_FAILED_ATTEMPTS: u32 = 5;
pub const LOCKOUT_MS: i64 = 60_000;

/// Identity provider backed by the `users` and `active_session` tables.
pub struct LocalAuthProvider<'conn> {
    users: SqliteUserRepository<'conn>,
    clock: fn() -> i64,
}

impl<'conn> LocalAuthProvider<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self {
            users: SqliteUserRepository::new(conn),
            clock: now_epoch_ms,
        }
    }

    /// Replaces the epoch-millisecond clock used for lockout windows.
    pub fn with_clock(mut self, clock: fn() -> i64) -> Self {
        self.clock = clock;
        self
    }

    /// Changes the role of an existing account.
    ///
    /// # Errors
    /// - `AuthError::UserNotFound` when no account uses `email`.
    pub fn grant_role(&self, email: &str, role: Role) -> AuthResult<()> {
        if !self.users.set_role(&normalize_email(email), role)? {
            return Err(AuthError::UserNotFound);
        }
        info!("event=auth_grant_role module=auth status=ok role={}", role.as_str());
        Ok(())
    }
}

impl AuthProvider for LocalAuthProvider<'_> {
    fn restore_session(&self) -> AuthResult<Option<SessionUser>> {
        let Some(user_id) = self.users.active_session_user_id()? else {
            return Ok(None);
        };
        let user = self.users.find_by_id(&user_id)?;
        Ok(user.map(|record| record.to_session_user()))
    }

    fn login(&self, email: &str, password: &str) -> AuthResult<SessionUser> {
        let email = normalize_email(email);
        if !is_valid_email(&email) {
            return Err(AuthError::InvalidEmail);
        }
        let Some(user) = self.users.find_by_email(&email)? else {
            return Err(AuthError::UserNotFound);
        };

        let now = (self.clock)();
        if user.locked_until.is_some_and(|until| until > now) {
            warn!("event=auth_login module=auth status=error error_code=too-many-requests");
            return Err(AuthError::TooManyRequests);
        }

        if !verify_password(password, &user.password_hash)? {
            // An expired lock starts a fresh run of attempts.
            let prior = if user.locked_until.is_some() {
                0
            } else {
                user.failed_attempts
            };
            let attempts = prior.saturating_add(1);
            let locked_until = (attempts >= MAX_FAILED_ATTEMPTS).then_some(now + LOCKOUT_MS);
            self.users.record_failed_attempt(&user.id, attempts, locked_until)?;
            warn!(
                "event=auth_login module=auth status=error error_code=invalid-credential attempts={attempts}"
            );
            return Err(AuthError::InvalidCredential);
        }

        self.users.clear_failed_attempts(&user.id)?;
        self.users.set_active_session(&user.id, now)?;
        info!("event=auth_login module=auth status=ok role={}", user.role.as_str());
        Ok(user.to_session_user())
    }

    fn signup(&self, profile: &SignupProfile) -> AuthResult<SessionUser> {
        let email = normalize_email(&profile.email);
        if !is_valid_email(&email) {
            return Err(AuthError::InvalidEmail);
        }
        check_password_strength(&profile.password)?;

        let id = Uuid::new_v4().to_string();
        let password_hash = hash_password(&profile.password)?;
        let display_name = non_blank(&profile.name);
        let phone = non_blank(&profile.phone);
        let now = (self.clock)();

        let inserted = self.users.insert(&NewUser {
            id: &id,
            email: &email,
            display_name,
            phone,
            password_hash: &password_hash,
            created_at: now,
        })?;
        if !inserted {
            return Err(AuthError::EmailAlreadyInUse);
        }

        self.users.set_active_session(&id, now)?;
        info!("event=auth_signup module=auth status=ok");
        Ok(SessionUser {
            id,
            email,
            display_name: display_name.map(str::to_string),
            role: Role::Citizen,
        })
    }

    fn logout(&self) -> AuthResult<()> {
        self.users.clear_active_session()?;
        info!("event=auth_logout module=auth status=ok");
        Ok(())
    }
}

fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}
