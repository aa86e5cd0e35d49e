//! Credential rows backing the local identity provider.
//!
//! # Responsibility
//! - Store users with password hashes and roles.
//! - Track failed login attempts and temporary lockouts.
//! - Hold the single persisted active-session slot.
//!
//! # Invariants
//! - Emails are stored lowercased and unique.
//! - Password hashes never leave this module except for verification.

use super::grievance_repo::{RepoError, RepoResult};
use crate::model::identity::{Role, SessionUser};
use rusqlite::{params, Connection, OptionalExtension, Row};

const USER_SELECT_SQL: &str = "SELECT
    id,
    email,
    display_name,
    phone,
    password_hash,
    role,
    failed_attempts,
    locked_until
FROM users";

/// Stored credential row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub phone: Option<String>,
    pub password_hash: String,
    pub role: Role,
    pub failed_attempts: u32,
    /// Epoch milliseconds until which logins are refused.
    pub locked_until: Option<i64>,
}

impl UserRecord {
    pub fn to_session_user(&self) -> SessionUser {
        SessionUser {
            id: self.id.clone(),
            email: self.email.clone(),
            display_name: self.display_name.clone(),
            role: self.role,
        }
    }
}

/// Insert payload for a new account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser<'a> {
    pub id: &'a str,
    pub email: &'a str,
    pub display_name: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub password_hash: &'a str,
    pub created_at: i64,
}

/// SQLite access to `users` and `active_session`.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    pub fn find_by_email(&self, email: &str) -> RepoResult<Option<UserRecord>> {
        self.find_one(&format!("{USER_SELECT_SQL} WHERE email = ?1;"), email)
    }

    pub fn find_by_id(&self, id: &str) -> RepoResult<Option<UserRecord>> {
        self.find_one(&format!("{USER_SELECT_SQL} WHERE id = ?1;"), id)
    }

    /// Inserts a citizen account. Returns `Ok(false)` when the email is taken.
    pub fn insert(&self, user: &NewUser<'_>) -> RepoResult<bool> {
        let inserted = self.conn.execute(
            "INSERT INTO users (
                id,
                email,
                display_name,
                phone,
                password_hash,
                role,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, 'citizen', ?6)
            ON CONFLICT(email) DO NOTHING;",
            params![
                user.id,
                user.email,
                user.display_name,
                user.phone,
                user.password_hash,
                user.created_at,
            ],
        )?;
        Ok(inserted == 1)
    }

    pub fn set_role(&self, email: &str, role: Role) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE users SET role = ?1 WHERE email = ?2;",
            params![role.as_str(), email],
        )?;
        Ok(changed == 1)
    }

    /// Stores the consecutive failure count and the lock deadline, if any.
    pub fn record_failed_attempt(
        &self,
        id: &str,
        attempts: u32,
        locked_until: Option<i64>,
    ) -> RepoResult<()> {
        self.conn.execute(
            "UPDATE users
             SET failed_attempts = ?1,
                 locked_until = ?2
             WHERE id = ?3;",
            params![attempts, locked_until, id],
        )?;
        Ok(())
    }

    pub fn clear_failed_attempts(&self, id: &str) -> RepoResult<()> {
        self.conn.execute(
            "UPDATE users SET failed_attempts = 0, locked_until = NULL WHERE id = ?1;",
            [id],
        )?;
        Ok(())
    }

    pub fn active_session_user_id(&self) -> RepoResult<Option<String>> {
        let user_id = self
            .conn
            .query_row(
                "SELECT user_id FROM active_session WHERE slot = 1;",
                [],
                |row| row.get(0),
            )
            .optional()?;
        Ok(user_id)
    }

    pub fn set_active_session(&self, user_id: &str, started_at: i64) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO active_session (slot, user_id, started_at) VALUES (1, ?1, ?2)
             ON CONFLICT(slot) DO UPDATE SET
                user_id = excluded.user_id,
                started_at = excluded.started_at;",
            params![user_id, started_at],
        )?;
        Ok(())
    }

    pub fn clear_active_session(&self) -> RepoResult<()> {
        self.conn
            .execute("DELETE FROM active_session WHERE slot = 1;", [])?;
        Ok(())
    }

    fn find_one(&self, sql: &str, key: &str) -> RepoResult<Option<UserRecord>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query([key])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }
        Ok(None)
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<UserRecord> {
    let role_text: String = row.get("role")?;
    let role = role_text
        .parse::<Role>()
        .map_err(|err| RepoError::InvalidData(format!("{err} in users.role")))?;
    let failed_attempts = row.get::<_, i64>("failed_attempts")?;

    Ok(UserRecord {
        id: row.get("id")?,
        email: row.get("email")?,
        display_name: row.get("display_name")?,
        phone: row.get("phone")?,
        password_hash: row.get("password_hash")?,
        role,
        failed_attempts: u32::try_from(failed_attempts).map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid failed_attempts value `{failed_attempts}` in users.failed_attempts"
            ))
        })?,
        locked_until: row.get("locked_until")?,
    })
}
