//! Grievance persistence gateway and its SQLite implementation.
//!
//! # Responsibility
//! - Create grievances with server-assigned id, status and timestamps.
//! - Serve owner-filtered and whole-collection reads, newest first.
//! - Apply administrative status transitions.
//!
//! # Invariants
//! - Writes only accept `ValidatedGrievance`; status is never caller-chosen
//!   on create.
//! - `created_at` is strictly increasing across the collection.
//! - Reads reject invalid persisted rows instead of masking them.

use crate::db::DbError;
use crate::model::draft::ValidatedGrievance;
use crate::model::grievance::{Grievance, GrievanceId, GrievanceStatus};
use log::{error, info};
use rusqlite::{params, Connection, ErrorCode, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

const GRIEVANCE_SELECT_SQL: &str = "SELECT
    id,
    title,
    description,
    category,
    priority,
    state,
    location,
    status,
    anonymous,
    user_id,
    user_email,
    created_at,
    updated_at
FROM grievances";

const NEWEST_FIRST_SQL: &str = " ORDER BY created_at DESC, id ASC";

pub type RepoResult<T> = Result<T, RepoError>;

/// Failure category surfaced to callers of the persistence gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PersistenceCause {
    PermissionDenied,
    Unavailable,
    Unauthenticated,
    Unknown,
}

impl PersistenceCause {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PermissionDenied => "permission-denied",
            Self::Unavailable => "unavailable",
            Self::Unauthenticated => "unauthenticated",
            Self::Unknown => "unknown",
        }
    }
}

impl Display for PersistenceCause {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Repository error for grievance persistence and queries.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(GrievanceId),
    InvalidData(String),
    InvalidTransition {
        id: GrievanceId,
        from: GrievanceStatus,
        to: GrievanceStatus,
    },
}

impl RepoError {
    /// Classifies this error into the gateway's failure taxonomy.
    pub fn cause(&self) -> PersistenceCause {
        match self {
            Self::Db(DbError::Sqlite(err)) => classify_sqlite_error(err),
            Self::Db(DbError::UnsupportedSchemaVersion { .. }) => PersistenceCause::Unavailable,
            Self::NotFound(_) | Self::InvalidData(_) | Self::InvalidTransition { .. } => {
                PersistenceCause::Unknown
            }
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "grievance not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted grievance data: {message}"),
            Self::InvalidTransition { id, from, to } => write!(
                f,
                "grievance {id} cannot move from `{}` to `{}`",
                from.as_str(),
                to.as_str()
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persistence gateway for the grievance collection.
pub trait GrievanceRepository {
    /// Stores a validated grievance as `pending` and returns its new id.
    fn create_grievance(&self, record: &ValidatedGrievance) -> RepoResult<GrievanceId>;
    /// Returns records owned by `user_id`, newest first.
    fn list_for_user(&self, user_id: &str) -> RepoResult<Vec<Grievance>>;
    /// Returns every record, newest first.
    fn list_all(&self) -> RepoResult<Vec<Grievance>>;
    fn get_grievance(&self, id: GrievanceId) -> RepoResult<Option<Grievance>>;
    /// Moves one grievance to `status` if the lifecycle allows it.
    fn update_status(&self, id: GrievanceId, status: GrievanceStatus) -> RepoResult<Grievance>;
}

impl<T: GrievanceRepository + ?Sized> GrievanceRepository for &T {
    fn create_grievance(&self, record: &ValidatedGrievance) -> RepoResult<GrievanceId> {
        (**self).create_grievance(record)
    }

    fn list_for_user(&self, user_id: &str) -> RepoResult<Vec<Grievance>> {
        (**self).list_for_user(user_id)
    }

    fn list_all(&self) -> RepoResult<Vec<Grievance>> {
        (**self).list_all()
    }

    fn get_grievance(&self, id: GrievanceId) -> RepoResult<Option<Grievance>> {
        (**self).get_grievance(id)
    }

    fn update_status(&self, id: GrievanceId, status: GrievanceStatus) -> RepoResult<Grievance> {
        (**self).update_status(id, status)
    }
}

/// SQLite-backed grievance collection.
pub struct SqliteGrievanceRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteGrievanceRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn query_list(&self, sql: &str, bind: Option<&str>) -> RepoResult<Vec<Grievance>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = match bind {
            Some(value) => stmt.query([value])?,
            None => stmt.query([])?,
        };
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_grievance_row(row)?);
        }
        Ok(items)
    }
}

impl GrievanceRepository for SqliteGrievanceRepository<'_> {
    fn create_grievance(&self, record: &ValidatedGrievance) -> RepoResult<GrievanceId> {
        let id = Uuid::new_v4();
        let tx = self.conn.unchecked_transaction()?;
        let newest: Option<i64> =
            tx.query_row("SELECT MAX(created_at) FROM grievances;", [], |row| {
                row.get(0)
            })?;
        let created_at = next_created_at(now_epoch_ms(), newest);

        let inserted = tx.execute(
            "INSERT INTO grievances (
                id,
                title,
                description,
                category,
                priority,
                state,
                location,
                status,
                anonymous,
                user_id,
                user_email,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12);",
            params![
                id.to_string(),
                record.title(),
                record.description(),
                record.category().as_str(),
                record.priority().as_str(),
                record.state(),
                record.location(),
                GrievanceStatus::Pending.as_str(),
                bool_to_int(record.anonymous()),
                record.user_id(),
                record.user_email(),
                created_at,
            ],
        );
        if let Err(err) = inserted {
            let err = RepoError::from(err);
            error!(
                "event=grievance_create module=repo status=error cause={} error={err}",
                err.cause()
            );
            return Err(err);
        }
        tx.commit()?;

        info!("event=grievance_create module=repo status=ok id={id} created_at={created_at}");
        Ok(id)
    }

    fn list_for_user(&self, user_id: &str) -> RepoResult<Vec<Grievance>> {
        self.query_list(
            &format!("{GRIEVANCE_SELECT_SQL} WHERE user_id = ?1{NEWEST_FIRST_SQL};"),
            Some(user_id),
        )
    }

    fn list_all(&self) -> RepoResult<Vec<Grievance>> {
        self.query_list(&format!("{GRIEVANCE_SELECT_SQL}{NEWEST_FIRST_SQL};"), None)
    }

    fn get_grievance(&self, id: GrievanceId) -> RepoResult<Option<Grievance>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{GRIEVANCE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_grievance_row(row)?));
        }
        Ok(None)
    }

    fn update_status(&self, id: GrievanceId, status: GrievanceStatus) -> RepoResult<Grievance> {
        let tx = self.conn.unchecked_transaction()?;
        let current = {
            let repo = SqliteGrievanceRepository::new(&tx);
            repo.get_grievance(id)?.ok_or(RepoError::NotFound(id))?
        };

        if !current.status.can_transition_to(status) {
            return Err(RepoError::InvalidTransition {
                id,
                from: current.status,
                to: status,
            });
        }

        let updated_at = now_epoch_ms().max(current.updated_at);
        tx.execute(
            "UPDATE grievances SET status = ?1, updated_at = ?2 WHERE id = ?3;",
            params![status.as_str(), updated_at, id.to_string()],
        )?;
        tx.commit()?;

        info!(
            "event=grievance_status module=repo status=ok id={id} from={} to={}",
            current.status.as_str(),
            status.as_str()
        );
        Ok(Grievance {
            status,
            updated_at,
            ..current
        })
    }
}

fn parse_grievance_row(row: &Row<'_>) -> RepoResult<Grievance> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid id value `{id_text}` in grievances.id"))
    })?;

    let category_text: String = row.get("category")?;
    let priority_text: String = row.get("priority")?;
    let status_text: String = row.get("status")?;

    let anonymous = match row.get::<_, i64>("anonymous")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid anonymous value `{other}` in grievances.anonymous"
            )));
        }
    };

    Ok(Grievance {
        id,
        title: row.get("title")?,
        description: row.get("description")?,
        category: category_text
            .parse()
            .map_err(|err| RepoError::InvalidData(format!("{err} in grievances.category")))?,
        priority: priority_text
            .parse()
            .map_err(|err| RepoError::InvalidData(format!("{err} in grievances.priority")))?,
        state: row.get("state")?,
        location: row.get("location")?,
        status: status_text
            .parse()
            .map_err(|err| RepoError::InvalidData(format!("{err} in grievances.status")))?,
        anonymous,
        user_id: row.get("user_id")?,
        user_email: row.get("user_email")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

/// Keeps creation timestamps strictly increasing even when the wall clock
/// stalls or steps backwards.
fn next_created_at(now_ms: i64, newest: Option<i64>) -> i64 {
    match newest {
        Some(newest) if newest >= now_ms => newest + 1,
        _ => now_ms,
    }
}

fn classify_sqlite_error(err: &rusqlite::Error) -> PersistenceCause {
    match err.sqlite_error_code() {
        Some(
            ErrorCode::DatabaseBusy
            | ErrorCode::DatabaseLocked
            | ErrorCode::CannotOpen
            | ErrorCode::SystemIoFailure
            | ErrorCode::DiskFull
            | ErrorCode::FileLockingProtocolFailed,
        ) => PersistenceCause::Unavailable,
        Some(
            ErrorCode::PermissionDenied
            | ErrorCode::ReadOnly
            | ErrorCode::AuthorizationForStatementDenied
            | ErrorCode::ConstraintViolation,
        ) => PersistenceCause::PermissionDenied,
        _ => PersistenceCause::Unknown,
    }
}

pub(crate) fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
        })
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::{next_created_at, PersistenceCause, RepoError};
    use crate::db::DbError;

    #[test]
    fn created_at_moves_past_newest_when_clock_stalls() {
        assert_eq!(next_created_at(1_000, None), 1_000);
        assert_eq!(next_created_at(1_000, Some(999)), 1_000);
        assert_eq!(next_created_at(1_000, Some(1_000)), 1_001);
        assert_eq!(next_created_at(1_000, Some(5_000)), 5_001);
    }

    #[test]
    fn busy_database_is_unavailable() {
        let err = RepoError::from(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            None,
        ));
        assert_eq!(err.cause(), PersistenceCause::Unavailable);
    }

    #[test]
    fn read_only_database_is_permission_denied() {
        let err = RepoError::from(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_READONLY),
            None,
        ));
        assert_eq!(err.cause(), PersistenceCause::PermissionDenied);
    }

    #[test]
    fn newer_schema_is_unavailable() {
        let err = RepoError::Db(DbError::UnsupportedSchemaVersion {
            db_version: 9,
            latest_supported: 2,
        });
        assert_eq!(err.cause(), PersistenceCause::Unavailable);
    }
}
