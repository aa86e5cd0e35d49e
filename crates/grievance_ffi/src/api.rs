//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level functions to Dart via FRB.
//! - Translate core errors into the user-facing messages shown in toasts.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Every call opens its own connection and restores the persisted session
//!   before acting; no session state lives in this crate.
//! - Envelope `message` fields are safe to show to end users.

use grievance_core::db::open_db;
use grievance_core::model::grievance::ParseFieldError;
use grievance_core::model::jurisdiction::KNOWN_STATES;
use grievance_core::notice::{
    LOGIN_SUCCESS_MESSAGE, SIGNUP_SUCCESS_MESSAGE, SUBMIT_SUCCESS_MESSAGE,
};
use grievance_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    AuthError, AuthResult, Category, CoreConfig, DashboardView, FetchOutcome, Grievance,
    GrievanceDraft, GrievanceService, GrievanceStatus, LocalAuthProvider, PersistenceError,
    PersistenceOp, Priority, RepoError, ServiceResult, SessionContext, SessionUser,
    SignupProfile, SqliteGrievanceRepository, StatusCounts, StatusFilter,
};
use log::{error, info};
use rusqlite::Connection;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::OnceLock;
use uuid::Uuid;

static DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Reconfiguration attempts with different level or directory return error.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Pins the database file used by every later call.
///
/// Without this call the path comes from `GRIEVANCE_DB_PATH` or falls back
/// to the system temp directory.
///
/// # FFI contract
/// - Idempotent for the same path.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn configure_db_path(db_path: String) -> String {
    let trimmed = db_path.trim();
    if trimmed.is_empty() {
        return "db_path cannot be empty".to_string();
    }
    let requested = PathBuf::from(trimmed);
    let active = DB_PATH.get_or_init(|| requested.clone());
    if *active != requested {
        return format!(
            "db_path already configured at `{}`; refusing to switch to `{}`",
            active.display(),
            requested.display()
        );
    }
    info!("event=db_path_configure module=ffi status=ok");
    String::new()
}

/// Choices offered by the submission form and the admin dropdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormOptions {
    pub categories: Vec<String>,
    /// Stored priority keys (`low|medium|high`).
    pub priorities: Vec<String>,
    pub states: Vec<String>,
    /// Stored status keys (`pending|in-progress|resolved|closed`).
    pub statuses: Vec<String>,
}

/// Returns the fixed option lists used by the forms.
#[flutter_rust_bridge::frb(sync)]
pub fn form_options() -> FormOptions {
    FormOptions {
        categories: Category::ALL
            .iter()
            .map(|category| category.as_str().to_string())
            .collect(),
        priorities: Priority::ALL
            .iter()
            .map(|priority| priority.as_str().to_string())
            .collect(),
        states: KNOWN_STATES.iter().map(|state| state.to_string()).collect(),
        statuses: GrievanceStatus::ALL
            .iter()
            .map(|status| status.as_str().to_string())
            .collect(),
    }
}

/// Signed-in user as seen by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUserView {
    pub user_id: String,
    pub email: String,
    pub display_name: Option<String>,
    /// `citizen|admin`.
    pub role: String,
}

/// Response envelope for session calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthResponse {
    pub ok: bool,
    /// Current user; `None` when signed out or on failure.
    pub user: Option<SessionUserView>,
    pub message: String,
}

impl AuthResponse {
    fn signed_in(message: impl Into<String>, user: &SessionUser) -> Self {
        Self {
            ok: true,
            user: Some(to_session_user_view(user)),
            message: message.into(),
        }
    }

    fn signed_out(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            user: None,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            user: None,
            message: message.into(),
        }
    }
}

/// Creates an account and signs it in.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Password confirmation and length are checked before any write.
/// - Fails while another user is signed in.
#[flutter_rust_bridge::frb(sync)]
pub fn auth_signup(
    name: String,
    email: String,
    phone: String,
    password: String,
    confirm_password: String,
) -> AuthResponse {
    let profile = SignupProfile {
        name,
        email,
        phone,
        password,
        confirm_password,
    };
    let outcome = with_session(|session| {
        if session.current_user().is_some() {
            return Ok(None);
        }
        session.signup(&profile).map(Some)
    });
    match outcome {
        Ok(Some(user)) => AuthResponse::signed_in(SIGNUP_SUCCESS_MESSAGE, &user),
        Ok(None) => AuthResponse::failure(ALREADY_SIGNED_IN_MESSAGE),
        Err(message) => AuthResponse::failure(message),
    }
}

/// Signs in with email and password.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Fails while another user is signed in.
#[flutter_rust_bridge::frb(sync)]
pub fn auth_login(email: String, password: String) -> AuthResponse {
    let outcome = with_session(|session| {
        if session.current_user().is_some() {
            return Ok(None);
        }
        session.login(&email, &password).map(Some)
    });
    match outcome {
        Ok(Some(user)) => AuthResponse::signed_in(LOGIN_SUCCESS_MESSAGE, &user),
        Ok(None) => AuthResponse::failure(ALREADY_SIGNED_IN_MESSAGE),
        Err(message) => AuthResponse::failure(message),
    }
}

/// Ends the persisted session. Succeeds when already signed out.
#[flutter_rust_bridge::frb(sync)]
pub fn auth_logout() -> AuthResponse {
    let outcome = with_session(|session| {
        if session.current_user().is_some() {
            session.logout()?;
        }
        Ok(())
    });
    match outcome {
        Ok(()) => AuthResponse::signed_out("Signed out."),
        Err(message) => AuthResponse::failure(message),
    }
}

/// Restores the persisted session, if any.
#[flutter_rust_bridge::frb(sync)]
pub fn auth_session() -> AuthResponse {
    match with_session(|session| Ok(session.current_user().cloned())) {
        Ok(Some(user)) => AuthResponse::signed_in("Signed in.", &user),
        Ok(None) => AuthResponse::signed_out("Not signed in."),
        Err(message) => AuthResponse::failure(message),
    }
}

/// One grievance row prepared for list views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrievanceItem {
    pub grievance_id: String,
    pub short_id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub priority: String,
    pub priority_label: String,
    pub state: String,
    pub location: String,
    pub status: String,
    pub status_label: String,
    /// Submitter email, or `Anonymous` for anonymous records.
    pub submitter: String,
    pub anonymous: bool,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
}

/// Dashboard counters over the unfiltered list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GrievanceStats {
    pub total: u32,
    pub pending: u32,
    pub in_progress: u32,
    pub resolved: u32,
    pub closed: u32,
}

/// List response envelope for history and admin views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrievanceListResponse {
    pub ok: bool,
    /// Rows to display, newest first, after search and status filtering.
    pub items: Vec<GrievanceItem>,
    pub stats: GrievanceStats,
    pub message: String,
}

impl GrievanceListResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            items: Vec::new(),
            stats: GrievanceStats::default(),
            message: message.into(),
        }
    }
}

/// Generic action response envelope for grievance writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrievanceActionResponse {
    pub ok: bool,
    pub grievance_id: Option<String>,
    /// New status key after a status change.
    pub status: Option<String>,
    pub message: String,
}

impl GrievanceActionResponse {
    fn success(message: impl Into<String>, grievance_id: String, status: GrievanceStatus) -> Self {
        Self {
            ok: true,
            grievance_id: Some(grievance_id),
            status: Some(status.as_str().to_string()),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            grievance_id: None,
            status: None,
            message: message.into(),
        }
    }
}

/// Submits a grievance for the signed-in user.
///
/// Input semantics:
/// - `category`: a label from `form_options().categories`; blank means unset.
/// - `priority`: `low|medium|high`; `None` or blank means `medium`.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Nothing is written unless every required field is present.
#[flutter_rust_bridge::frb(sync)]
pub fn grievance_submit(
    title: String,
    description: String,
    category: String,
    priority: Option<String>,
    state: String,
    location: String,
    anonymous: bool,
) -> GrievanceActionResponse {
    let category = match parse_optional::<Category>(&category) {
        Ok(category) => category,
        Err(message) => return GrievanceActionResponse::failure(message),
    };
    let priority = match parse_optional::<Priority>(priority.as_deref().unwrap_or_default()) {
        Ok(priority) => priority,
        Err(message) => return GrievanceActionResponse::failure(message),
    };
    let draft = GrievanceDraft {
        title,
        description,
        category,
        priority,
        state,
        location,
        anonymous,
        attachments: Vec::new(),
    };

    match with_grievance_service(PersistenceOp::Submit, |service, user| {
        service.submit(user, &draft)
    }) {
        Ok(id) => GrievanceActionResponse::success(
            SUBMIT_SUCCESS_MESSAGE,
            id.to_string(),
            GrievanceStatus::Pending,
        ),
        Err(message) => GrievanceActionResponse::failure(message),
    }
}

/// Lists the signed-in user's grievances, newest first.
#[flutter_rust_bridge::frb(sync)]
pub fn grievance_list_mine() -> GrievanceListResponse {
    let mut view = DashboardView::new();
    let fetched = with_grievance_service(PersistenceOp::Load, |service, user| {
        match view.refresh(|| service.list_mine(user)) {
            FetchOutcome::Failed(err) => Err(err),
            FetchOutcome::Applied { .. } | FetchOutcome::Discarded => Ok(()),
        }
    });
    match fetched {
        Ok(()) => to_list_response(&view),
        Err(message) => GrievanceListResponse::failure(message),
    }
}

/// Lists every grievance for administrators, filtered by `search` and the
/// status dropdown value (`all|pending|inprogress|resolved|closed`).
///
/// `stats` always counts the unfiltered collection.
#[flutter_rust_bridge::frb(sync)]
pub fn grievance_admin_list(search: String, status: String) -> GrievanceListResponse {
    let status_filter = match status.parse::<StatusFilter>() {
        Ok(filter) => filter,
        Err(err) => {
            return GrievanceListResponse::failure(format!("Unknown status filter `{}`.", err.value))
        }
    };

    let mut view = DashboardView::new();
    view.set_search(search);
    view.set_status_filter(status_filter);
    let fetched = with_grievance_service(PersistenceOp::Load, |service, user| {
        match view.refresh(|| service.list_all(user)) {
            FetchOutcome::Failed(err) => Err(err),
            FetchOutcome::Applied { .. } | FetchOutcome::Discarded => Ok(()),
        }
    });
    match fetched {
        Ok(()) => to_list_response(&view),
        Err(message) => GrievanceListResponse::failure(message),
    }
}

/// Moves a grievance to `status`. Administrators only.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Disallowed lifecycle moves fail without writing.
#[flutter_rust_bridge::frb(sync)]
pub fn grievance_update_status(grievance_id: String, status: String) -> GrievanceActionResponse {
    let Ok(id) = Uuid::parse_str(grievance_id.trim()) else {
        return GrievanceActionResponse::failure("Invalid grievance id.");
    };
    let status = match status.parse::<GrievanceStatus>() {
        Ok(status) => status,
        Err(err) => {
            return GrievanceActionResponse::failure(format!("Unknown status `{}`.", err.value))
        }
    };

    match with_grievance_service(PersistenceOp::UpdateStatus, |service, user| {
        service.update_status(user, id, status)
    }) {
        Ok(updated) => GrievanceActionResponse::success(
            format!("Status updated to {}.", updated.status.display_label()),
            updated.id.to_string(),
            updated.status,
        ),
        Err(message) => GrievanceActionResponse::failure(message),
    }
}

const ALREADY_SIGNED_IN_MESSAGE: &str = "Already signed in. Please log out first.";

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| CoreConfig::from_env().db_path)
        .clone()
}

fn open_connection(op: &'static str) -> Result<Connection, RepoError> {
    open_db(resolve_db_path()).map_err(|err| {
        error!("event={op} module=ffi status=error stage=db_open error={err}");
        RepoError::from(err)
    })
}

fn open_session(conn: &Connection) -> AuthResult<SessionContext<LocalAuthProvider<'_>>> {
    let mut session = SessionContext::new(LocalAuthProvider::new(conn));
    session.initialize()?;
    Ok(session)
}

fn with_session<T>(
    f: impl FnOnce(&mut SessionContext<LocalAuthProvider<'_>>) -> AuthResult<T>,
) -> Result<T, String> {
    let conn = open_connection("auth").map_err(|err| {
        AuthError::Storage(err).user_message().to_string()
    })?;
    let mut session = open_session(&conn).map_err(|err| err.user_message().to_string())?;
    f(&mut session).map_err(|err| err.user_message().to_string())
}

fn with_grievance_service<T>(
    op: PersistenceOp,
    f: impl FnOnce(
        &GrievanceService<SqliteGrievanceRepository<'_>>,
        Option<&SessionUser>,
    ) -> ServiceResult<T>,
) -> Result<T, String> {
    let conn = open_connection("grievance").map_err(|err| {
        PersistenceError::new(err.cause(), op)
            .user_message()
            .to_string()
    })?;
    let session = open_session(&conn).map_err(|err| err.user_message().to_string())?;
    let service = GrievanceService::new(SqliteGrievanceRepository::new(&conn));
    f(&service, session.current_user()).map_err(|err| err.user_message().to_string())
}

fn parse_optional<T>(raw: &str) -> Result<Option<T>, String>
where
    T: FromStr<Err = ParseFieldError>,
{
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<T>()
        .map(Some)
        .map_err(|err| format!("Unknown {} `{}`.", err.field, err.value))
}

fn to_list_response(view: &DashboardView) -> GrievanceListResponse {
    let items = view
        .visible()
        .into_iter()
        .map(to_grievance_item)
        .collect::<Vec<_>>();
    let message = match view.empty_message() {
        Some(message) => message.to_string(),
        None => format!("Found {} grievance(s).", items.len()),
    };
    GrievanceListResponse {
        ok: true,
        items,
        stats: to_grievance_stats(view.stats()),
        message,
    }
}

fn to_grievance_item(grievance: &Grievance) -> GrievanceItem {
    GrievanceItem {
        grievance_id: grievance.id.to_string(),
        short_id: grievance.short_id(),
        title: grievance.title.clone(),
        description: grievance.description.clone(),
        category: grievance.category.as_str().to_string(),
        priority: grievance.priority.as_str().to_string(),
        priority_label: grievance.priority.display_label().to_string(),
        state: grievance.state.clone(),
        location: grievance.location.clone(),
        status: grievance.status.as_str().to_string(),
        status_label: grievance.status.display_label().to_string(),
        submitter: grievance.submitter_label().to_string(),
        anonymous: grievance.anonymous,
        created_at_ms: grievance.created_at,
        updated_at_ms: grievance.updated_at,
    }
}

fn to_grievance_stats(counts: StatusCounts) -> GrievanceStats {
    let clamp = |value: usize| u32::try_from(value).unwrap_or(u32::MAX);
    GrievanceStats {
        total: clamp(counts.total),
        pending: clamp(counts.pending),
        in_progress: clamp(counts.in_progress),
        resolved: clamp(counts.resolved),
        closed: clamp(counts.closed),
    }
}

fn to_session_user_view(user: &SessionUser) -> SessionUserView {
    SessionUserView {
        user_id: user.id.clone(),
        email: user.email.clone(),
        display_name: user.display_name.clone(),
        role: user.role.as_str().to_string(),
    }
}
