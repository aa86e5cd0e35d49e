//! Core domain logic for the civic grievance system.
//! This crate is the single source of truth for submission, listing and
//! session invariants.

pub mod auth;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod notice;
pub mod repo;
pub mod search;
pub mod service;

pub use auth::local::LocalAuthProvider;
pub use auth::provider::{AuthError, AuthProvider, AuthResult, SignupProfile};
pub use auth::session::{AccessError, SessionContext, SessionState};
pub use config::CoreConfig;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::draft::{
    validate_submission, GrievanceDraft, RequiredField, SubmissionError, ValidatedGrievance,
    ValidationError,
};
pub use model::grievance::{Category, Grievance, GrievanceId, GrievanceStatus, Priority};
pub use model::identity::{Role, SessionUser};
pub use notice::{Notice, NoticeBoard, NoticeKind};
pub use repo::grievance_repo::{
    GrievanceRepository, PersistenceCause, RepoError, RepoResult, SqliteGrievanceRepository,
};
pub use search::filter::{filter_grievances, GrievanceFilter, StatusCounts, StatusFilter};
pub use service::dashboard::{DashboardView, FetchOutcome, FetchTicket};
pub use service::grievance_service::{
    GrievanceService, GrievanceServiceError, PersistenceError, PersistenceOp, ServiceResult,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
