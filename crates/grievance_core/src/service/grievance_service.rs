//! Grievance use-case service.
//!
//! # Responsibility
//! - Run the submission flow: validate, then persist.
//! - Serve owner and administrative reads.
//! - Apply administrative status transitions.
//!
//! # Invariants
//! - The validator always runs before the repository is touched.
//! - Session identity is an explicit argument on every call.
//! - Whole-collection reads and status changes require `Role::Admin`.

use crate::model::draft::{
    validate_submission, GrievanceDraft, SubmissionError, ValidatedGrievance,
};
use crate::model::grievance::{Grievance, GrievanceId, GrievanceStatus};
use crate::model::identity::SessionUser;
use crate::repo::grievance_repo::{GrievanceRepository, PersistenceCause, RepoError};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Gateway operation that failed, used to pick the fallback message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistenceOp {
    Submit,
    Load,
    UpdateStatus,
}

impl PersistenceOp {
    fn as_str(self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::Load => "load",
            Self::UpdateStatus => "update_status",
        }
    }
}

/// Create/read failure surfaced to the user, never retried automatically.
#[derive(Debug)]
pub struct PersistenceError {
    pub cause: PersistenceCause,
    pub op: PersistenceOp,
    source: Option<RepoError>,
}

impl PersistenceError {
    pub fn new(cause: PersistenceCause, op: PersistenceOp) -> Self {
        Self {
            cause,
            op,
            source: None,
        }
    }

    fn from_repo(err: RepoError, op: PersistenceOp) -> Self {
        Self {
            cause: err.cause(),
            op,
            source: Some(err),
        }
    }

    pub fn user_message(&self) -> &'static str {
        match (self.cause, self.op) {
            (PersistenceCause::PermissionDenied, _) => {
                "Permission denied. Please check your account permissions."
            }
            (PersistenceCause::Unavailable, _) => {
                "Service unavailable. Please check your internet connection."
            }
            (PersistenceCause::Unauthenticated, _) => {
                "Authentication required. Please log in again."
            }
            (PersistenceCause::Unknown, PersistenceOp::Submit) => {
                "Failed to submit grievance. Please try again."
            }
            (PersistenceCause::Unknown, PersistenceOp::Load) => {
                "Failed to load grievances. Please try again."
            }
            (PersistenceCause::Unknown, PersistenceOp::UpdateStatus) => {
                "Failed to update grievance status. Please try again."
            }
        }
    }
}

impl Display for PersistenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.source {
            Some(err) => write!(f, "{} failed ({}): {err}", self.op.as_str(), self.cause),
            None => write!(f, "{} failed ({})", self.op.as_str(), self.cause),
        }
    }
}

impl Error for PersistenceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source.as_ref().map(|err| err as &(dyn Error + 'static))
    }
}

/// Service-level error for grievance use cases.
#[derive(Debug)]
pub enum GrievanceServiceError {
    Submission(SubmissionError),
    Persistence(PersistenceError),
    NotFound(GrievanceId),
    InvalidTransition {
        from: GrievanceStatus,
        to: GrievanceStatus,
    },
}

impl GrievanceServiceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Submission(err) => err.user_message(),
            Self::Persistence(err) => err.user_message(),
            Self::NotFound(_) => "Grievance not found.",
            Self::InvalidTransition { .. } => "This status change is not allowed.",
        }
    }
}

impl Display for GrievanceServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Submission(err) => write!(f, "{err}"),
            Self::Persistence(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "grievance not found: {id}"),
            Self::InvalidTransition { from, to } => write!(
                f,
                "status cannot move from `{}` to `{}`",
                from.as_str(),
                to.as_str()
            ),
        }
    }
}

impl Error for GrievanceServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Submission(err) => Some(err),
            Self::Persistence(err) => Some(err),
            Self::NotFound(_) | Self::InvalidTransition { .. } => None,
        }
    }
}

impl From<SubmissionError> for GrievanceServiceError {
    fn from(value: SubmissionError) -> Self {
        Self::Submission(value)
    }
}

impl From<PersistenceError> for GrievanceServiceError {
    fn from(value: PersistenceError) -> Self {
        Self::Persistence(value)
    }
}

pub type ServiceResult<T> = Result<T, GrievanceServiceError>;

/// Use-case facade over a grievance repository.
pub struct GrievanceService<R: GrievanceRepository> {
    repo: R,
}

impl<R: GrievanceRepository> GrievanceService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Validates and stores a new grievance for the signed-in user.
    pub fn submit(
        &self,
        session: Option<&SessionUser>,
        draft: &GrievanceDraft,
    ) -> ServiceResult<GrievanceId> {
        let validated = self.prepare(session, draft)?;
        self.persist(session, &validated)
    }

    /// Runs the validator only. Nothing is written.
    pub fn prepare(
        &self,
        session: Option<&SessionUser>,
        draft: &GrievanceDraft,
    ) -> ServiceResult<ValidatedGrievance> {
        validate_submission(draft, session).map_err(|err| {
            warn!("event=grievance_submit module=service status=rejected reason=\"{err}\"");
            err.into()
        })
    }

    /// Writes a previously validated submission.
    ///
    /// # Errors
    /// - `Unauthenticated` when the session no longer belongs to the user the
    ///   submission was validated for (signed out or switched in between).
    pub fn persist(
        &self,
        session: Option<&SessionUser>,
        validated: &ValidatedGrievance,
    ) -> ServiceResult<GrievanceId> {
        let still_signed_in = session.is_some_and(|user| user.id == validated.user_id());
        if !still_signed_in {
            warn!("event=grievance_submit module=service status=error cause=unauthenticated");
            return Err(
                PersistenceError::new(PersistenceCause::Unauthenticated, PersistenceOp::Submit)
                    .into(),
            );
        }

        let id = self
            .repo
            .create_grievance(validated)
            .map_err(|err| log_repo_error(err, PersistenceOp::Submit))?;
        info!("event=grievance_submit module=service status=ok id={id}");
        Ok(id)
    }

    /// Lists the signed-in user's grievances, newest first.
    pub fn list_mine(&self, session: Option<&SessionUser>) -> ServiceResult<Vec<Grievance>> {
        let user = require_session(session, PersistenceOp::Load)?;
        let items = self
            .repo
            .list_for_user(&user.id)
            .map_err(|err| log_repo_error(err, PersistenceOp::Load))?;
        info!(
            "event=grievance_list module=service status=ok scope=mine count={}",
            items.len()
        );
        Ok(items)
    }

    /// Lists every grievance, newest first. Administrators only.
    pub fn list_all(&self, session: Option<&SessionUser>) -> ServiceResult<Vec<Grievance>> {
        require_admin(session, PersistenceOp::Load)?;
        let items = self
            .repo
            .list_all()
            .map_err(|err| log_repo_error(err, PersistenceOp::Load))?;
        info!(
            "event=grievance_list module=service status=ok scope=all count={}",
            items.len()
        );
        Ok(items)
    }

    /// Moves a grievance along its lifecycle. Administrators only.
    pub fn update_status(
        &self,
        session: Option<&SessionUser>,
        id: GrievanceId,
        status: GrievanceStatus,
    ) -> ServiceResult<Grievance> {
        require_admin(session, PersistenceOp::UpdateStatus)?;
        self.repo.update_status(id, status).map_err(|err| match err {
            RepoError::NotFound(id) => GrievanceServiceError::NotFound(id),
            RepoError::InvalidTransition { from, to, .. } => {
                GrievanceServiceError::InvalidTransition { from, to }
            }
            other => log_repo_error(other, PersistenceOp::UpdateStatus),
        })
    }

    /// Reads one grievance. Owners see their own; administrators see any.
    pub fn get(
        &self,
        session: Option<&SessionUser>,
        id: GrievanceId,
    ) -> ServiceResult<Option<Grievance>> {
        let user = require_session(session, PersistenceOp::Load)?;
        let found = self
            .repo
            .get_grievance(id)
            .map_err(|err| log_repo_error(err, PersistenceOp::Load))?;
        match found {
            Some(grievance) if !user.is_admin() && !grievance.is_owned_by(&user.id) => Err(
                PersistenceError::new(PersistenceCause::PermissionDenied, PersistenceOp::Load)
                    .into(),
            ),
            other => Ok(other),
        }
    }
}

fn require_session(
    session: Option<&SessionUser>,
    op: PersistenceOp,
) -> Result<&SessionUser, PersistenceError> {
    session.ok_or_else(|| PersistenceError::new(PersistenceCause::Unauthenticated, op))
}

fn require_admin(
    session: Option<&SessionUser>,
    op: PersistenceOp,
) -> Result<&SessionUser, PersistenceError> {
    let user = require_session(session, op)?;
    if !user.is_admin() {
        warn!(
            "event=grievance_access module=service status=denied op={}",
            op.as_str()
        );
        return Err(PersistenceError::new(PersistenceCause::PermissionDenied, op));
    }
    Ok(user)
}

fn log_repo_error(err: RepoError, op: PersistenceOp) -> GrievanceServiceError {
    error!(
        "event=grievance_{} module=service status=error cause={} error={err}",
        op.as_str(),
        err.cause()
    );
    PersistenceError::from_repo(err, op).into()
}
