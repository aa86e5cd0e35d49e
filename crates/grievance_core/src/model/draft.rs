//! Submission draft and validator.
//!
//! # Responsibility
//! - Hold raw form input for a new grievance.
//! - Turn a draft plus the current session into a `ValidatedGrievance`.
//!
//! # Invariants
//! - Validation is pure and runs strictly before any persistence call.
//! - A missing session is reported before missing fields.
//! - `ValidatedGrievance` can only be built through `validate_submission`.

use super::grievance::{Category, Priority};
use super::identity::SessionUser;
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Raw submission form input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrievanceDraft {
    pub title: String,
    pub description: String,
    /// `None` while the "Select a category" placeholder is chosen.
    pub category: Option<Category>,
    /// `None` falls back to `Priority::Medium`.
    pub priority: Option<Priority>,
    pub state: String,
    pub location: String,
    pub anonymous: bool,
    /// File names picked on the form. Nothing uploads them.
    pub attachments: Vec<String>,
}

/// Form fields that must be present before a grievance can be stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredField {
    Title,
    Description,
    Category,
    State,
    Location,
}

impl RequiredField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::Category => "category",
            Self::State => "state",
            Self::Location => "location",
        }
    }
}

/// Missing required fields, in form order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub missing: Vec<RequiredField>,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let names = self
            .missing
            .iter()
            .map(|field| field.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "missing required fields: {names}")
    }
}

impl Error for ValidationError {}

/// Why a draft was not accepted for persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    /// No authenticated session was supplied.
    AuthRequired,
    Validation(ValidationError),
}

impl SubmissionError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::AuthRequired => "You must be logged in to submit a grievance.",
            Self::Validation(_) => "Please fill in all required fields.",
        }
    }
}

impl Display for SubmissionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthRequired => write!(f, "an authenticated session is required"),
            Self::Validation(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SubmissionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::AuthRequired => None,
            Self::Validation(err) => Some(err),
        }
    }
}

impl From<ValidationError> for SubmissionError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Checked submission ready for the persistence gateway.
///
/// Carries no id, status or timestamp: those are assigned on write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedGrievance {
    title: String,
    description: String,
    category: Category,
    priority: Priority,
    state: String,
    location: String,
    anonymous: bool,
    user_id: String,
    user_email: String,
}

impl ValidatedGrievance {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn anonymous(&self) -> bool {
        self.anonymous
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn user_email(&self) -> &str {
        &self.user_email
    }
}

/// Validates a draft against the current session.
///
/// # Errors
/// - `SubmissionError::AuthRequired` when `session` is `None`.
/// - `SubmissionError::Validation` naming every blank required field.
pub fn validate_submission(
    draft: &GrievanceDraft,
    session: Option<&SessionUser>,
) -> Result<ValidatedGrievance, SubmissionError> {
    let Some(user) = session else {
        return Err(SubmissionError::AuthRequired);
    };

    let mut missing = Vec::new();
    let title = required_text(&draft.title, RequiredField::Title, &mut missing);
    let description = required_text(&draft.description, RequiredField::Description, &mut missing);
    if draft.category.is_none() {
        missing.push(RequiredField::Category);
    }
    let state = required_text(&draft.state, RequiredField::State, &mut missing);
    let location = required_text(&draft.location, RequiredField::Location, &mut missing);

    let (Some(category), true) = (draft.category, missing.is_empty()) else {
        return Err(ValidationError { missing }.into());
    };

    if !draft.attachments.is_empty() {
        warn!(
            "event=attachments_dropped module=validator status=ok count={}",
            draft.attachments.len()
        );
    }

    Ok(ValidatedGrievance {
        title,
        description,
        category,
        priority: draft.priority.unwrap_or_default(),
        state,
        location,
        anonymous: draft.anonymous,
        user_id: user.id.clone(),
        user_email: user.email.clone(),
    })
}

fn required_text(value: &str, field: RequiredField, missing: &mut Vec<RequiredField>) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        missing.push(field);
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::{validate_submission, GrievanceDraft, RequiredField, SubmissionError};
    use crate::model::grievance::{Category, Priority};
    use crate::model::identity::SessionUser;

    fn pothole() -> GrievanceDraft {
        GrievanceDraft {
            title: "Pothole".to_string(),
            description: "Large pothole".to_string(),
            category: Some(Category::Infrastructure),
            state: "Telangana".to_string(),
            location: "Main St".to_string(),
            ..GrievanceDraft::default()
        }
    }

    #[test]
    fn fills_identity_and_defaults() {
        let user = SessionUser::citizen("u1", "u1@example.com");
        let validated = validate_submission(&pothole(), Some(&user)).expect("valid draft");
        assert_eq!(validated.user_id(), "u1");
        assert_eq!(validated.user_email(), "u1@example.com");
        assert_eq!(validated.priority(), Priority::Medium);
        assert!(!validated.anonymous());
    }

    #[test]
    fn missing_session_wins_over_missing_fields() {
        let err = validate_submission(&GrievanceDraft::default(), None).expect_err("no session");
        assert_eq!(err, SubmissionError::AuthRequired);
    }

    #[test]
    fn whitespace_only_fields_are_missing() {
        let user = SessionUser::citizen("u1", "u1@example.com");
        let mut draft = pothole();
        draft.title = "   ".to_string();
        draft.category = None;

        let err = validate_submission(&draft, Some(&user)).expect_err("validation must fail");
        match err {
            SubmissionError::Validation(inner) => assert_eq!(
                inner.missing,
                vec![RequiredField::Title, RequiredField::Category]
            ),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn text_fields_are_trimmed() {
        let user = SessionUser::citizen("u1", "u1@example.com");
        let mut draft = pothole();
        draft.location = "  Main St \n".to_string();
        let validated = validate_submission(&draft, Some(&user)).expect("valid draft");
        assert_eq!(validated.location(), "Main St");
    }
}
