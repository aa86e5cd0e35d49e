//! Grievance record model.
//!
//! # Responsibility
//! - Define the canonical grievance record and its enumerated fields.
//! - Own the status lifecycle rules used by administrative transitions.
//!
//! # Invariants
//! - `id` is assigned by the persistence layer and never reused.
//! - New records always start as `GrievanceStatus::Pending`.
//! - `Resolved` and `Closed` are terminal.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Identifier assigned by the persistence layer on creation.
pub type GrievanceId = Uuid;

/// Label shown in place of the submitter identity for anonymous records.
pub const ANONYMOUS_SUBMITTER_LABEL: &str = "Anonymous";

/// Fixed grievance categories offered by the submission form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Infrastructure,
    Utilities,
    #[serde(rename = "Public Safety")]
    PublicSafety,
    Environment,
    Transportation,
    #[serde(rename = "Public Services")]
    PublicServices,
    Other,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Self::Infrastructure,
        Self::Utilities,
        Self::PublicSafety,
        Self::Environment,
        Self::Transportation,
        Self::PublicServices,
        Self::Other,
    ];

    /// Display and storage label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Infrastructure => "Infrastructure",
            Self::Utilities => "Utilities",
            Self::PublicSafety => "Public Safety",
            Self::Environment => "Environment",
            Self::Transportation => "Transportation",
            Self::PublicServices => "Public Services",
            Self::Other => "Other",
        }
    }
}

impl FromStr for Category {
    type Err = ParseFieldError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseFieldError::new("category", trimmed))
    }
}

/// Submitter-chosen urgency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Self::Low, Self::Medium, Self::High];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Capitalized label for list views.
    pub fn display_label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl FromStr for Priority {
    type Err = ParseFieldError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(ParseFieldError::new("priority", value.trim())),
        }
    }
}

/// Grievance lifecycle state.
///
/// Serialized with hyphenated labels (`in-progress`) to match the stored
/// collection. `rejected` is accepted as an alias of `closed` on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GrievanceStatus {
    /// Submitted, not yet picked up.
    Pending,
    /// Acknowledged and being worked on.
    InProgress,
    /// Fixed.
    Resolved,
    /// Rejected or closed without resolution.
    #[serde(alias = "rejected")]
    Closed,
}

impl GrievanceStatus {
    pub const ALL: [GrievanceStatus; 4] = [
        Self::Pending,
        Self::InProgress,
        Self::Resolved,
        Self::Closed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
        }
    }

    pub fn display_label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::Resolved => "Resolved",
            Self::Closed => "Closed",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved | Self::Closed)
    }

    /// Returns whether an administrator may move a grievance from `self`
    /// to `next`.
    pub fn can_transition_to(self, next: GrievanceStatus) -> bool {
        match (self, next) {
            (Self::Pending, Self::InProgress | Self::Resolved | Self::Closed) => true,
            (Self::InProgress, Self::Resolved | Self::Closed) => true,
            _ => false,
        }
    }
}

impl FromStr for GrievanceStatus {
    type Err = ParseFieldError;

    /// Accepts stored labels plus loose spellings (`In Progress`,
    /// `in_progress`, `inprogress`, `rejected`).
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match normalize_status_key(value).as_str() {
            "pending" => Ok(Self::Pending),
            "inprogress" => Ok(Self::InProgress),
            "resolved" => Ok(Self::Resolved),
            "closed" | "rejected" => Ok(Self::Closed),
            _ => Err(ParseFieldError::new("status", value.trim())),
        }
    }
}

/// Lowercases and strips hyphens, underscores and whitespace.
pub(crate) fn normalize_status_key(value: &str) -> String {
    value
        .chars()
        .filter(|ch| !matches!(ch, '-' | '_') && !ch.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Unknown enumerated value received from a form or a stored row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFieldError {
    pub field: &'static str,
    pub value: String,
}

impl ParseFieldError {
    fn new(field: &'static str, value: &str) -> Self {
        Self {
            field,
            value: value.to_string(),
        }
    }
}

impl Display for ParseFieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown {} `{}`", self.field, self.value)
    }
}

impl Error for ParseFieldError {}

/// Persisted grievance as returned by the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grievance {
    pub id: GrievanceId,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub priority: Priority,
    pub state: String,
    pub location: String,
    pub status: GrievanceStatus,
    pub anonymous: bool,
    /// Always stored, even for anonymous records; ownership listing needs it.
    pub user_id: String,
    pub user_email: String,
    /// Unix epoch milliseconds, server-assigned.
    pub created_at: i64,
    /// Unix epoch milliseconds of the latest status change.
    pub updated_at: i64,
}

impl Grievance {
    /// Identity string safe to show in list views.
    pub fn submitter_label(&self) -> &str {
        if self.anonymous {
            ANONYMOUS_SUBMITTER_LABEL
        } else {
            self.user_email.as_str()
        }
    }

    /// First 8 characters of the id, as shown in compact list rows.
    pub fn short_id(&self) -> String {
        self.id.to_string().chars().take(8).collect()
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_status_key, Category, GrievanceStatus, Priority};

    #[test]
    fn status_keys_ignore_case_and_separators() {
        assert_eq!(normalize_status_key("In-Progress"), "inprogress");
        assert_eq!(normalize_status_key(" in_progress "), "inprogress");
        assert_eq!(normalize_status_key("In Progress"), "inprogress");
    }

    #[test]
    fn rejected_parses_as_closed() {
        assert_eq!(
            "rejected".parse::<GrievanceStatus>().expect("known label"),
            GrievanceStatus::Closed
        );
    }

    #[test]
    fn category_parse_is_case_insensitive() {
        assert_eq!(
            "public safety".parse::<Category>().expect("known label"),
            Category::PublicSafety
        );
        assert!("Potholes".parse::<Category>().is_err());
    }

    #[test]
    fn priority_defaults_to_medium() {
        assert_eq!(Priority::default(), Priority::Medium);
    }
}
