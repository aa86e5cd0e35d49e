//! Authenticated identity passed explicitly to validators and services.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::grievance::ParseFieldError;

/// Access level of an authenticated user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Citizen,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Citizen => "citizen",
            Self::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = ParseFieldError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "citizen" => Ok(Self::Citizen),
            "admin" => Ok(Self::Admin),
            other => Err(ParseFieldError {
                field: "role",
                value: other.to_string(),
            }),
        }
    }
}

/// Identity of the signed-in user.
///
/// `id` is opaque: it comes from the identity provider and is only ever
/// compared for equality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub role: Role,
}

impl SessionUser {
    /// Creates a citizen identity without a display name.
    pub fn citizen(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            display_name: None,
            role: Role::Citizen,
        }
    }

    /// Creates an administrator identity without a display name.
    pub fn admin(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            role: Role::Admin,
            ..Self::citizen(id, email)
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
