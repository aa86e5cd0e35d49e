//! Administrative list filter and status counters.
//!
//! # Invariants
//! - Filtering is pure, synchronous and idempotent.
//! - Relative order of matches is preserved.
//! - Text matching is case-insensitive over title, submitter label and id.

use crate::model::grievance::{normalize_status_key, Grievance, GrievanceStatus};
use std::str::FromStr;

/// Status dropdown selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(GrievanceStatus),
}

impl StatusFilter {
    pub fn matches(self, status: GrievanceStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = crate::model::grievance::ParseFieldError;

    /// Parses dropdown values; `all` and the empty string select everything,
    /// status labels are compared with hyphens removed (`inprogress`).
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let key = normalize_status_key(value);
        if key.is_empty() || key == "all" {
            return Ok(Self::All);
        }
        value.parse().map(Self::Only)
    }
}

/// Search box text plus status dropdown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrievanceFilter {
    pub search: String,
    pub status: StatusFilter,
}

impl GrievanceFilter {
    pub fn new(search: impl Into<String>, status: StatusFilter) -> Self {
        Self {
            search: search.into(),
            status,
        }
    }

    /// Returns whether one grievance passes both the text and status checks.
    pub fn matches(&self, grievance: &Grievance) -> bool {
        self.status.matches(grievance.status)
            && matches_search(grievance, &self.search.to_lowercase())
    }
}

/// Returns the grievances matching `filter`, in their input order.
pub fn filter_grievances<'a>(
    items: &'a [Grievance],
    filter: &GrievanceFilter,
) -> Vec<&'a Grievance> {
    let needle = filter.search.trim().to_lowercase();
    items
        .iter()
        .filter(|grievance| filter.status.matches(grievance.status))
        .filter(|grievance| matches_search(grievance, &needle))
        .collect()
}

fn matches_search(grievance: &Grievance, needle: &str) -> bool {
    let needle = needle.trim();
    if needle.is_empty() {
        return true;
    }
    grievance.title.to_lowercase().contains(needle)
        || grievance.submitter_label().to_lowercase().contains(needle)
        || grievance.id.to_string().contains(needle)
}

/// Dashboard counters over a fetched list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub resolved: usize,
    pub closed: usize,
}

impl StatusCounts {
    pub fn tally<'a>(items: impl IntoIterator<Item = &'a Grievance>) -> Self {
        items.into_iter().fold(Self::default(), |mut counts, grievance| {
            counts.total += 1;
            match grievance.status {
                GrievanceStatus::Pending => counts.pending += 1,
                GrievanceStatus::InProgress => counts.in_progress += 1,
                GrievanceStatus::Resolved => counts.resolved += 1,
                GrievanceStatus::Closed => counts.closed += 1,
            }
            counts
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{filter_grievances, GrievanceFilter, StatusCounts, StatusFilter};
    use crate::model::grievance::{Category, Grievance, GrievanceStatus, Priority};
    use uuid::Uuid;

    fn grievance(title: &str, email: &str, status: GrievanceStatus) -> Grievance {
        Grievance {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: "details".to_string(),
            category: Category::Utilities,
            priority: Priority::Medium,
            state: "Kerala".to_string(),
            location: "Ward 4".to_string(),
            status,
            anonymous: false,
            user_id: email.to_string(),
            user_email: email.to_string(),
            created_at: 1,
            updated_at: 1,
        }
    }

    #[test]
    fn dropdown_values_parse() {
        assert_eq!("all".parse::<StatusFilter>().expect("known label"), StatusFilter::All);
        assert_eq!(
            "inprogress".parse::<StatusFilter>().expect("known label"),
            StatusFilter::Only(GrievanceStatus::InProgress)
        );
        assert!("archived".parse::<StatusFilter>().is_err());
    }

    #[test]
    fn inprogress_filter_selects_only_in_progress() {
        let items = vec![
            grievance("a", "a@x.org", GrievanceStatus::Pending),
            grievance("b", "b@x.org", GrievanceStatus::InProgress),
            grievance("c", "c@x.org", GrievanceStatus::Resolved),
        ];
        let filter = GrievanceFilter::new("", "inprogress".parse().expect("known label"));
        let visible = filter_grievances(&items, &filter);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].title, "b");
    }

    #[test]
    fn counts_every_status() {
        let items = vec![
            grievance("a", "a@x.org", GrievanceStatus::Pending),
            grievance("b", "b@x.org", GrievanceStatus::Pending),
            grievance("c", "c@x.org", GrievanceStatus::Closed),
        ];
        let counts = StatusCounts::tally(&items);
        assert_eq!(counts.total, 3);
        assert_eq!(counts.pending, 2);
        assert_eq!(counts.closed, 1);
        assert_eq!(counts.in_progress, 0);
    }
}
