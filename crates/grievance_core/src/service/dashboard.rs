//! View state for grievance list screens.
//!
//! # Responsibility
//! - Hold the last fetched list plus the search/status controls.
//! - Apply fetch results only while the view is mounted and the fetch is
//!   the newest one issued.
//!
//! # Invariants
//! - A result delivered after `unmount` or after a newer `begin_fetch` is
//!   discarded without touching state.
//! - `visible()` is recomputed from the full list on every call.

use super::grievance_service::GrievanceServiceError;
use crate::model::grievance::Grievance;
use crate::search::filter::{filter_grievances, GrievanceFilter, StatusCounts, StatusFilter};
use log::debug;

/// Handle for one outstanding fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "pass the ticket back to `apply_fetch`"]
pub struct FetchTicket {
    generation: u64,
}

/// What happened to a delivered fetch result.
#[derive(Debug)]
pub enum FetchOutcome {
    Applied { count: usize },
    /// The fetch failed; the previous list is kept.
    Failed(GrievanceServiceError),
    /// The view was torn down or a newer fetch superseded this one.
    Discarded,
}

/// Mounted list view (citizen history or admin dashboard).
#[derive(Debug)]
pub struct DashboardView {
    items: Vec<Grievance>,
    filter: GrievanceFilter,
    loading: bool,
    mounted: bool,
    generation: u64,
}

impl Default for DashboardView {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardView {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            filter: GrievanceFilter::default(),
            loading: false,
            mounted: true,
            generation: 0,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Starts a fetch; any older outstanding ticket becomes stale.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.generation += 1;
        self.loading = true;
        FetchTicket {
            generation: self.generation,
        }
    }

    /// Delivers the result of the fetch identified by `ticket`.
    pub fn apply_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<Grievance>, GrievanceServiceError>,
    ) -> FetchOutcome {
        if !self.mounted || ticket.generation != self.generation {
            debug!(
                "event=dashboard_fetch module=view status=discarded ticket={} current={} mounted={}",
                ticket.generation, self.generation, self.mounted
            );
            return FetchOutcome::Discarded;
        }

        self.loading = false;
        match result {
            Ok(items) => {
                let count = items.len();
                self.items = items;
                FetchOutcome::Applied { count }
            }
            Err(err) => FetchOutcome::Failed(err),
        }
    }

    /// Runs `fetch` and applies its result in one step.
    pub fn refresh(
        &mut self,
        fetch: impl FnOnce() -> Result<Vec<Grievance>, GrievanceServiceError>,
    ) -> FetchOutcome {
        let ticket = self.begin_fetch();
        let result = fetch();
        self.apply_fetch(ticket, result)
    }

    /// Tears the view down; later deliveries are discarded.
    pub fn unmount(&mut self) {
        self.mounted = false;
        self.loading = false;
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.filter.search = search.into();
    }

    pub fn set_status_filter(&mut self, status: StatusFilter) {
        self.filter.status = status;
    }

    pub fn filter(&self) -> &GrievanceFilter {
        &self.filter
    }

    /// Full fetched list, newest first.
    pub fn items(&self) -> &[Grievance] {
        &self.items
    }

    /// Rows matching the current search and status controls.
    pub fn visible(&self) -> Vec<&Grievance> {
        filter_grievances(&self.items, &self.filter)
    }

    /// Counters over the full fetched list, ignoring the controls.
    pub fn stats(&self) -> StatusCounts {
        StatusCounts::tally(&self.items)
    }

    /// Placeholder text for an empty table, or `None` when rows are shown.
    pub fn empty_message(&self) -> Option<&'static str> {
        if self.loading {
            return None;
        }
        if self.items.is_empty() {
            return Some("No grievances submitted yet.");
        }
        if self.visible().is_empty() {
            return Some("No grievances found matching your criteria.");
        }
        None
    }
}
