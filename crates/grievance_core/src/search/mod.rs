//! In-memory search over already-fetched grievance lists.
//!
//! # Responsibility
//! - Filter administrative lists by free text and status.
//! - Tally status counters for dashboard summaries.

pub mod filter;
