//! Repository layer: persistence contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define the grievance persistence gateway.
//! - Keep SQL details out of service orchestration.
//!
//! # Invariants
//! - Grievance writes only accept validated submissions.
//! - Errors carry a `PersistenceCause` classification for callers.

pub mod grievance_repo;
pub mod user_repo;
