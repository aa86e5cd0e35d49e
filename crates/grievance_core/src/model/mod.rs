//! Domain model for grievance submission and tracking.
//!
//! # Responsibility
//! - Define the persisted grievance record and its enumerated fields.
//! - Define the submission draft and the validator that gates persistence.
//! - Define the session identity handed to validators and services.

pub mod draft;
pub mod grievance;
pub mod identity;
pub mod jurisdiction;
