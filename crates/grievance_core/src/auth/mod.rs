//! Identity boundary and session state.
//!
//! # Responsibility
//! - Define the `AuthProvider` contract for login/signup/logout.
//! - Provide a local credential-store implementation.
//! - Own the session state machine consumed by guarded views.
//!
//! # Invariants
//! - Session identity is passed explicitly; nothing here is global.
//! - Signup pre-checks run before any provider call.

pub mod local;
pub mod password;
pub mod provider;
pub mod session;
