//! Transient user notifications ("toasts").
//!
//! A board shows at most one notice; a newer notice replaces the current
//! one and every notice dismisses itself `NOTICE_TTL` after it was shown.

use std::time::{Duration, Instant};

pub const NOTICE_TTL: Duration = Duration::from_secs(5);

pub const SUBMIT_SUCCESS_MESSAGE: &str =
    "Grievance submitted successfully! You will receive updates via email.";
pub const LOGIN_SUCCESS_MESSAGE: &str = "Welcome back!";
pub const SIGNUP_SUCCESS_MESSAGE: &str = "Welcome to the Smart City Grievance System!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    shown_at: Instant,
}

impl Notice {
    pub fn success(message: impl Into<String>, now: Instant) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
            shown_at: now,
        }
    }

    pub fn error(message: impl Into<String>, now: Instant) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
            shown_at: now,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) >= NOTICE_TTL
    }
}

#[derive(Debug, Default)]
pub struct NoticeBoard {
    current: Option<Notice>,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, notice: Notice) {
        self.current = Some(notice);
    }

    /// Returns the live notice, dropping it first if it has expired.
    pub fn current(&mut self, now: Instant) -> Option<&Notice> {
        if self
            .current
            .as_ref()
            .is_some_and(|notice| notice.is_expired(now))
        {
            self.current = None;
        }
        self.current.as_ref()
    }

    pub fn dismiss(&mut self) {
        self.current = None;
    }
}
