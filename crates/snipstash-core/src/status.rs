//! Status banner messages.

use std::time::Duration;

/// Banner style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Error,
    Info,
}

impl StatusKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusKind::Success => "success",
            StatusKind::Error => "error",
            StatusKind::Info => "info",
        }
    }
}

/// A (type, title, message) triple for the status banner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub kind: StatusKind,
    pub title: String,
    pub message: String,
    /// Hide the banner after this long. `None` keeps it up.
    pub auto_hide: Option<Duration>,
}

impl Status {
    pub fn new(kind: StatusKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            message: message.into(),
            auto_hide: None,
        }
    }

    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(StatusKind::Success, title, message)
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(StatusKind::Error, title, message)
    }

    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(StatusKind::Info, title, message)
    }

    /// Set the auto-hide delay; a zero duration disables it.
    pub fn hide_after(mut self, delay: Duration) -> Self {
        self.auto_hide = (!delay.is_zero()).then_some(delay);
        self
    }
}
