use chrono::{DateTime, Utc};
use std::collections::VecDeque;

/// Maximum number of notifications kept
pub const MAX_NOTIFICATIONS: usize = 100;

/// Notification levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Warning,
    Error,
}

/// Notification message with timestamp
#[derive(Debug, Clone)]
pub struct Notification {
    pub timestamp: DateTime<Utc>,
    pub level: Level,
    pub message: String,
}

/// Toast queue shown to the user in place of blocking dialogs
#[derive(Debug, Default)]
pub struct NotificationQueue {
    entries: VecDeque<Notification>,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, level: Level, message: impl Into<String>) {
        self.entries.push_back(Notification {
            timestamp: Utc::now(),
            level,
            message: message.into(),
        });

        // Keep only the most recent notifications
        while self.entries.len() > MAX_NOTIFICATIONS {
            self.entries.pop_front();
        }
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(Level::Info, message);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(Level::Success, message);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(Level::Warning, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Level::Error, message);
    }

    /// Newest notification, the one rendered as a toast
    pub fn latest(&self) -> Option<&Notification> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
