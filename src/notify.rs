//! User-visible notifications
//!
//! Recoverable failures do not propagate to the screens; they are turned
//! into a [`Notice`] and handed to whatever [`Notifier`] the session was
//! built with. A UI shows them as dialogs, the binary just logs them.

use std::cell::RefCell;
use std::collections::VecDeque;

use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, title, message)
    }

    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, title, message)
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, title, message)
    }

    fn new(level: NoticeLevel, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            message: message.into(),
        }
    }
}

pub trait Notifier {
    fn notify(&self, notice: Notice);
}

/// Writes notices to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Info => info!("[{}] {}", notice.title, notice.message),
            NoticeLevel::Warning => warn!("[{}] {}", notice.title, notice.message),
            NoticeLevel::Error => error!("[{}] {}", notice.title, notice.message),
        }
    }
}

/// Buffers notices until the UI drains them.
#[derive(Debug, Default)]
pub struct QueuedNotifier {
    pending: RefCell<VecDeque<Notice>>,
}

impl QueuedNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes every pending notice, oldest first.
    pub fn drain(&self) -> Vec<Notice> {
        self.pending.borrow_mut().drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.borrow().is_empty()
    }
}

impl Notifier for QueuedNotifier {
    fn notify(&self, notice: Notice) {
        self.pending.borrow_mut().push_back(notice);
    }
}
