//! User-facing notices.
//!
//! Controllers and the session manager report outcomes through a `Notifier`
//! instead of printing, so the CLI can render them and tests can inspect them.

use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeVariant {
    Default,
    Destructive,
}

/// A transient message for the user, e.g. "Evento aprovado com sucesso".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub variant: NoticeVariant,
}

impl Notice {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: NoticeVariant::Default,
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: NoticeVariant::Destructive,
        }
    }

    pub fn is_error(&self) -> bool {
        self.variant == NoticeVariant::Destructive
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Prints notices to the terminal: successes on stdout, errors on stderr.
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        if notice.is_error() {
            eprintln!("✗ {}: {}", notice.title, notice.description);
        } else {
            println!("✓ {}: {}", notice.title, notice.description);
        }
    }
}

/// Keeps every notice in memory.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .map(|notices| notices.clone())
            .unwrap_or_default()
    }

    pub fn last(&self) -> Option<Notice> {
        self.notices().pop()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, notice: Notice) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(notice);
        }
    }
}
