//! Transient user-facing notifications.
//!
//! Entries are kept in insertion order and expire independently. There is
//! no deduplication and no priority.

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Weak,
    },
    time::Duration,
};

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::warn;

/// Default time a notification stays visible.
pub const DEFAULT_DURATION: Duration = Duration::from_millis(5000);

const FORBIDDEN_MESSAGE: &str = "You do not have permission to perform this action";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Success,
    Error,
    Warning,
    Info,
}

/// Controls automatic dismissal of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoDismiss {
    /// Stays until closed manually.
    Never,
    After(Duration),
}

impl From<Duration> for AutoDismiss {
    /// A zero duration disables auto-dismiss.
    #[inline]
    fn from(duration: Duration) -> Self {
        if duration.is_zero() {
            AutoDismiss::Never
        } else {
            AutoDismiss::After(duration)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub kind: Kind,
    pub title: String,
    pub message: String,
    pub auto_dismiss: AutoDismiss,
}

#[derive(Debug)]
struct Entry {
    notification: Notification,
    /// Pending auto-dismiss, aborted on manual close.
    timer: Option<JoinHandle<()>>,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: AtomicU64,
    entries: Mutex<Vec<Entry>>,
}

impl Inner {
    fn remove(&self, id: u64) -> Option<Entry> {
        let mut entries = self.entries.lock();
        let index = entries.iter().position(|e| e.notification.id == id)?;
        Some(entries.remove(index))
    }
}

/// The notification queue. Clones share the same queue.
#[derive(Debug, Clone, Default)]
pub struct Notifier {
    inner: Arc<Inner>,
}

impl Notifier {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a notification and schedules its removal after `duration`.
    ///
    /// Auto-dismiss needs a tokio runtime; outside of one the entry stays
    /// until closed.
    pub fn post(
        &self,
        kind: Kind,
        title: impl Into<String>,
        message: impl Into<String>,
        duration: Duration,
    ) -> u64 {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let auto_dismiss = AutoDismiss::from(duration);
        let notification = Notification {
            id,
            kind,
            title: title.into(),
            message: message.into(),
            auto_dismiss,
        };

        let mut entries = self.inner.entries.lock();
        let timer = match auto_dismiss {
            AutoDismiss::Never => None,
            AutoDismiss::After(duration) => match tokio::runtime::Handle::try_current() {
                Ok(handle) => Some(handle.spawn(dismiss_after(
                    Arc::downgrade(&self.inner),
                    id,
                    duration,
                ))),
                Err(_) => {
                    warn!("no runtime to auto-dismiss notification \"{}\"", notification.title);
                    None
                }
            },
        };

        entries.push(Entry {
            notification,
            timer,
        });
        id
    }

    #[inline]
    pub fn success(&self, title: impl Into<String>, message: impl Into<String>) -> u64 {
        self.post(Kind::Success, title, message, DEFAULT_DURATION)
    }

    #[inline]
    pub fn error(&self, title: impl Into<String>, message: impl Into<String>) -> u64 {
        self.post(Kind::Error, title, message, DEFAULT_DURATION)
    }

    #[inline]
    pub fn warning(&self, title: impl Into<String>, message: impl Into<String>) -> u64 {
        self.post(Kind::Warning, title, message, DEFAULT_DURATION)
    }

    #[inline]
    pub fn info(&self, title: impl Into<String>, message: impl Into<String>) -> u64 {
        self.post(Kind::Info, title, message, DEFAULT_DURATION)
    }

    /// Posts an error carrying the server's message, or `fallback` if the
    /// server sent none.
    ///
    /// Authorization failures, local or a `403`, are always titled
    /// "Permission denied".
    pub fn report(&self, title: impl Into<String>, err: &crate::Error, fallback: &str) -> u64 {
        if err.is_forbidden() {
            return self.error(
                "Permission denied",
                err.server_message().unwrap_or(FORBIDDEN_MESSAGE),
            );
        }
        self.error(title, err.server_message().unwrap_or(fallback))
    }

    /// Removes a notification immediately, cancelling its auto-dismiss.
    /// Returns whether it was still present.
    pub fn close(&self, id: u64) -> bool {
        match self.inner.remove(id) {
            Some(entry) => {
                if let Some(timer) = entry.timer {
                    timer.abort();
                }
                true
            }
            None => false,
        }
    }

    /// Currently visible notifications, oldest first.
    pub fn active(&self) -> Vec<Notification> {
        self.inner
            .entries
            .lock()
            .iter()
            .map(|e| e.notification.clone())
            .collect()
    }
}

async fn dismiss_after(inner: Weak<Inner>, id: u64, duration: Duration) {
    tokio::time::sleep(duration).await;
    if let Some(inner) = inner.upgrade() {
        inner.remove(id);
    }
}
