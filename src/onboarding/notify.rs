//! Collaborator capabilities injected into the onboarding flow: a notifier
//! for transient user-facing notices and a navigator for route changes.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// A transient message surfaced to the user (a toast, in the web UI).
#[derive(Debug, Clone, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub at: DateTime<Utc>,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            at: Utc::now(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, message)
    }
}

/// Fire-and-forget notice sink. No acknowledgment is expected.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Route-change capability.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &str);
}

/// Buffers notices until the host drains them (e.g. into an HTTP response).
#[derive(Debug, Default, Clone)]
pub struct NoticeLog {
    notices: Arc<Mutex<Vec<Notice>>>,
}

impl NoticeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take all buffered notices, oldest first.
    pub fn drain(&self) -> Vec<Notice> {
        match self.notices.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }

    pub fn len(&self) -> usize {
        self.notices.lock().map(|g| g.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Notifier for NoticeLog {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Error => tracing::warn!(notice = %notice.message, "Error notice raised"),
            NoticeLevel::Info | NoticeLevel::Success => {
                tracing::debug!(notice = %notice.message, "Notice raised")
            }
        }
        match self.notices.lock() {
            Ok(mut guard) => guard.push(notice),
            Err(poisoned) => poisoned.into_inner().push(notice),
        }
    }
}

/// Remembers the most recent route requested.
#[derive(Debug, Default, Clone)]
pub struct RouteLog {
    last: Arc<Mutex<Option<String>>>,
}

impl RouteLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<String> {
        self.last.lock().ok().and_then(|g| (*g).clone())
    }
}

impl Navigator for RouteLog {
    fn navigate(&self, route: &str) {
        tracing::debug!(route, "Navigation recorded");
        if let Ok(mut guard) = self.last.lock() {
            *guard = Some(route.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notice_log_drains_in_order() {
        let log = NoticeLog::new();
        log.notify(Notice::error("first"));
        log.notify(Notice::success("second"));
        assert_eq!(log.len(), 2);

        let drained = log.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].message, "first");
        assert_eq!(drained[0].level, NoticeLevel::Error);
        assert_eq!(drained[1].level, NoticeLevel::Success);
        assert!(log.is_empty());
    }

    #[test]
    fn notice_log_clones_share_buffer() {
        let log = NoticeLog::new();
        let sink: Arc<dyn Notifier> = Arc::new(log.clone());
        sink.notify(Notice::error("shared"));
        assert_eq!(log.drain()[0].message, "shared");
    }

    #[test]
    fn route_log_keeps_last_route() {
        let routes = RouteLog::new();
        assert_eq!(routes.last(), None);
        routes.navigate("/onboarding");
        routes.navigate("/dashboard");
        assert_eq!(routes.last().as_deref(), Some("/dashboard"));
    }
}
