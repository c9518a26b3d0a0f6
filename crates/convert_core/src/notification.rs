use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Delay after which success and info notifications disappear on their own.
pub const AUTO_EXPIRE_DELAY: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NotificationId(u64);

impl NotificationId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
    Warning,
    Info,
}

impl Severity {
    /// Low-severity entries are removed automatically; the rest wait for dismissal.
    pub fn auto_expires(self) -> bool {
        matches!(self, Severity::Success | Severity::Info)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a producer asks to show; identity and timestamp are assigned on insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    pub severity: Severity,
    pub title: String,
    pub message: String,
}

impl NotificationRequest {
    pub fn new(severity: Severity, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Success, title, message)
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, title, message)
    }

    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, title, message)
    }

    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, title, message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub severity: Severity,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Ordered set of live notifications, oldest first.
#[derive(Debug, Clone, Default)]
pub struct NotificationQueue {
    entries: Vec<Notification>,
    last_id: u64,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a notification and returns a copy of the stored entry.
    pub fn add(&mut self, request: NotificationRequest, created_at: DateTime<Utc>) -> Notification {
        self.last_id += 1;
        let notification = Notification {
            id: NotificationId(self.last_id),
            severity: request.severity,
            title: request.title,
            message: request.message,
            created_at,
        };
        self.entries.push(notification.clone());
        notification
    }

    /// Removes the entry with `id`; absent ids are ignored.
    pub fn remove(&mut self, id: NotificationId) -> Option<Notification> {
        let index = self.entries.iter().position(|entry| entry.id == id)?;
        Some(self.entries.remove(index))
    }

    /// Empties the queue and returns the ids that were live.
    pub fn clear(&mut self) -> Vec<NotificationId> {
        self.entries.drain(..).map(|entry| entry.id).collect()
    }

    pub fn contains(&self, id: NotificationId) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    pub fn entries(&self) -> &[Notification] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn add_appends_in_insertion_order_with_fresh_ids() {
        let mut queue = NotificationQueue::new();
        let first = queue.add(NotificationRequest::info("a", "one"), at(1));
        let second = queue.add(NotificationRequest::error("b", "two"), at(1));

        assert_ne!(first.id, second.id);
        assert!(first.id < second.id);
        let titles: Vec<_> = queue.entries().iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b"]);
        assert_eq!(second.created_at, at(1));
    }

    #[test]
    fn remove_is_idempotent() {
        let mut queue = NotificationQueue::new();
        let entry = queue.add(NotificationRequest::warning("w", "careful"), at(0));

        assert!(queue.remove(entry.id).is_some());
        assert!(queue.remove(entry.id).is_none());
        assert!(queue.is_empty());
    }

    #[test]
    fn ids_are_not_reused_after_clear() {
        let mut queue = NotificationQueue::new();
        let before = queue.add(NotificationRequest::success("s", "done"), at(0));
        let cleared = queue.clear();
        assert_eq!(cleared, vec![before.id]);

        let after = queue.add(NotificationRequest::success("s", "done"), at(0));
        assert_ne!(before.id, after.id);
        assert!(!queue.contains(before.id));
    }

    #[test]
    fn only_low_severities_auto_expire() {
        assert!(Severity::Success.auto_expires());
        assert!(Severity::Info.auto_expires());
        assert!(!Severity::Error.auto_expires());
        assert!(!Severity::Warning.auto_expires());
    }
}
