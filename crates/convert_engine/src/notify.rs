use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use client_logging::{client_debug, client_warn};
use convert_core::{
    Effect, Notification, NotificationId, NotificationQueue, NotificationRequest, Severity,
    AUTO_EXPIRE_DELAY,
};
use tokio_util::sync::CancellationToken;

use crate::orchestrator::EffectSink;

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Live notification list with one cancellable expiry timer per low-severity entry.
///
/// Timers are spawned on the ambient tokio runtime; adding a notification
/// outside a runtime keeps it until it is dismissed.
#[derive(Clone)]
pub struct NotificationCenter {
    inner: Arc<Mutex<CenterState>>,
    ttl: Duration,
    clock: Clock,
}

#[derive(Default)]
struct CenterState {
    queue: NotificationQueue,
    timers: HashMap<NotificationId, CancellationToken>,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::with_ttl(AUTO_EXPIRE_DELAY)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(CenterState::default())),
            ttl,
            clock: Arc::new(Utc::now),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn add(
        &self,
        severity: Severity,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> NotificationId {
        self.push(NotificationRequest::new(severity, title, message))
    }

    pub fn push(&self, request: NotificationRequest) -> NotificationId {
        let auto_expires = request.severity.auto_expires();
        let created_at = (self.clock)();
        let mut state = lock(&self.inner);
        let notification = state.queue.add(request, created_at);
        client_debug!(
            "notification {} [{}] {}",
            notification.id,
            notification.severity,
            notification.title
        );

        if auto_expires {
            if let Some(token) = self.schedule_expiry(notification.id) {
                state.timers.insert(notification.id, token);
            }
        }
        notification.id
    }

    /// Dismisses one entry and cancels its timer. Unknown ids are ignored.
    pub fn remove(&self, id: NotificationId) -> bool {
        let mut state = lock(&self.inner);
        if let Some(token) = state.timers.remove(&id) {
            token.cancel();
        }
        state.queue.remove(id).is_some()
    }

    pub fn clear(&self) {
        let mut state = lock(&self.inner);
        for (_, token) in state.timers.drain() {
            token.cancel();
        }
        let removed = state.queue.clear();
        client_debug!("cleared {} notifications", removed.len());
    }

    pub fn notifications(&self) -> Vec<Notification> {
        lock(&self.inner).queue.entries().to_vec()
    }

    pub fn contains(&self, id: NotificationId) -> bool {
        lock(&self.inner).queue.contains(id)
    }

    pub fn len(&self) -> usize {
        lock(&self.inner).queue.len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.inner).queue.is_empty()
    }

    /// Number of expiry timers that have not fired or been cancelled.
    pub fn pending_timers(&self) -> usize {
        lock(&self.inner).timers.len()
    }

    fn schedule_expiry(&self, id: NotificationId) -> Option<CancellationToken> {
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                client_warn!("no runtime for expiry of notification {}", id);
                return None;
            }
        };

        let token = CancellationToken::new();
        let cancelled = token.clone();
        let center: Weak<Mutex<CenterState>> = Arc::downgrade(&self.inner);
        let ttl = self.ttl;
        handle.spawn(async move {
            tokio::select! {
                _ = cancelled.cancelled() => {}
                _ = tokio::time::sleep(ttl) => {
                    if let Some(center) = center.upgrade() {
                        expire(&center, id);
                    }
                }
            }
        });
        Some(token)
    }
}

impl EffectSink for NotificationCenter {
    fn dispatch(&self, effect: Effect) {
        match effect {
            Effect::Notify(request) => {
                self.push(request);
            }
        }
    }
}

fn expire(center: &Mutex<CenterState>, id: NotificationId) {
    let mut state = lock(center);
    state.timers.remove(&id);
    if state.queue.remove(id).is_some() {
        client_debug!("notification {} expired", id);
    }
}

fn lock(center: &Mutex<CenterState>) -> MutexGuard<'_, CenterState> {
    center.lock().unwrap_or_else(PoisonError::into_inner)
}
