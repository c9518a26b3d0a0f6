use std::sync::Arc;
use std::time::Duration;

use client_logging::client_info;

use crate::notify::NotificationCenter;
use crate::orchestrator::Orchestrator;
use crate::status::StatusTracker;
use crate::transport::{ReqwestTransport, Transport, TransportSettings};
use crate::{ApiClient, TransportError};

/// Everything one application session needs, created once and passed to consumers.
///
/// Orchestrator settlements are routed into the session's notification center.
pub struct ClientSession {
    orchestrator: Orchestrator,
    notifications: NotificationCenter,
    status: StatusTracker,
}

impl ClientSession {
    pub fn connect(
        settings: TransportSettings,
        notification_ttl: Duration,
    ) -> Result<Self, TransportError> {
        client_info!("session against {}", settings.base_url);
        let transport = ReqwestTransport::new(settings)?;
        Ok(Self::with_transport(Arc::new(transport), notification_ttl))
    }

    pub fn with_transport(transport: Arc<dyn Transport>, notification_ttl: Duration) -> Self {
        let api = ApiClient::new(transport);
        let notifications = NotificationCenter::with_ttl(notification_ttl);
        let orchestrator = Orchestrator::with_sink(api.clone(), Arc::new(notifications.clone()));
        let status = StatusTracker::new(api);
        Self {
            orchestrator,
            notifications,
            status,
        }
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    pub fn status(&self) -> &StatusTracker {
        &self.status
    }

    /// Ends the session: drops results and cancels pending notification timers.
    pub fn shutdown(self) {
        self.orchestrator.clear();
        self.notifications.clear();
        client_info!("session closed");
    }
}
