use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use client_logging::{client_error, client_info};
use convert_core::{HealthDetailedResponse, HealthResponse, VersionResponse};

use crate::{ApiClient, TransportError};

/// Last known service version and health.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceSnapshot {
    pub version: Option<VersionResponse>,
    pub health: Option<HealthDetailedResponse>,
    pub is_healthy: bool,
}

impl Default for ServiceSnapshot {
    fn default() -> Self {
        Self {
            version: None,
            health: None,
            is_healthy: true,
        }
    }
}

#[derive(Clone)]
pub struct StatusTracker {
    api: ApiClient,
    snapshot: Arc<Mutex<ServiceSnapshot>>,
}

impl StatusTracker {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            snapshot: Arc::new(Mutex::new(ServiceSnapshot::default())),
        }
    }

    /// Fetches version and detailed health together. Failures only mark the service unhealthy.
    pub async fn load_app_info(&self) {
        let (version, health) = tokio::join!(self.api.version(), self.api.health_detailed());
        match (version, health) {
            (Ok(version), Ok(health)) => {
                client_info!(
                    "connected to {} {} (status {})",
                    version.name,
                    version.version,
                    health.health.status
                );
                let mut snapshot = self.lock();
                snapshot.is_healthy = health.health.is_ok();
                snapshot.version = Some(version);
                snapshot.health = Some(health);
            }
            (Err(err), _) | (_, Err(err)) => {
                client_error!("failed to load app info: {}", err);
                self.lock().is_healthy = false;
            }
        }
    }

    /// Refreshes detailed health; the failure is recorded and returned.
    pub async fn check_health(&self) -> Result<HealthDetailedResponse, TransportError> {
        match self.api.health_detailed().await {
            Ok(health) => {
                let mut snapshot = self.lock();
                snapshot.is_healthy = health.health.is_ok();
                snapshot.health = Some(health.clone());
                Ok(health)
            }
            Err(err) => {
                self.lock().is_healthy = false;
                Err(err)
            }
        }
    }

    /// Basic liveness probe; does not change the snapshot.
    pub async fn ping(&self) -> Result<HealthResponse, TransportError> {
        self.api.health().await
    }

    pub async fn version(&self) -> Result<VersionResponse, TransportError> {
        self.api.version().await
    }

    pub fn snapshot(&self) -> ServiceSnapshot {
        self.lock().clone()
    }

    pub fn is_healthy(&self) -> bool {
        self.lock().is_healthy
    }

    fn lock(&self) -> MutexGuard<'_, ServiceSnapshot> {
        self.snapshot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
