use crate::app::AppContext;
use crate::traits::cache::CacheStore;
use async_trait::async_trait;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Health check status
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Health check result for a single component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Overall health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub checks: Vec<ComponentHealth>,
}

impl IntoResponse for HealthResponse {
    fn into_response(self) -> Response {
        let status_code = match self.status {
            HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
            HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        };

        (status_code, Json(self)).into_response()
    }
}

#[async_trait]
pub trait HealthCheck: Send + Sync {
    fn name(&self) -> &str;
    async fn check(&self) -> ComponentHealth;
}

/// Always healthy while the process is serving
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicHealthCheck;

#[async_trait]
impl HealthCheck for BasicHealthCheck {
    fn name(&self) -> &str {
        "application"
    }

    async fn check(&self) -> ComponentHealth {
        ComponentHealth {
            name: self.name().to_string(),
            status: HealthStatus::Healthy,
            message: Some("Application is running".to_string()),
        }
    }
}

/// Pings the cache backend
///
/// An unreachable cache does not break reads (they fall through to the
/// repository) but it is still reported unhealthy so operators notice.
pub struct CacheHealthCheck<T: Send + Sync + 'static> {
    store: Arc<dyn CacheStore<T>>,
}

impl<T: Send + Sync + 'static> CacheHealthCheck<T> {
    pub fn new(store: Arc<dyn CacheStore<T>>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<T: Send + Sync + 'static> HealthCheck for CacheHealthCheck<T> {
    fn name(&self) -> &str {
        "cache"
    }

    async fn check(&self) -> ComponentHealth {
        let backend = self.store.backend();
        match self.store.ping().await {
            Ok(()) => ComponentHealth {
                name: self.name().to_string(),
                status: HealthStatus::Healthy,
                message: Some(format!("{} backend reachable", backend)),
            },
            Err(error) => {
                tracing::warn!(backend, error = %error, "Cache health check failed");
                ComponentHealth {
                    name: self.name().to_string(),
                    status: HealthStatus::Unhealthy,
                    message: Some(format!("{} backend unreachable", backend)),
                }
            }
        }
    }
}

/// Runs every registered check and folds them into one status
pub struct HealthChecker {
    checks: Vec<Arc<dyn HealthCheck>>,
}

impl HealthChecker {
    pub fn new() -> Self {
        Self {
            checks: vec![Arc::new(BasicHealthCheck)],
        }
    }

    pub fn with_check(mut self, check: Arc<dyn HealthCheck>) -> Self {
        self.checks.push(check);
        self
    }

    pub async fn check_health(&self) -> HealthResponse {
        let mut checks = Vec::new();
        let mut overall_status = HealthStatus::Healthy;

        for check in &self.checks {
            let result = check.check().await;

            match result.status {
                HealthStatus::Unhealthy => overall_status = HealthStatus::Unhealthy,
                HealthStatus::Degraded if overall_status == HealthStatus::Healthy => {
                    overall_status = HealthStatus::Degraded
                }
                _ => {}
            }

            checks.push(result);
        }

        HealthResponse {
            status: overall_status,
            checks,
        }
    }
}

impl Default for HealthChecker {
    fn default() -> Self {
        Self::new()
    }
}

/// Handler for `GET /health`
pub async fn health_handler(State(ctx): State<AppContext>) -> HealthResponse {
    ctx.health.check_health().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheError, CacheResult, InMemoryCache};

    struct Unreachable;

    #[async_trait]
    impl CacheStore<String> for Unreachable {
        async fn get(&self, _key: &str) -> CacheResult<Option<String>> {
            Ok(None)
        }
        async fn set(&self, _key: &str, _value: &String) -> CacheResult<()> {
            Ok(())
        }
        async fn invalidate(&self, _key: &str) -> CacheResult<()> {
            Ok(())
        }
        async fn get_all(&self, _namespace: &str) -> CacheResult<Option<Vec<String>>> {
            Ok(None)
        }
        async fn set_all(&self, _namespace: &str, _values: &[String]) -> CacheResult<()> {
            Ok(())
        }
        async fn invalidate_all(&self, _namespace: &str) -> CacheResult<()> {
            Ok(())
        }
        async fn ping(&self) -> CacheResult<()> {
            Err(CacheError::transport("PING", "connection refused"))
        }
        fn backend(&self) -> &'static str {
            "unreachable"
        }
    }

    #[tokio::test]
    async fn test_default_checker_is_healthy() {
        let response = HealthChecker::new().check_health().await;
        assert_eq!(response.status, HealthStatus::Healthy);
        assert_eq!(response.checks.len(), 1);
        assert_eq!(response.checks[0].name, "application");
    }

    #[tokio::test]
    async fn test_reachable_cache_is_healthy() {
        let checker = HealthChecker::new().with_check(Arc::new(CacheHealthCheck::<String>::new(
            Arc::new(InMemoryCache::<String>::new()),
        )));
        let response = checker.check_health().await;

        assert_eq!(response.status, HealthStatus::Healthy);
        assert_eq!(response.checks[1].name, "cache");
    }

    #[tokio::test]
    async fn test_unreachable_cache_is_unhealthy() {
        let checker =
            HealthChecker::new().with_check(Arc::new(CacheHealthCheck::<String>::new(Arc::new(Unreachable))));
        let response = checker.check_health().await;

        assert_eq!(response.status, HealthStatus::Unhealthy);
        assert_eq!(response.checks[1].status, HealthStatus::Unhealthy);
        assert_eq!(
            response.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
