use crate::health::HealthChecker;
use crate::tasks::TaskService;
use std::sync::Arc;

/// Shared state handed to every handler
///
/// Built once at startup. The task service owns the cache store, so there is
/// no process-wide cache singleton.
#[derive(Clone)]
pub struct AppContext {
    pub tasks: Arc<TaskService>,
    pub health: Arc<HealthChecker>,
}

impl AppContext {
    /// Context with only the application health check registered
    pub fn new(tasks: Arc<TaskService>) -> Self {
        Self {
            tasks,
            health: Arc::new(HealthChecker::new()),
        }
    }

    pub fn builder(tasks: Arc<TaskService>) -> AppContextBuilder {
        AppContextBuilder::new(tasks)
    }
}

/// Builder for AppContext with fluent API
#[must_use = "builder does nothing until you call build()"]
pub struct AppContextBuilder {
    tasks: Arc<TaskService>,
    health: HealthChecker,
}

impl AppContextBuilder {
    pub fn new(tasks: Arc<TaskService>) -> Self {
        Self {
            tasks,
            health: HealthChecker::new(),
        }
    }

    pub fn with_health_check(mut self, check: Arc<dyn crate::health::HealthCheck>) -> Self {
        self.health = self.health.with_check(check);
        self
    }

    pub fn build(self) -> AppContext {
        AppContext {
            tasks: self.tasks,
            health: Arc::new(self.health),
        }
    }
}
