//! Ready-made application wiring and fake data for tests.

use crate::app::AppContext;
use crate::cache::InMemoryCache;
use crate::config::Config;
use crate::core::App;
use crate::health::CacheHealthCheck;
use crate::tasks::{InMemoryTaskRepository, Task, TaskService, TasksModule};
use crate::traits::cache::CacheStore;
use axum::Router;
use std::sync::Arc;
use uuid::Uuid;

/// The full task API over an in-memory repository and a chosen cache store
///
/// Keeps handles on the repository and store so tests can check what
/// reached the source of truth and what ended up cached.
pub struct TestApp {
    router: Router,
    repo: Arc<InMemoryTaskRepository>,
    store: Arc<dyn CacheStore<Task>>,
}

impl TestApp {
    /// In-memory repository with an in-memory cache
    pub fn new() -> Self {
        Self::with_store(Arc::new(InMemoryCache::<Task>::new()))
    }

    pub fn with_store(store: Arc<dyn CacheStore<Task>>) -> Self {
        let repo = Arc::new(InMemoryTaskRepository::new());
        let service = Arc::new(TaskService::new(repo.clone(), store.clone()));
        let context = AppContext::builder(service)
            .with_health_check(Arc::new(CacheHealthCheck::new(store.clone())))
            .build();

        let router = App::new(Config::default(), context)
            .register_module(TasksModule)
            .into_router();

        Self { router, repo, store }
    }

    /// A fresh handle on the router; every scenario consumes one
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn repo(&self) -> &Arc<InMemoryTaskRepository> {
        &self.repo
    }

    pub fn store(&self) -> &Arc<dyn CacheStore<Task>> {
        &self.store
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Fake values for request bodies
pub mod fake {
    use super::*;

    pub fn title() -> String {
        format!("Task {}", &Uuid::new_v4().simple().to_string()[..8])
    }

    pub fn assignee() -> String {
        format!("user_{}", &Uuid::new_v4().simple().to_string()[..8])
    }

    /// A well-formed id that no repository will contain
    pub fn missing_id() -> String {
        Uuid::new_v4().to_string()
    }
}
