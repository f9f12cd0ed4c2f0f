use std::sync::Arc;

use anyhow::Context;
use task_tracker::{
    App, AppContext, CacheHealthCheck, CacheStore, Config, InMemoryTaskRepository, Task, TaskService,
    TasksModule, cache,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("invalid configuration")?;
    task_tracker::init_tracing_with_config(&config);

    let store = cache::build_store::<Task>(&config.cache)
        .await
        .context("failed to initialize cache backend")?;

    let repo = Arc::new(InMemoryTaskRepository::new());
    if config.seed {
        repo.seed().context("failed to seed task repository")?;
    }
    let service = Arc::new(TaskService::new(repo, store.clone()));
    let context = AppContext::builder(service)
        .with_health_check(Arc::new(CacheHealthCheck::new(store.clone())))
        .build();

    tracing::info!(
        backend = store.backend(),
        port = config.server.port,
        "Starting task tracker"
    );

    let served = App::new(config, context)
        .register_module(TasksModule)
        .serve()
        .await;

    if let Err(error) = store.close().await {
        tracing::warn!(error = %error, "Failed to close cache backend");
    }

    served.context("server error")?;
    tracing::info!("Shutdown complete");
    Ok(())
}
