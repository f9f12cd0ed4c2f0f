use crate::cache::{CacheAside, CacheStatus, Fetched};
use crate::error::Result;
use crate::tasks::{NewTask, Task, TaskChanges, TaskQuery};
use crate::traits::cache::CacheStore;
use crate::traits::repository::TaskRepository;
use std::sync::Arc;
use uuid::Uuid;

/// Cache namespace for tasks: items at `tasks:<id>`, the full list at `tasks`
pub const TASKS_NAMESPACE: &str = "tasks";

/// One page of a task listing
#[derive(Debug, Clone, PartialEq)]
pub struct TaskPage {
    pub tasks: Vec<Task>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub cache_status: CacheStatus,
}

impl TaskPage {
    pub fn has_next(&self) -> bool {
        u64::from(self.page) * u64::from(self.limit) < self.total
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

/// Task operations with cache-aside coordination
///
/// Reads go through the cache; writes hit the repository first and then
/// invalidate. The repository's outcome is always what the caller sees.
pub struct TaskService {
    repo: Arc<dyn TaskRepository>,
    cache: CacheAside<Task>,
}

impl TaskService {
    pub fn new(repo: Arc<dyn TaskRepository>, store: Arc<dyn CacheStore<Task>>) -> Self {
        Self {
            repo,
            cache: CacheAside::new(store, TASKS_NAMESPACE),
        }
    }

    pub fn cache(&self) -> &CacheAside<Task> {
        &self.cache
    }

    pub async fn create(&self, new: NewTask) -> Result<Task> {
        let task = self.repo.create(Task::new(new)).await?;
        self.cache.invalidate_collection().await;

        tracing::info!(
            id = %task.id,
            title = %task.title,
            status = %task.status,
            "Task created"
        );
        Ok(task)
    }

    pub async fn get(&self, id: Uuid) -> Result<Fetched<Task>> {
        let fetched = self
            .cache
            .fetch(id, || self.repo.get_by_id(id))
            .await?;

        tracing::debug!(id = %id, cache = fetched.status.as_str(), "Task retrieved");
        Ok(fetched)
    }

    /// List tasks from the cached full collection, filtering and paginating
    /// in memory. A collection miss loads every task from the repository.
    pub async fn list(&self, query: &TaskQuery) -> Result<TaskPage> {
        let fetched = self
            .cache
            .fetch_all(|| async {
                self.repo
                    .get_all(&TaskQuery::everything())
                    .await
                    .map(|(tasks, _)| tasks)
            })
            .await?;

        let (tasks, total) = query.apply(&fetched.value);
        tracing::debug!(
            page = query.page,
            total,
            cache = fetched.status.as_str(),
            "Tasks listed"
        );

        Ok(TaskPage {
            tasks,
            total,
            page: query.page,
            limit: query.limit.unwrap_or(total.min(u64::from(u32::MAX)) as u32),
            cache_status: fetched.status,
        })
    }

    pub async fn update(&self, id: Uuid, changes: TaskChanges) -> Result<Task> {
        let mut task = self.repo.get_by_id(id).await?;
        changes.apply_to(&mut task);

        let task = self.repo.update(task).await?;
        self.cache.invalidate(id).await;

        tracing::info!(id = %id, status = %task.status, "Task updated");
        Ok(task)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.repo.delete(id).await?;
        self.cache.invalidate(id).await;

        tracing::info!(id = %id, "Task deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{InMemoryCache, NoOpCache};
    use crate::tasks::{InMemoryTaskRepository, TaskStatus};

    fn service_with(
        store: Arc<dyn CacheStore<Task>>,
    ) -> (TaskService, Arc<InMemoryTaskRepository>) {
        let repo = Arc::new(InMemoryTaskRepository::new());
        (TaskService::new(repo.clone(), store), repo)
    }

    fn new_task(title: &str) -> NewTask {
        NewTask {
            title: title.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_second_read_is_served_from_cache() {
        let store = Arc::new(InMemoryCache::<Task>::new());
        let (service, repo) = service_with(store.clone());
        let task = service.create(new_task("Cached")).await.unwrap();

        let first = service.get(task.id).await.unwrap();
        assert_eq!(first.status, CacheStatus::Miss);
        assert_eq!(first.value, task);
        assert_eq!(repo.fetch_count(), 1);
        assert_eq!(
            store.get(&format!("tasks:{}", task.id)).await.unwrap(),
            Some(task.clone())
        );

        let second = service.get(task.id).await.unwrap();
        assert_eq!(second.status, CacheStatus::Hit);
        assert_eq!(second.value, task);
        assert_eq!(repo.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_update_forces_refetch() {
        let (service, repo) = service_with(Arc::new(InMemoryCache::<Task>::new()));
        let task = service.create(new_task("Before")).await.unwrap();
        service.get(task.id).await.unwrap();

        service
            .update(
                task.id,
                TaskChanges {
                    title: Some("After".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let fetches_after_update = repo.fetch_count();

        let read = service.get(task.id).await.unwrap();
        assert_eq!(read.status, CacheStatus::Miss);
        assert_eq!(read.value.title, "After");
        assert_eq!(repo.fetch_count(), fetches_after_update + 1);
    }

    #[tokio::test]
    async fn test_not_found_is_propagated_and_not_cached() {
        let store = Arc::new(InMemoryCache::<Task>::new());
        let (service, _) = service_with(store.clone());

        let err = service.get(Uuid::new_v4()).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(store.is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_delete_invalidates_entry() {
        let store = Arc::new(InMemoryCache::<Task>::new());
        let (service, _) = service_with(store.clone());
        let task = service.create(new_task("Doomed")).await.unwrap();
        service.get(task.id).await.unwrap();

        service.delete(task.id).await.unwrap();

        assert_eq!(store.get(&format!("tasks:{}", task.id)).await.unwrap(), None);
        assert!(service.get(task.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_failed_write_leaves_cache_alone() {
        let store = Arc::new(InMemoryCache::<Task>::new());
        let (service, _) = service_with(store.clone());
        let task = service.create(new_task("Keep")).await.unwrap();
        service.get(task.id).await.unwrap();

        let err = service.delete(Uuid::new_v4()).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(store.get(&format!("tasks:{}", task.id)).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_list_uses_cached_collection_until_create() {
        let store = Arc::new(InMemoryCache::<Task>::new());
        let (service, _) = service_with(store.clone());
        service.create(new_task("one")).await.unwrap();
        service.create(new_task("two")).await.unwrap();

        let query = TaskQuery::default();
        let first = service.list(&query).await.unwrap();
        assert_eq!(first.cache_status, CacheStatus::Miss);
        assert_eq!(first.total, 2);

        let second = service.list(&query).await.unwrap();
        assert_eq!(second.cache_status, CacheStatus::Hit);
        assert_eq!(second.tasks, first.tasks);

        service.create(new_task("three")).await.unwrap();
        assert_eq!(store.get_all(TASKS_NAMESPACE).await.unwrap(), None);

        let third = service.list(&query).await.unwrap();
        assert_eq!(third.cache_status, CacheStatus::Miss);
        assert_eq!(third.total, 3);
        assert_eq!(third.tasks[2].title, "three");
    }

    #[tokio::test]
    async fn test_list_filters_cached_collection() {
        let (service, _) = service_with(Arc::new(InMemoryCache::<Task>::new()));
        for (title, status) in [
            ("a", TaskStatus::Pending),
            ("b", TaskStatus::Completed),
            ("c", TaskStatus::Completed),
        ] {
            service
                .create(NewTask {
                    title: title.to_string(),
                    status: Some(status),
                    ..Default::default()
                })
                .await
                .unwrap();
        }

        let page = service
            .list(&TaskQuery {
                status: Some(TaskStatus::Completed),
                limit: Some(1),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(page.total, 2);
        assert_eq!(page.tasks.len(), 1);
        assert_eq!(page.tasks[0].title, "b");
        assert!(page.has_next());
        assert!(!page.has_previous());
    }

    #[tokio::test]
    async fn test_noop_cache_always_reads_repository() {
        let (service, repo) = service_with(Arc::new(NoOpCache::<Task>::new()));
        let task = service.create(new_task("Uncached")).await.unwrap();

        for _ in 0..3 {
            let read = service.get(task.id).await.unwrap();
            assert_eq!(read.status, CacheStatus::Miss);
        }
        assert_eq!(repo.fetch_count(), 3);
    }
}
