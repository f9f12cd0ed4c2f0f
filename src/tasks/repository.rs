use crate::error::{Result, TrackerError};
use crate::tasks::{NewTask, Task, TaskQuery, TaskStatus};
use crate::traits::repository::TaskRepository;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

/// In-memory task repository
///
/// Keeps tasks in insertion order behind a single `RwLock`. Used by the
/// binary when no external store is wired in and by the test suites. Counts
/// `get_by_id` calls so tests can observe whether a read reached the source
/// of truth.
#[derive(Default)]
pub struct InMemoryTaskRepository {
    tasks: RwLock<Vec<Task>>,
    fetches: AtomicUsize,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the sample tasks used for local development
    ///
    /// Returns how many tasks were added.
    pub fn seed(&self) -> Result<usize> {
        let samples = sample_tasks();
        let added = samples.len();

        let mut tasks = self.write()?;
        tasks.extend(samples.into_iter().map(Task::new));

        tracing::info!(count = added, "Seeded task repository");
        Ok(added)
    }

    /// Number of `get_by_id` calls served so far
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<Task>>> {
        self.tasks
            .read()
            .map_err(|_| TrackerError::internal("task repository lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<Task>>> {
        self.tasks
            .write()
            .map_err(|_| TrackerError::internal("task repository lock poisoned"))
    }
}

fn sample_tasks() -> Vec<NewTask> {
    let sample = |title: &str, description: &str, status, assignee: &str| NewTask {
        title: title.to_string(),
        description: description.to_string(),
        status: Some(status),
        assignee: assignee.to_string(),
    };

    vec![
        sample(
            "Complete project setup",
            "Set up the initial project structure and dependencies",
            TaskStatus::Completed,
            "developer",
        ),
        sample(
            "Implement user authentication",
            "Add user login and registration functionality",
            TaskStatus::InProgress,
            "developer",
        ),
        sample(
            "Write unit tests",
            "Create comprehensive unit tests for all modules",
            TaskStatus::Pending,
            "tester",
        ),
        sample(
            "Deploy to production",
            "Deploy the application to the production environment",
            TaskStatus::Pending,
            "devops",
        ),
    ]
}

fn not_found(id: Uuid) -> TrackerError {
    TrackerError::not_found(format!("Task {} not found", id))
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn create(&self, task: Task) -> Result<Task> {
        let mut tasks = self.write()?;
        if tasks.iter().any(|t| t.id == task.id) {
            return Err(TrackerError::bad_request(format!(
                "Task {} already exists",
                task.id
            )));
        }
        tasks.push(task.clone());
        Ok(task)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Task> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.read()?
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    async fn get_all(&self, query: &TaskQuery) -> Result<(Vec<Task>, u64)> {
        Ok(query.apply(self.read()?.iter()))
    }

    async fn update(&self, mut task: Task) -> Result<Task> {
        let mut tasks = self.write()?;
        let slot = tasks
            .iter_mut()
            .find(|t| t.id == task.id)
            .ok_or_else(|| not_found(task.id))?;

        task.created_at = slot.created_at;
        task.updated_at = Utc::now();
        *slot = task.clone();
        Ok(task)
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut tasks = self.write()?;
        let index = tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| not_found(id))?;
        tasks.remove(index);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_task(title: &str) -> Task {
        Task::new(NewTask {
            title: title.to_string(),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let repo = InMemoryTaskRepository::new();
        let created = repo.create(new_task("Write tests")).await.unwrap();

        let fetched = repo.get_by_id(created.id).await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(repo.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_task_is_not_found() {
        let repo = InMemoryTaskRepository::new();
        let id = Uuid::new_v4();

        assert!(repo.get_by_id(id).await.unwrap_err().is_not_found());
        assert!(repo.delete(id).await.unwrap_err().is_not_found());
        assert!(repo.update(new_task("ghost")).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_update_keeps_created_at_and_bumps_updated_at() {
        let repo = InMemoryTaskRepository::new();
        let created = repo.create(new_task("Draft")).await.unwrap();

        let mut changed = created.clone();
        changed.title = "Final".to_string();
        changed.status = TaskStatus::Completed;
        let updated = repo.update(changed).await.unwrap();

        assert_eq!(updated.title, "Final");
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
        assert_eq!(repo.get_by_id(created.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_get_all_filters_and_counts() {
        let repo = InMemoryTaskRepository::new();
        for i in 0..15 {
            let mut task = new_task(&format!("task {}", i));
            task.assignee = if i % 3 == 0 { "alice" } else { "bob" }.to_string();
            repo.create(task).await.unwrap();
        }

        let (page, total) = repo
            .get_all(&TaskQuery {
                assignee: Some("alice".to_string()),
                limit: Some(2),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(total, 5);
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].title, "task 0");
        assert_eq!(page[1].title, "task 3");

        let (all, total) = repo.get_all(&TaskQuery::everything()).await.unwrap();
        assert_eq!(total, 15);
        assert_eq!(all.len(), 15);
    }

    #[tokio::test]
    async fn test_delete_removes_task() {
        let repo = InMemoryTaskRepository::new();
        let created = repo.create(new_task("Temporary")).await.unwrap();

        repo.delete(created.id).await.unwrap();
        assert!(repo.get_by_id(created.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_duplicate_id_is_rejected() {
        let repo = InMemoryTaskRepository::new();
        let created = repo.create(new_task("Once")).await.unwrap();

        let err = repo.create(created).await.unwrap_err();
        assert!(matches!(err, TrackerError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_seed_inserts_sample_tasks() {
        let repo = InMemoryTaskRepository::new();
        assert_eq!(repo.seed().unwrap(), 4);

        let (all, total) = repo.get_all(&TaskQuery::everything()).await.unwrap();
        assert_eq!(total, 4);
        assert_eq!(all[0].title, "Complete project setup");
        assert_eq!(all[0].status, TaskStatus::Completed);

        let pending = TaskQuery {
            status: Some(TaskStatus::Pending),
            ..TaskQuery::everything()
        };
        assert_eq!(repo.get_all(&pending).await.unwrap().1, 2);

        let developer = TaskQuery {
            assignee: Some("developer".to_string()),
            ..TaskQuery::everything()
        };
        assert_eq!(repo.get_all(&developer).await.unwrap().1, 2);

        let ids: std::collections::HashSet<_> = all.iter().map(|t| t.id).collect();
        assert_eq!(ids.len(), 4);
    }
}
