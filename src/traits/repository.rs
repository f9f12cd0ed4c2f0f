//! Task repository trait
//!
//! The repository is the source of truth. The cache layer only ever holds
//! copies of what it returns, so any backing store (SQL, document store,
//! the in-memory implementation) plugs in behind this trait.

use crate::error::Result;
use crate::tasks::{Task, TaskQuery};
use async_trait::async_trait;
use uuid::Uuid;

/// Persistence operations for tasks
///
/// A missing record is reported as [`TrackerError::NotFound`](crate::TrackerError::NotFound)
/// by `get_by_id`, `update` and `delete`. Callers propagate it unchanged.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Persist a new task and return the stored record
    async fn create(&self, task: Task) -> Result<Task>;

    async fn get_by_id(&self, id: Uuid) -> Result<Task>;

    /// Matching tasks for the requested page plus the total number of matches
    async fn get_all(&self, query: &TaskQuery) -> Result<(Vec<Task>, u64)>;

    /// Replace an existing task and return the stored record
    async fn update(&self, task: Task) -> Result<Task>;

    async fn delete(&self, id: Uuid) -> Result<()>;
}
