//! Tasks: the domain model, its in-memory repository, the cache-aside
//! service and the HTTP routes.

pub mod dto;
mod model;
mod repository;
mod routes;
mod service;

pub use model::{
    DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, NewTask, Task, TaskChanges, TaskQuery, TaskStatus,
};
pub use repository::InMemoryTaskRepository;
pub use routes::{CACHE_STATUS_HEADER, TasksModule};
pub use service::{TASKS_NAMESPACE, TaskPage, TaskService};
