//! Request and response bodies for the task endpoints.

use crate::error::{Result, TrackerError};
use crate::tasks::{
    DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, NewTask, Task, TaskChanges, TaskPage, TaskQuery, TaskStatus,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, max = 200, message = "must be between 1 and 200 characters"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 1000, message = "must be at most 1000 characters"))]
    pub description: String,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub assignee: String,
}

impl From<CreateTaskRequest> for NewTask {
    fn from(req: CreateTaskRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            status: req.status,
            assignee: req.assignee,
        }
    }
}

/// Partial update; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, max = 200, message = "must be between 1 and 200 characters"))]
    pub title: Option<String>,
    #[validate(length(max = 1000, message = "must be at most 1000 characters"))]
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub assignee: Option<String>,
}

impl From<UpdateTaskRequest> for TaskChanges {
    fn from(req: UpdateTaskRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            status: req.status,
            assignee: req.assignee,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub assignee: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id.to_string(),
            title: task.title,
            description: task.description,
            status: task.status,
            assignee: task.assignee,
            created_at: task.created_at.to_rfc3339(),
            updated_at: task.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskListResponse {
    pub tasks: Vec<TaskResponse>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub has_next: bool,
    pub has_previous: bool,
}

impl From<TaskPage> for TaskListResponse {
    fn from(page: TaskPage) -> Self {
        let has_next = page.has_next();
        let has_previous = page.has_previous();
        Self {
            tasks: page.tasks.into_iter().map(TaskResponse::from).collect(),
            total: page.total,
            page: page.page,
            limit: page.limit,
            has_next,
            has_previous,
        }
    }
}

/// Raw listing query string
///
/// Pagination values are taken as strings and parsed leniently: anything
/// unparsable or out of range falls back to the default. An unknown status
/// is rejected because it would silently widen the filter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListTasksParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub status: Option<String>,
    pub assignee: Option<String>,
}

impl ListTasksParams {
    pub fn into_query(self) -> Result<TaskQuery> {
        let page = self
            .page
            .and_then(|p| p.trim().parse::<u32>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1);

        let limit = self
            .limit
            .and_then(|l| l.trim().parse::<u32>().ok())
            .filter(|l| (1..=MAX_PAGE_SIZE).contains(l))
            .unwrap_or(DEFAULT_PAGE_SIZE);

        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<TaskStatus>().map_err(TrackerError::bad_request)?),
        };

        let assignee = self.assignee.filter(|a| !a.trim().is_empty());

        Ok(TaskQuery {
            page,
            limit: Some(limit),
            status,
            assignee,
        })
    }
}
