use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Lifecycle state of a task
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            other => Err(format!(
                "unknown status '{}', expected pending, in_progress or completed",
                other
            )),
        }
    }
}

/// A tracked unit of work, as stored by the repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub assignee: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Build a task with a fresh id and both timestamps set to now
    pub fn new(new: NewTask) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: new.title,
            description: new.description,
            status: new.status.unwrap_or_default(),
            assignee: new.assignee,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Fields supplied when creating a task
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub status: Option<TaskStatus>,
    pub assignee: String,
}

/// Partial update; `None` leaves the field unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub assignee: Option<String>,
}

impl TaskChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.assignee.is_none()
    }

    pub fn apply_to(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(assignee) = self.assignee {
            task.assignee = assignee;
        }
    }
}

/// Listing query: optional filters plus 1-indexed pagination
///
/// `limit: None` returns every matching task, which is how the cached full
/// collection is loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskQuery {
    pub page: u32,
    pub limit: Option<u32>,
    pub status: Option<TaskStatus>,
    pub assignee: Option<String>,
}

impl Default for TaskQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: Some(DEFAULT_PAGE_SIZE),
            status: None,
            assignee: None,
        }
    }
}

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

impl TaskQuery {
    /// Every task, unfiltered and unpaginated
    pub fn everything() -> Self {
        Self {
            page: 1,
            limit: None,
            status: None,
            assignee: None,
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        self.status.is_none_or(|status| task.status == status)
            && self
                .assignee
                .as_deref()
                .is_none_or(|assignee| task.assignee == assignee)
    }

    /// Filter an ordered list and cut out the requested page.
    ///
    /// Returns the page together with the number of matching tasks.
    pub fn apply<'a, I>(&self, tasks: I) -> (Vec<Task>, u64)
    where
        I: IntoIterator<Item = &'a Task>,
    {
        let matching: Vec<&Task> = tasks.into_iter().filter(|t| self.matches(t)).collect();
        let total = matching.len() as u64;

        let page = match self.limit {
            Some(limit) => {
                let offset = (self.page.max(1) as usize - 1).saturating_mul(limit as usize);
                matching
                    .into_iter()
                    .skip(offset)
                    .take(limit as usize)
                    .cloned()
                    .collect()
            }
            None => matching.into_iter().cloned().collect(),
        };

        (page, total)
    }
}
