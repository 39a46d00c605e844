//! Task records and the status board the tasks page renders.

use serde::{Deserialize, Serialize};

use super::RecordId;

/// A bookkeeping task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Backend id.
    #[serde(default)]
    pub id: Option<RecordId>,
    /// Short title.
    #[serde(default)]
    pub title: Option<String>,
    /// Longer description.
    #[serde(default)]
    pub description: Option<String>,
    /// Workflow status as the backend spells it.
    #[serde(default)]
    pub status: Option<String>,
    /// Due date, unparsed.
    #[serde(default)]
    pub due_date: Option<String>,
    /// Owning client.
    #[serde(default)]
    pub client_id: Option<RecordId>,
}

impl Task {
    /// Badge text: the status, or `pending` when the task has none.
    pub fn status_label(&self) -> &str {
        self.status
            .as_deref()
            .map(str::trim)
            .filter(|status| !status.is_empty())
            .unwrap_or("pending")
    }

    /// Column this task belongs in.
    pub fn bucket(&self) -> TaskBucket {
        TaskBucket::from_status(self.status.as_deref())
    }
}

/// Columns on the task board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskBucket {
    /// Not started. Unknown statuses land here too.
    New,
    /// Being worked.
    InProgress,
    /// Awaiting review.
    Review,
    /// Done.
    Completed,
}

impl TaskBucket {
    /// Board columns in display order.
    pub const ALL: [Self; 4] = [Self::New, Self::InProgress, Self::Review, Self::Completed];

    /// Classify a backend status. Case, spaces and hyphens are ignored.
    ///
    /// # Examples
    /// ```
    /// use portal::domain::TaskBucket;
    ///
    /// assert_eq!(TaskBucket::from_status(Some("In Progress")), TaskBucket::InProgress);
    /// assert_eq!(TaskBucket::from_status(Some("archived")), TaskBucket::New);
    /// assert_eq!(TaskBucket::from_status(None), TaskBucket::New);
    /// ```
    pub fn from_status(status: Option<&str>) -> Self {
        let normalised = status
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase()
            .replace([' ', '-'], "_");
        match normalised.as_str() {
            "in_progress" => Self::InProgress,
            "review" => Self::Review,
            "completed" => Self::Completed,
            _ => Self::New,
        }
    }

    /// Column heading.
    pub fn label(self) -> &'static str {
        match self {
            Self::New => "New",
            Self::InProgress => "In Progress",
            Self::Review => "Review",
            Self::Completed => "Completed",
        }
    }
}

/// Tasks grouped into board columns, preserving backend order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskBoard {
    columns: Vec<(TaskBucket, Vec<Task>)>,
}

impl TaskBoard {
    /// Distribute `tasks` across the four columns.
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        let mut columns: Vec<(TaskBucket, Vec<Task>)> = TaskBucket::ALL
            .into_iter()
            .map(|bucket| (bucket, Vec::new()))
            .collect();
        for task in tasks {
            let bucket = task.bucket();
            if let Some((_, column)) = columns.iter_mut().find(|(b, _)| *b == bucket) {
                column.push(task);
            }
        }
        Self { columns }
    }

    /// Columns in display order; every bucket is present.
    pub fn columns(&self) -> &[(TaskBucket, Vec<Task>)] {
        &self.columns
    }

    /// Whether no column holds a task.
    pub fn is_empty(&self) -> bool {
        self.columns.iter().all(|(_, tasks)| tasks.is_empty())
    }
}
