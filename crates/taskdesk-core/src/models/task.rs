use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskCategory {
    Bug,
    Feature,
    Improvement,
}

impl TaskCategory {
    pub const ALL: [TaskCategory; 3] = [TaskCategory::Bug, TaskCategory::Feature, TaskCategory::Improvement];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskCategory::Bug => "Bug",
            TaskCategory::Feature => "Feature",
            TaskCategory::Improvement => "Improvement",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl TaskPriority {
    pub const ALL: [TaskPriority; 3] = [TaskPriority::Low, TaskPriority::Medium, TaskPriority::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "Low",
            TaskPriority::Medium => "Medium",
            TaskPriority::High => "High",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    Todo,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
    Expired,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::Completed,
        TaskStatus::Expired,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "Todo",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
            TaskStatus::Expired => "Expired",
        }
    }

    /// Completed and expired tasks need no further work.
    pub fn is_closed(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Expired)
    }

    /// Accepts "In Progress", "in-progress", "inprogress" and so on.
    pub fn parse(s: &str) -> Option<Self> {
        let squashed: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        Self::ALL.into_iter().find(|status| {
            let name: String = status.as_str().chars().filter(|c| *c != ' ').collect();
            name.eq_ignore_ascii_case(&squashed)
        })
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(self.as_str())
            }
        })*
    };
}

display_as_str!(TaskCategory, TaskPriority, TaskStatus);

/// The user a task is assigned to, as embedded in task listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignee {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: TaskCategory,
    pub priority: TaskPriority,
    #[serde(rename = "dueDate", default)]
    pub due_date: Option<String>,
    pub status: TaskStatus,
    #[serde(rename = "assignedTo", default)]
    pub assigned_to: Option<Assignee>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub comments: Option<String>,
}

impl Task {
    /// Due date, accepting both `YYYY-MM-DD` and full RFC 3339 timestamps.
    pub fn due(&self) -> Option<NaiveDate> {
        let raw = self.due_date.as_deref()?;
        let date_part = raw.split('T').next()?;
        NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.status.is_closed() && self.due().is_some_and(|due| due < today)
    }

    pub fn assignee_name(&self) -> &str {
        self.assigned_to
            .as_ref()
            .and_then(|a| a.name.as_deref())
            .unwrap_or("Unassigned")
    }
}

/// Body for creating or fully updating a task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub category: TaskCategory,
    pub priority: TaskPriority,
    #[serde(rename = "dueDate")]
    pub due_date: String,
    pub status: TaskStatus,
    #[serde(rename = "assignedToId")]
    pub assigned_to_id: String,
}

impl TaskDraft {
    /// Blank draft with the same defaults the task dialog starts from.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            category: TaskCategory::Feature,
            priority: TaskPriority::Medium,
            due_date: String::new(),
            status: TaskStatus::Todo,
            assigned_to_id: String::new(),
        }
    }
}

impl From<&Task> for TaskDraft {
    fn from(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone().unwrap_or_default(),
            category: task.category,
            priority: task.priority,
            due_date: task.due().map(|d| d.to_string()).unwrap_or_default(),
            status: task.status,
            assigned_to_id: task
                .assigned_to
                .as_ref()
                .and_then(|a| a.id.clone())
                .unwrap_or_default(),
        }
    }
}

/// A member's progress update on an assigned task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusUpdate {
    pub status: TaskStatus,
    pub comment: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_task() -> Task {
        serde_json::from_value(serde_json::json!({
            "_id": "1",
            "title": "Fix login bug",
            "category": "Bug",
            "priority": "High",
            "dueDate": "2025-06-10T00:00:00.000Z",
            "status": "In Progress",
            "assignedTo": {"_id": "u2", "name": "John Doe"},
            "description": "Fix issue with login redirect",
            "createdAt": "2025-05-01T12:00:00Z",
            "comments": "Urgent fix required"
        }))
        .expect("Failed to parse task test JSON")
    }

    #[test]
    fn test_parse_task() {
        let task = sample_task();
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.priority, TaskPriority::High);
        assert_eq!(task.assignee_name(), "John Doe");
        assert_eq!(task.due(), NaiveDate::from_ymd_opt(2025, 6, 10));
    }

    #[test]
    fn test_is_overdue() {
        let mut task = sample_task();
        let before = NaiveDate::from_ymd_opt(2025, 6, 9).unwrap();
        let after = NaiveDate::from_ymd_opt(2025, 6, 11).unwrap();

        assert!(!task.is_overdue(before));
        assert!(task.is_overdue(after));

        task.status = TaskStatus::Completed;
        assert!(!task.is_overdue(after));

        task.status = TaskStatus::Expired;
        assert!(!task.is_overdue(after));

        task.status = TaskStatus::Todo;
        task.due_date = None;
        assert!(!task.is_overdue(after));
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(TaskStatus::parse("In Progress"), Some(TaskStatus::InProgress));
        assert_eq!(TaskStatus::parse("in-progress"), Some(TaskStatus::InProgress));
        assert_eq!(TaskStatus::parse("todo"), Some(TaskStatus::Todo));
        assert_eq!(TaskStatus::parse("expired"), Some(TaskStatus::Expired));
        assert_eq!(TaskStatus::parse("done"), None);
    }

    #[test]
    fn test_parse_expired_task() {
        let task: Task = serde_json::from_value(serde_json::json!({
            "_id": "2",
            "title": "Quarterly report",
            "category": "Improvement",
            "priority": "Low",
            "status": "Expired"
        }))
        .unwrap();
        assert_eq!(task.status, TaskStatus::Expired);
        assert!(task.status.is_closed());
        assert!(!TaskStatus::InProgress.is_closed());
        assert_eq!(serde_json::to_value(task.status).unwrap(), "Expired");
    }

    #[test]
    fn test_draft_from_task() {
        let draft = TaskDraft::from(&sample_task());
        assert_eq!(draft.due_date, "2025-06-10");
        assert_eq!(draft.assigned_to_id, "u2");

        let value = serde_json::to_value(&draft).unwrap();
        assert_eq!(value["status"], "In Progress");
        assert_eq!(value["assignedToId"], "u2");
    }

    #[test]
    fn test_draft_defaults() {
        let draft = TaskDraft::new("Write docs");
        assert_eq!(draft.category, TaskCategory::Feature);
        assert_eq!(draft.priority, TaskPriority::Medium);
        assert_eq!(draft.status, TaskStatus::Todo);
    }
}
