//! Sample data served in demo mode when a dashboard read fails.

use std::collections::BTreeMap;

use chrono::{TimeZone, Utc};

use crate::models::{Assignee, Task, TaskCategory, TaskPriority, TaskStats, TaskStatus};

/// Result of a dashboard read.
///
/// `Demo` marks sample data substituted for a failed read, so callers can
/// label it instead of passing it off as live.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched<T> {
    Live(T),
    Demo(T),
}

impl<T> Fetched<T> {
    pub fn is_demo(&self) -> bool {
        matches!(self, Fetched::Demo(_))
    }

    pub fn value(&self) -> &T {
        match self {
            Fetched::Live(v) | Fetched::Demo(v) => v,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Fetched::Live(v) | Fetched::Demo(v) => v,
        }
    }
}

pub fn task_stats() -> TaskStats {
    let by_category = BTreeMap::from([
        ("Bug".to_string(), 30),
        ("Feature".to_string(), 50),
        ("Improvement".to_string(), 20),
    ]);
    TaskStats {
        total: 100,
        overdue: 5,
        completed: 70,
        by_category,
    }
}

pub fn tasks() -> Vec<Task> {
    vec![Task {
        id: "1".to_string(),
        title: "Fix login bug".to_string(),
        description: Some("Fix issue with login redirect".to_string()),
        category: TaskCategory::Bug,
        priority: TaskPriority::High,
        due_date: Some("2025-06-10".to_string()),
        status: TaskStatus::Todo,
        assigned_to: Some(Assignee {
            id: None,
            name: Some("John Doe".to_string()),
        }),
        created_at: Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).single(),
        comments: Some("Urgent fix required".to_string()),
    }]
}
