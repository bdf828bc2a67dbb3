use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Organization-wide task counts shown on the admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaskStats {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub overdue: u64,
    #[serde(default)]
    pub completed: u64,
    #[serde(rename = "byCategory", default)]
    pub by_category: BTreeMap<String, u64>,
}

impl TaskStats {
    pub fn open(&self) -> u64 {
        self.total.saturating_sub(self.completed)
    }

    /// Completed share of all tasks, as a whole percentage.
    pub fn completion_percent(&self) -> u64 {
        if self.total == 0 {
            0
        } else {
            self.completed * 100 / self.total
        }
    }
}
