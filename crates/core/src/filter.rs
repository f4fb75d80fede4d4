//! View filters and derived metrics
//!
//! Everything here is pure: it narrows or summarizes the task collection the
//! dashboard currently holds and never talks to the server.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::task::{Task, TaskPriority};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Completed,
}

impl StatusFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Pending => !task.completed,
            Self::Completed => task.completed,
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            other => Err(Error::InvalidInput(format!(
                "Unknown status filter: {}",
                other
            ))),
        }
    }
}

/// Status filter combined with a free-text query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewFilter {
    pub status: StatusFilter,
    pub query: String,
}

impl ViewFilter {
    pub fn new(status: StatusFilter, query: impl Into<String>) -> Self {
        Self {
            status,
            query: query.into(),
        }
    }

    /// Status AND case-insensitive substring match on title or description.
    pub fn matches(&self, task: &Task) -> bool {
        self.status.matches(task) && text_matches(task, &self.query.to_lowercase())
    }

    /// Tasks passing the filter, in collection order
    pub fn apply<'a>(&self, tasks: &'a [Task]) -> Vec<&'a Task> {
        let needle = self.query.to_lowercase();
        tasks
            .iter()
            .filter(|task| self.status.matches(task) && text_matches(task, &needle))
            .collect()
    }
}

fn text_matches(task: &Task, needle: &str) -> bool {
    needle.is_empty()
        || task.title.to_lowercase().contains(needle)
        || task.description.to_lowercase().contains(needle)
}

/// Counters shown above the task list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskMetrics {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    /// Percentage in `0..=100`, rounded half up
    pub completion_rate: u32,
    pub high_priority_pending: usize,
}

impl TaskMetrics {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let total = tasks.len();
        let completed = tasks.iter().filter(|t| t.completed).count();
        let high_priority_pending = tasks
            .iter()
            .filter(|t| t.priority == TaskPriority::High && !t.completed)
            .count();

        Self {
            total,
            completed,
            pending: total - completed,
            completion_rate: completion_rate(completed, total),
            high_priority_pending,
        }
    }
}

/// `round(completed / total * 100)`, or 0 for an empty collection
pub fn completion_rate(completed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    // floor(x + 0.5) in integer arithmetic
    ((completed * 200 + total) / (total * 2)) as u32
}
