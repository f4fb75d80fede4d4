//! Dashboard state and the seams the view-model talks through

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::filter::{TaskMetrics, ViewFilter};
use crate::preferences::Preferences;
use crate::session::Session;
use crate::task::{Task, TaskDraft, TaskPriority};
use crate::{Error, Result};

/// Which screen the dashboard should show
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Route {
    /// No session; the login screen
    #[default]
    Unauthenticated,
    Dashboard,
}

/// Product iteration presets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Plain list with counters
    Classic,
    /// Adds search, status filter, grid/list and dark mode
    Workspace,
    /// Adds task priorities on top of the workspace features
    #[default]
    Priority,
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Classic => "classic",
            Self::Workspace => "workspace",
            Self::Priority => "priority",
        })
    }
}

impl FromStr for Variant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "classic" => Ok(Self::Classic),
            "workspace" => Ok(Self::Workspace),
            "priority" => Ok(Self::Priority),
            other => Err(Error::InvalidInput(format!("Unknown variant: {}", other))),
        }
    }
}

/// Optional dashboard capabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardFeatures {
    pub filters: bool,
    pub view_modes: bool,
    pub theming: bool,
    pub priorities: bool,
}

impl DashboardFeatures {
    pub fn for_variant(variant: Variant) -> Self {
        match variant {
            Variant::Classic => Self {
                filters: false,
                view_modes: false,
                theming: false,
                priorities: false,
            },
            Variant::Workspace => Self {
                filters: true,
                view_modes: true,
                theming: true,
                priorities: false,
            },
            Variant::Priority => Self {
                filters: true,
                view_modes: true,
                theming: true,
                priorities: true,
            },
        }
    }

    /// Empty draft for the creation dialog
    pub fn blank_draft(&self) -> TaskDraft {
        TaskDraft {
            priority: self.priorities.then_some(TaskPriority::Medium),
            ..Default::default()
        }
    }
}

impl Default for DashboardFeatures {
    fn default() -> Self {
        Self::for_variant(Variant::default())
    }
}

/// Everything the dashboard renders from
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub route: Route,
    pub session: Option<Session>,
    /// Last full snapshot returned by the API, in server order
    pub tasks: Vec<Task>,
    pub loading: bool,
    pub filter: ViewFilter,
    pub preferences: Preferences,
    pub draft: TaskDraft,
    pub create_dialog_open: bool,
    pub features: DashboardFeatures,
}

impl DashboardState {
    pub fn visible_tasks(&self) -> Vec<&Task> {
        self.filter.apply(&self.tasks)
    }

    /// Counters over the whole collection, not just the visible tasks
    pub fn metrics(&self) -> TaskMetrics {
        TaskMetrics::from_tasks(&self.tasks)
    }

    pub fn greeting(&self) -> Option<String> {
        self.session.as_ref().and_then(Session::greeting)
    }

    pub fn token(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.token.as_str())
    }

    pub fn task(&self, id: i64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }
}

/// Result of a task reload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Snapshot replaced; holds the new task count
    Loaded(usize),
    /// No session to load with
    Skipped,
    /// A newer load was issued, or the session ended, while this one ran
    Stale,
    /// Failed for a reason other than connectivity; nothing changed
    Absorbed,
    /// The API was unreachable and the session was ended
    SessionEnded,
}

/// Result of a create, toggle or delete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    Applied,
    /// No session token (or no such task); nothing was sent
    Skipped,
    /// The user declined the confirmation
    Cancelled,
    /// The request failed and the user was notified
    Failed,
}

/// Blocking user-facing notifications
pub trait Notifier: Send + Sync {
    fn alert(&self, message: &str);

    /// Called after a task was marked completed.
    fn task_completed(&self, _task: &Task) {}
}

/// Interactive yes/no confirmation
pub trait Confirm: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_presets() {
        let classic = DashboardFeatures::for_variant(Variant::Classic);
        assert!(!classic.filters && !classic.theming && !classic.priorities);

        let workspace = DashboardFeatures::for_variant(Variant::Workspace);
        assert!(workspace.filters && workspace.view_modes && workspace.theming);
        assert!(!workspace.priorities);

        assert!(DashboardFeatures::default().priorities);
    }

    #[test]
    fn test_blank_draft_priority() {
        let draft = DashboardFeatures::for_variant(Variant::Priority).blank_draft();
        assert_eq!(draft.priority, Some(TaskPriority::Medium));
        assert!(draft.title.is_empty());

        let draft = DashboardFeatures::for_variant(Variant::Classic).blank_draft();
        assert_eq!(draft.priority, None);
    }

    #[test]
    fn test_variant_from_str() {
        assert_eq!("Workspace".parse::<Variant>().unwrap(), Variant::Workspace);
        assert!("phase-4".parse::<Variant>().is_err());
    }
}
