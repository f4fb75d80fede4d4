//! Remote task/auth API boundary
//!
//! The dashboard only depends on the [`TaskApi`] trait; [`HttpTaskApi`] is the
//! reqwest-backed implementation used against the real server.

mod http;
mod types;

use async_trait::async_trait;

use crate::task::{Task, TaskDraft, TaskId, TaskPatch};
use crate::Result;

pub use http::HttpTaskApi;
pub use types::{LoginRequest, LoginResponse, RegisterRequest};

/// Task operations as consumed by the dashboard.
///
/// Every call carries the opaque bearer token of the current session.
#[async_trait]
pub trait TaskApi: Send + Sync {
    /// Fetch the full task collection, in server order
    async fn get_tasks(&self, token: &str) -> Result<Vec<Task>>;

    /// Create a task from a draft
    async fn create_task(&self, token: &str, draft: &TaskDraft) -> Result<Task>;

    /// Apply a partial update to one task
    async fn update_task(&self, token: &str, id: TaskId, patch: &TaskPatch) -> Result<Task>;

    /// Delete one task
    async fn delete_task(&self, token: &str, id: TaskId) -> Result<()>;
}
