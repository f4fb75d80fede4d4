//! HTTP client for the task API

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::types::{LoginRequest, LoginResponse, RegisterRequest};
use super::TaskApi;
use crate::error::Error;
use crate::session::UserProfile;
use crate::task::{Task, TaskDraft, TaskId, TaskPatch};
use crate::Result;

/// reqwest-backed [`TaskApi`]
#[derive(Debug, Clone)]
pub struct HttpTaskApi {
    client: Client,
    base_url: String,
}

impl HttpTaskApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn tasks_url(&self) -> String {
        format!("{}/api/tasks/", self.base_url)
    }

    fn task_url(&self, id: TaskId) -> String {
        format!("{}/api/tasks/{}", self.base_url, id)
    }

    /// Exchange credentials for a token and user profile
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse> {
        let req = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        debug!("POST {}/api/auth/login", self.base_url);

        let resp = self
            .client
            .post(format!("{}/api/auth/login", self.base_url))
            .json(&req)
            .send()
            .await?;
        decode(resp).await
    }

    /// Create an account; does not log in
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<UserProfile> {
        let req = RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        debug!("POST {}/api/auth/register", self.base_url);

        let resp = self
            .client
            .post(format!("{}/api/auth/register", self.base_url))
            .json(&req)
            .send()
            .await?;
        decode(resp).await
    }
}

#[async_trait]
impl TaskApi for HttpTaskApi {
    async fn get_tasks(&self, token: &str) -> Result<Vec<Task>> {
        debug!("GET {}", self.tasks_url());
        let resp = self
            .client
            .get(self.tasks_url())
            .bearer_auth(token)
            .send()
            .await?;
        decode(resp).await
    }

    async fn create_task(&self, token: &str, draft: &TaskDraft) -> Result<Task> {
        debug!("POST {}", self.tasks_url());
        let resp = self
            .client
            .post(self.tasks_url())
            .bearer_auth(token)
            .json(draft)
            .send()
            .await?;
        decode(resp).await
    }

    async fn update_task(&self, token: &str, id: TaskId, patch: &TaskPatch) -> Result<Task> {
        debug!("PUT {}", self.task_url(id));
        let resp = self
            .client
            .put(self.task_url(id))
            .bearer_auth(token)
            .json(patch)
            .send()
            .await?;
        decode(resp).await
    }

    async fn delete_task(&self, token: &str, id: TaskId) -> Result<()> {
        debug!("DELETE {}", self.task_url(id));
        let resp = self
            .client
            .delete(self.task_url(id))
            .bearer_auth(token)
            .send()
            .await?;
        check_status(resp).await?;
        Ok(())
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T> {
    let resp = check_status(resp).await?;
    resp.json::<T>()
        .await
        .map_err(|e| Error::Http(format!("Failed to parse response: {}", e)))
}

async fn check_status(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    Err(Error::Api {
        status: status.as_u16(),
        message: error_message(status, &body),
    })
}

/// Pull a readable message out of an error body.
///
/// FastAPI style servers send `{"detail": "..."}`, or a list of validation
/// errors each carrying a `msg`.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        match json.get("detail").or_else(|| json.get("error")) {
            Some(serde_json::Value::String(s)) => return s.clone(),
            Some(serde_json::Value::Array(items)) => {
                let msgs: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                    .collect();
                if !msgs.is_empty() {
                    return msgs.join("; ");
                }
            }
            _ => {}
        }
    }

    let body = body.trim();
    if body.is_empty() {
        status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
    } else {
        body.to_string()
    }
}
