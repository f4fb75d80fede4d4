//! Dashboard view-model
//!
//! Owns the dashboard state and issues API calls. Every successful mutation
//! is followed by a full reload, so the task collection is always a server
//! snapshot.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::model::{
    Confirm, DashboardFeatures, DashboardState, LoadOutcome, MutationOutcome, Notifier, Route,
};
use crate::api::TaskApi;
use crate::filter::{StatusFilter, TaskMetrics};
use crate::preferences::{Preferences, Theme, ViewMode};
use crate::session::Session;
use crate::storage::ClientStore;
use crate::task::{Task, TaskDraft, TaskId, TaskPatch};
use crate::Result;

pub const DELETE_PROMPT: &str = "Delete this task?";

pub struct Dashboard {
    api: Arc<dyn TaskApi>,
    store: Arc<dyn ClientStore>,
    notifier: Arc<dyn Notifier>,
    confirm: Arc<dyn Confirm>,
    features: DashboardFeatures,
    state: RwLock<DashboardState>,
    /// Sequence number of the most recently issued load
    load_seq: AtomicU64,
}

impl Dashboard {
    pub fn new(
        api: Arc<dyn TaskApi>,
        store: Arc<dyn ClientStore>,
        notifier: Arc<dyn Notifier>,
        confirm: Arc<dyn Confirm>,
        features: DashboardFeatures,
    ) -> Self {
        let state = DashboardState {
            draft: features.blank_draft(),
            features,
            ..Default::default()
        };

        Self {
            api,
            store,
            notifier,
            confirm,
            features,
            state: RwLock::new(state),
            load_seq: AtomicU64::new(0),
        }
    }

    pub fn features(&self) -> DashboardFeatures {
        self.features
    }

    /// Copy of the current state
    pub async fn snapshot(&self) -> DashboardState {
        self.state.read().await.clone()
    }

    pub async fn route(&self) -> Route {
        self.state.read().await.route
    }

    pub async fn visible_tasks(&self) -> Vec<Task> {
        let state = self.state.read().await;
        state.visible_tasks().into_iter().cloned().collect()
    }

    pub async fn metrics(&self) -> TaskMetrics {
        self.state.read().await.metrics()
    }

    /// Read preferences and the session, then load tasks if logged in.
    ///
    /// Without a stored token this routes to the login screen and issues no
    /// request.
    pub async fn mount(&self) -> Result<Route> {
        self.restore_preferences().await?;
        let session = Session::load(self.store.as_ref()).await?;

        {
            let mut state = self.state.write().await;
            match session {
                Some(session) => {
                    debug!("Mounting dashboard with stored session");
                    state.session = Some(session);
                    state.route = Route::Dashboard;
                    state.loading = true;
                }
                None => {
                    info!("No stored session; routing to login");
                    state.session = None;
                    state.route = Route::Unauthenticated;
                    state.loading = false;
                    return Ok(Route::Unauthenticated);
                }
            }
        }

        self.load_tasks().await?;
        Ok(self.route().await)
    }

    /// Load theme and view mode without touching the session
    pub async fn restore_preferences(&self) -> Result<Preferences> {
        let preferences = Preferences::load(self.store.as_ref()).await?;
        self.state.write().await.preferences = preferences;
        Ok(preferences)
    }

    /// Persist a freshly issued session and mount with it
    pub async fn begin_session(&self, session: Session) -> Result<Route> {
        session.save(self.store.as_ref()).await?;
        info!(
            "Session started for {}",
            session
                .user
                .as_ref()
                .map(|u| u.username.as_str())
                .unwrap_or("unknown user")
        );
        self.mount().await
    }

    /// Replace the task collection with a fresh server snapshot.
    ///
    /// Connectivity failures end the session; other failures are logged and
    /// otherwise ignored. Responses to superseded loads are dropped.
    pub async fn load_tasks(&self) -> Result<LoadOutcome> {
        let seq = self.load_seq.fetch_add(1, Ordering::SeqCst) + 1;

        let Some(token) = self.state.read().await.token().map(str::to_string) else {
            return Ok(LoadOutcome::Skipped);
        };

        match self.api.get_tasks(&token).await {
            Ok(tasks) => {
                let mut state = self.state.write().await;
                if !self.is_current(seq, &state, &token) {
                    debug!("Dropping stale task snapshot (load #{})", seq);
                    return Ok(LoadOutcome::Stale);
                }
                let count = tasks.len();
                state.tasks = tasks;
                state.loading = false;
                debug!("Loaded {} tasks", count);
                Ok(LoadOutcome::Loaded(count))
            }
            Err(e) if e.is_connectivity() => {
                if !self.is_current(seq, &*self.state.read().await, &token) {
                    debug!("Ignoring connectivity failure of stale load #{}", seq);
                    return Ok(LoadOutcome::Stale);
                }
                warn!("Task API unreachable, ending session: {}", e);
                self.end_session().await?;
                Ok(LoadOutcome::SessionEnded)
            }
            Err(e) => {
                warn!("Failed to load tasks: {}", e);
                let mut state = self.state.write().await;
                if self.is_current(seq, &state, &token) {
                    state.loading = false;
                }
                Ok(LoadOutcome::Absorbed)
            }
        }
    }

    fn is_current(&self, seq: u64, state: &DashboardState, token: &str) -> bool {
        seq == self.load_seq.load(Ordering::SeqCst) && state.token() == Some(token)
    }

    /// Submit the current draft, then reload
    pub async fn create_task(&self) -> Result<MutationOutcome> {
        let (token, mut draft) = {
            let state = self.state.read().await;
            let Some(token) = state.token() else {
                return Ok(MutationOutcome::Skipped);
            };
            (token.to_string(), state.draft.clone())
        };

        if !self.features.priorities {
            draft.priority = None;
        }
        if let Err(e) = draft.validate() {
            self.notifier
                .alert(&format!("Failed to create task: {}", e.user_message()));
            return Ok(MutationOutcome::Failed);
        }

        match self.api.create_task(&token, &draft).await {
            Ok(task) => {
                info!("Created task {}", task.id);
                {
                    let mut state = self.state.write().await;
                    state.draft = self.features.blank_draft();
                    state.create_dialog_open = false;
                }
                self.load_tasks().await?;
                Ok(MutationOutcome::Applied)
            }
            Err(e) => {
                warn!("Failed to create task: {}", e);
                self.notifier
                    .alert(&format!("Failed to create task: {}", e.user_message()));
                Ok(MutationOutcome::Failed)
            }
        }
    }

    /// Flip the completion flag of one task, then reload
    pub async fn toggle_completion(&self, id: TaskId) -> Result<MutationOutcome> {
        let (token, task) = {
            let state = self.state.read().await;
            let Some(token) = state.token() else {
                return Ok(MutationOutcome::Skipped);
            };
            let Some(task) = state.task(id) else {
                debug!("Toggle requested for unknown task {}", id);
                return Ok(MutationOutcome::Skipped);
            };
            (token.to_string(), task.clone())
        };

        let patch = TaskPatch::toggle_completed(&task);
        match self.api.update_task(&token, id, &patch).await {
            Ok(updated) => {
                if !task.completed {
                    self.notifier.task_completed(&updated);
                }
                self.load_tasks().await?;
                Ok(MutationOutcome::Applied)
            }
            Err(e) => {
                warn!("Failed to update task {}: {}", id, e);
                self.notifier.alert("Failed to update task");
                Ok(MutationOutcome::Failed)
            }
        }
    }

    /// Delete one task after confirmation, then reload
    pub async fn delete_task(&self, id: TaskId) -> Result<MutationOutcome> {
        if !self.confirm.confirm(DELETE_PROMPT) {
            return Ok(MutationOutcome::Cancelled);
        }

        let Some(token) = self.state.read().await.token().map(str::to_string) else {
            return Ok(MutationOutcome::Skipped);
        };

        match self.api.delete_task(&token, id).await {
            Ok(()) => {
                info!("Deleted task {}", id);
                self.load_tasks().await?;
                Ok(MutationOutcome::Applied)
            }
            Err(e) => {
                warn!("Failed to delete task {}: {}", id, e);
                self.notifier.alert("Failed to delete task");
                Ok(MutationOutcome::Failed)
            }
        }
    }

    /// Wipe the client store and return to the login screen.
    ///
    /// The token is not revoked server-side.
    pub async fn logout(&self) -> Result<()> {
        self.end_session().await
    }

    async fn end_session(&self) -> Result<()> {
        // Outstanding loads must not repopulate the state.
        self.load_seq.fetch_add(1, Ordering::SeqCst);
        Session::clear(self.store.as_ref()).await?;

        let mut state = self.state.write().await;
        state.session = None;
        state.tasks.clear();
        state.loading = false;
        state.draft = self.features.blank_draft();
        state.create_dialog_open = false;
        state.preferences = Preferences::default();
        state.route = Route::Unauthenticated;
        info!("Session ended");
        Ok(())
    }

    pub async fn open_create_dialog(&self) {
        self.state.write().await.create_dialog_open = true;
    }

    /// Close the dialog; the draft is kept
    pub async fn close_create_dialog(&self) {
        self.state.write().await.create_dialog_open = false;
    }

    pub async fn set_draft(&self, draft: TaskDraft) {
        self.state.write().await.draft = draft;
    }

    pub async fn set_status_filter(&self, status: StatusFilter) {
        if !self.features.filters {
            return;
        }
        self.state.write().await.filter.status = status;
    }

    pub async fn set_query(&self, query: impl Into<String>) {
        if !self.features.filters {
            return;
        }
        self.state.write().await.filter.query = query.into();
    }

    pub async fn set_view_mode(&self, view_mode: ViewMode) -> Result<ViewMode> {
        if !self.features.view_modes {
            return Ok(self.state.read().await.preferences.view_mode);
        }
        Preferences::save_view_mode(self.store.as_ref(), view_mode).await?;
        self.state.write().await.preferences.view_mode = view_mode;
        Ok(view_mode)
    }

    pub async fn set_theme(&self, theme: Theme) -> Result<Theme> {
        if !self.features.theming {
            return Ok(self.state.read().await.preferences.theme);
        }
        Preferences::save_theme(self.store.as_ref(), theme).await?;
        self.state.write().await.preferences.theme = theme;
        Ok(theme)
    }

    pub async fn toggle_theme(&self) -> Result<Theme> {
        let current = self.state.read().await.preferences.theme;
        self.set_theme(current.toggled()).await
    }
}
