//! Terminal front-end for the task dashboard
//!
//! Each invocation mounts the dashboard view-model against the configured
//! API, performs one command and prints the resulting state.

mod config;
mod prompt;
mod render;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use dialoguer::{theme::ColorfulTheme, Input, Password};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use taskdash_core::api::{HttpTaskApi, TaskApi};
use taskdash_core::dashboard::{Dashboard, DashboardFeatures, MutationOutcome, Route};
use taskdash_core::filter::StatusFilter;
use taskdash_core::preferences::{Theme, ViewMode};
use taskdash_core::session::Session;
use taskdash_core::storage::{ClientStore, FileClientStore, STORAGE_KEY_TOKEN};
use taskdash_core::task::{TaskId, TaskPriority};

use crate::config::Config;
use crate::prompt::{TerminalConfirm, TerminalNotifier};
use crate::render::Palette;

#[derive(Parser)]
#[command(name = "taskdash", author, version, about, long_about = None)]
struct Cli {
    /// Base URL of the task API
    #[arg(long, env = "TASKDASH_API_URL", global = true)]
    api_url: Option<String>,

    /// Directory holding the client state file
    #[arg(long, env = "TASKDASH_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and start a session
    Login {
        #[arg(short, long)]
        username: Option<String>,
    },
    /// Create an account
    Register {
        #[arg(short, long)]
        username: Option<String>,
        #[arg(short, long)]
        email: Option<String>,
    },
    /// End the current session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// List tasks
    List {
        #[arg(long)]
        status: Option<StatusFilter>,
        #[arg(short, long)]
        query: Option<String>,
        /// Layout for this listing only
        #[arg(long)]
        view: Option<ViewMode>,
    },
    /// Add a task
    Add {
        title: String,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        priority: Option<TaskPriority>,
    },
    /// Flip a task between pending and completed
    Toggle { id: TaskId },
    /// Delete a task
    Delete {
        id: TaskId,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Show task counters
    Stats,
    /// Show or change the theme
    Theme { choice: Option<ThemeChoice> },
    /// Show or change the default layout
    View { mode: Option<ViewMode> },
}

#[derive(Clone, Copy, ValueEnum)]
enum ThemeChoice {
    Light,
    Dark,
    Toggle,
}

struct App {
    api: Arc<HttpTaskApi>,
    store: Arc<dyn ClientStore>,
    dashboard: Dashboard,
    features: DashboardFeatures,
}

impl App {
    async fn new(config: &Config, assume_yes: bool) -> Result<Self> {
        let state_path = config.state_path()?;
        let store: Arc<dyn ClientStore> = Arc::new(
            FileClientStore::new(&state_path)
                .await
                .with_context(|| format!("Failed to open {}", state_path.display()))?,
        );
        let api = Arc::new(HttpTaskApi::new(config.api_url.trim_end_matches('/')));
        let features = DashboardFeatures::for_variant(config.variant);

        let task_api: Arc<dyn TaskApi> = api.clone();
        let dashboard = Dashboard::new(
            task_api,
            Arc::clone(&store),
            Arc::new(TerminalNotifier),
            Arc::new(TerminalConfirm { assume_yes }),
            features,
        );

        Ok(Self {
            api,
            store,
            dashboard,
            features,
        })
    }

    /// Mount the dashboard and fail unless a session is active afterwards
    async fn require_session(&self) -> Result<()> {
        let had_token = self.store.get(STORAGE_KEY_TOKEN).await?.is_some();
        if self.dashboard.mount().await? == Route::Dashboard {
            return Ok(());
        }
        if had_token {
            anyhow::bail!(
                "Could not reach the task API at {}; you have been logged out. Run `taskdash login` once it is back.",
                self.api.base_url()
            );
        }
        anyhow::bail!("Not logged in. Run `taskdash login` first.")
    }

    async fn palette(&self) -> Palette {
        Palette::new(self.dashboard.snapshot().await.preferences.theme)
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskdash=warn,taskdash_core=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?.with_overrides(cli.api_url, cli.data_dir);
    tracing::debug!("Using API at {} ({} variant)", config.api_url, config.variant);

    let assume_yes = matches!(cli.command, Commands::Delete { yes: true, .. });
    let app = App::new(&config, assume_yes).await?;

    match cli.command {
        Commands::Login { username } => login(&app, username).await,
        Commands::Register { username, email } => register(&app, username, email).await,
        Commands::Logout => {
            app.dashboard.logout().await?;
            println!("Logged out.");
            Ok(ExitCode::SUCCESS)
        }
        Commands::Whoami => whoami(&app).await,
        Commands::List {
            status,
            query,
            view,
        } => list(&app, status, query, view).await,
        Commands::Add {
            title,
            description,
            priority,
        } => add(&app, title, description, priority).await,
        Commands::Toggle { id } => toggle(&app, id).await,
        Commands::Delete { id, .. } => delete(&app, id).await,
        Commands::Stats => stats(&app).await,
        Commands::Theme { choice } => theme(&app, choice).await,
        Commands::View { mode } => view(&app, mode).await,
    }
}

fn prompt_text(label: &str) -> Result<String> {
    Ok(Input::with_theme(&ColorfulTheme::default())
        .with_prompt(label)
        .interact_text()?)
}

async fn login(app: &App, username: Option<String>) -> Result<ExitCode> {
    let username = match username {
        Some(username) => username,
        None => prompt_text("Username")?,
    };
    let password = Password::with_theme(&ColorfulTheme::default())
        .with_prompt("Password")
        .interact()?;

    let response = app
        .api
        .login(&username, &password)
        .await
        .context("Login failed")?;
    let route = app.dashboard.begin_session(response.into_session()).await?;
    if route != Route::Dashboard {
        anyhow::bail!("Logged in, but the task API could not be reached");
    }

    let state = app.dashboard.snapshot().await;
    let palette = app.palette().await;
    println!("{}", render::render_header(&state, &palette));
    println!("{} task(s) loaded.", state.tasks.len());
    Ok(ExitCode::SUCCESS)
}

async fn register(
    app: &App,
    username: Option<String>,
    email: Option<String>,
) -> Result<ExitCode> {
    let username = match username {
        Some(username) => username,
        None => prompt_text("Username")?,
    };
    let email = match email {
        Some(email) => email,
        None => prompt_text("Email")?,
    };
    let password = Password::with_theme(&ColorfulTheme::default())
        .with_prompt("Password")
        .with_confirmation("Repeat password", "Passwords do not match")
        .interact()?;

    let user = app
        .api
        .register(&username, &email, &password)
        .await
        .context("Registration failed")?;
    println!(
        "{} Account created for {}. Run `taskdash login` to start.",
        style("✓").green(),
        user.username
    );
    Ok(ExitCode::SUCCESS)
}

async fn whoami(app: &App) -> Result<ExitCode> {
    match Session::load(app.store.as_ref()).await? {
        Some(session) => {
            let name = session
                .user
                .as_ref()
                .map(|user| user.username.clone())
                .unwrap_or_else(|| "(unknown user)".to_string());
            println!("{}", name);
            Ok(ExitCode::SUCCESS)
        }
        None => {
            println!("Not logged in.");
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn list(
    app: &App,
    status: Option<StatusFilter>,
    query: Option<String>,
    view: Option<ViewMode>,
) -> Result<ExitCode> {
    app.require_session().await?;
    if let Some(status) = status {
        app.dashboard.set_status_filter(status).await;
    }
    if let Some(query) = query {
        app.dashboard.set_query(query).await;
    }

    let mut state = app.dashboard.snapshot().await;
    if let Some(view) = view {
        if app.features.view_modes {
            state.preferences.view_mode = view;
        }
    }

    let palette = app.palette().await;
    println!("{}", render::render_header(&state, &palette));
    println!();
    println!("{}", render::render_tasks(&state, &palette));
    println!();
    println!(
        "{}",
        render::render_stats(&state.metrics(), &app.features, &palette)
    );
    Ok(ExitCode::SUCCESS)
}

fn outcome_code(outcome: MutationOutcome) -> ExitCode {
    match outcome {
        MutationOutcome::Applied | MutationOutcome::Cancelled => ExitCode::SUCCESS,
        MutationOutcome::Skipped | MutationOutcome::Failed => ExitCode::FAILURE,
    }
}

async fn add(
    app: &App,
    title: String,
    description: Option<String>,
    priority: Option<TaskPriority>,
) -> Result<ExitCode> {
    app.require_session().await?;

    let mut draft = app.features.blank_draft();
    draft.title = title;
    draft.description = description.unwrap_or_default();
    if priority.is_some() {
        draft.priority = priority;
    }

    app.dashboard.open_create_dialog().await;
    app.dashboard.set_draft(draft.clone()).await;
    let outcome = app.dashboard.create_task().await?;
    if outcome == MutationOutcome::Applied {
        let total = app.dashboard.snapshot().await.tasks.len();
        println!(
            "{} Added \"{}\" ({} task(s) total)",
            style("✓").green(),
            draft.title,
            total
        );
    }
    Ok(outcome_code(outcome))
}

async fn toggle(app: &App, id: TaskId) -> Result<ExitCode> {
    app.require_session().await?;
    let was_completed = match app.dashboard.snapshot().await.task(id) {
        Some(task) => task.completed,
        None => anyhow::bail!("No task with id {}", id),
    };

    let outcome = app.dashboard.toggle_completion(id).await?;
    if outcome == MutationOutcome::Applied && was_completed {
        println!("Task #{} is pending again.", id);
    }
    Ok(outcome_code(outcome))
}

async fn delete(app: &App, id: TaskId) -> Result<ExitCode> {
    app.require_session().await?;
    let outcome = app.dashboard.delete_task(id).await?;
    match outcome {
        MutationOutcome::Applied => println!("{} Deleted task #{}", style("✓").green(), id),
        MutationOutcome::Cancelled => println!("Cancelled."),
        _ => {}
    }
    Ok(outcome_code(outcome))
}

async fn stats(app: &App) -> Result<ExitCode> {
    app.require_session().await?;
    let metrics = app.dashboard.metrics().await;
    println!(
        "{}",
        render::render_stats(&metrics, &app.features, &app.palette().await)
    );
    Ok(ExitCode::SUCCESS)
}

async fn theme(app: &App, choice: Option<ThemeChoice>) -> Result<ExitCode> {
    let current = app.dashboard.restore_preferences().await?.theme;
    let Some(choice) = choice else {
        println!("{}", current);
        return Ok(ExitCode::SUCCESS);
    };
    if !app.features.theming {
        anyhow::bail!("Theming is not available in this variant");
    }

    let theme = match choice {
        ThemeChoice::Toggle => app.dashboard.toggle_theme().await?,
        ThemeChoice::Light => app.dashboard.set_theme(Theme::Light).await?,
        ThemeChoice::Dark => app.dashboard.set_theme(Theme::Dark).await?,
    };
    println!("Theme set to {}", theme);
    Ok(ExitCode::SUCCESS)
}

async fn view(app: &App, mode: Option<ViewMode>) -> Result<ExitCode> {
    let current = app.dashboard.restore_preferences().await?.view_mode;
    let Some(mode) = mode else {
        println!("{}", current);
        return Ok(ExitCode::SUCCESS);
    };
    if !app.features.view_modes {
        anyhow::bail!("View modes are not available in this variant");
    }

    let mode = app.dashboard.set_view_mode(mode).await?;
    println!("View set to {}", mode);
    Ok(ExitCode::SUCCESS)
}
