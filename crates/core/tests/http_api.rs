//! HTTP client and dashboard flow against an in-process fake task API

use axum::{
    extract::{Path, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use taskdash_core::api::{HttpTaskApi, TaskApi};
use taskdash_core::dashboard::{
    Confirm, Dashboard, DashboardFeatures, MutationOutcome, Notifier, Route, Variant,
};
use taskdash_core::storage::{
    ClientStore, FileClientStore, STORAGE_KEY_THEME, STORAGE_KEY_TOKEN, STORAGE_KEY_USER,
};
use taskdash_core::task::{TaskDraft, TaskPatch, TaskPriority};
use taskdash_core::Error;

const TOKEN: &str = "secret-token";

#[derive(Default)]
struct FakeServer {
    tasks: Vec<Value>,
    next_id: i64,
}

type Shared = Arc<Mutex<FakeServer>>;
type ApiError = (StatusCode, Json<Value>);

fn authorize(headers: &HeaderMap) -> Result<(), ApiError> {
    let expected = format!("Bearer {}", TOKEN);
    match headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        Some(value) if value == expected => Ok(()),
        _ => Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Could not validate credentials"})),
        )),
    }
}

fn not_found() -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"detail": "Task not found"})),
    )
}

async fn login(Json(body): Json<Value>) -> Result<Json<Value>, ApiError> {
    if body["password"] != "hunter2" {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Incorrect username or password"})),
        ));
    }
    let username = body["username"].clone();
    Ok(Json(json!({
        "access_token": TOKEN,
        "token_type": "bearer",
        "user": {
            "id": 1,
            "username": username,
            "email": "ana@example.com",
            "created_at": "2024-01-01T00:00:00"
        }
    })))
}

async fn list_tasks(
    State(server): State<Shared>,
    headers: HeaderMap,
) -> Result<Json<Vec<Value>>, ApiError> {
    authorize(&headers)?;
    Ok(Json(server.lock().unwrap().tasks.clone()))
}

async fn create_task(
    State(server): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    authorize(&headers)?;
    let mut server = server.lock().unwrap();
    server.next_id += 1;
    let id = server.next_id;
    let title = body["title"].clone();
    let description = body.get("description").cloned().unwrap_or(Value::Null);
    let priority = body.get("priority").cloned().unwrap_or(json!("medium"));
    let task = json!({
        "id": id,
        "user_id": 1,
        "title": title,
        "description": description,
        "completed": false,
        "priority": priority,
        "due_date": null,
        "created_at": "2024-03-05T10:15:00.123456",
        "updated_at": "2024-03-05T10:15:00.123456"
    });
    server.tasks.push(task.clone());
    Ok(Json(task))
}

async fn update_task(
    State(server): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    authorize(&headers)?;
    let mut server = server.lock().unwrap();
    let task = server
        .tasks
        .iter_mut()
        .find(|t| t["id"] == id)
        .ok_or_else(not_found)?;
    if let Some(fields) = body.as_object() {
        for (key, value) in fields {
            task[key] = value.clone();
        }
    }
    Ok(Json(task.clone()))
}

async fn delete_task(
    State(server): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    authorize(&headers)?;
    let mut server = server.lock().unwrap();
    let before = server.tasks.len();
    server.tasks.retain(|t| t["id"] != id);
    if server.tasks.len() == before {
        return Err(not_found());
    }
    Ok(Json(json!({"message": "Task deleted"})))
}

async fn spawn_server() -> (String, Shared) {
    let shared: Shared = Arc::new(Mutex::new(FakeServer::default()));
    let app = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/tasks/", get(list_tasks).post(create_task))
        .route("/api/tasks/{id}", put(update_task).delete(delete_task))
        .with_state(shared.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), shared)
}

/// Base URL of a port nobody listens on
async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn alert(&self, _message: &str) {}
}

struct AlwaysYes;

impl Confirm for AlwaysYes {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

fn dashboard(api: HttpTaskApi, store: Arc<FileClientStore>) -> Dashboard {
    Dashboard::new(
        Arc::new(api),
        store,
        Arc::new(SilentNotifier),
        Arc::new(AlwaysYes),
        DashboardFeatures::for_variant(Variant::Priority),
    )
}

#[tokio::test]
async fn test_crud_round_trip() {
    let (url, _server) = spawn_server().await;
    let api = HttpTaskApi::new(url);

    assert!(api.get_tasks(TOKEN).await.unwrap().is_empty());

    let created = api
        .create_task(
            TOKEN,
            &TaskDraft::new("Buy milk").with_priority(TaskPriority::High),
        )
        .await
        .unwrap();
    assert_eq!(created.title, "Buy milk");
    assert_eq!(created.priority, TaskPriority::High);
    assert_eq!(created.description, "");

    let patch = TaskPatch {
        completed: Some(true),
        ..Default::default()
    };
    let updated = api.update_task(TOKEN, created.id, &patch).await.unwrap();
    assert!(updated.completed);

    let tasks = api.get_tasks(TOKEN).await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert!(tasks[0].completed);
    assert_eq!(tasks[0].created_label(), "Mar 5, 2024");

    api.delete_task(TOKEN, created.id).await.unwrap();
    assert!(api.get_tasks(TOKEN).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_api_errors_carry_detail() {
    let (url, _server) = spawn_server().await;
    let api = HttpTaskApi::new(url);

    match api.get_tasks("wrong").await.unwrap_err() {
        Error::Api { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Could not validate credentials");
        }
        e => panic!("Expected Api error, got: {:?}", e),
    }

    let err = api.delete_task(TOKEN, 42).await.unwrap_err();
    assert!(!err.is_connectivity());
    assert_eq!(err.user_message(), "Task not found");
}

#[tokio::test]
async fn test_closed_port_is_connectivity_failure() {
    let api = HttpTaskApi::new(closed_port_url().await);

    let err = api.get_tasks(TOKEN).await.unwrap_err();
    assert!(err.is_connectivity(), "unexpected error: {:?}", err);
}

#[tokio::test]
async fn test_login_then_dashboard_flow() {
    let (url, server) = spawn_server().await;
    let temp = TempDir::new().unwrap();
    let store = Arc::new(
        FileClientStore::new(temp.path().join("client-state.json"))
            .await
            .unwrap(),
    );
    let api = HttpTaskApi::new(url);

    match api.login("ana", "nope").await.unwrap_err() {
        Error::Api { status, .. } => assert_eq!(status, 401),
        e => panic!("Expected Api error, got: {:?}", e),
    }

    let session = api.login("ana", "hunter2").await.unwrap().into_session();
    let dashboard = dashboard(api, store.clone());
    assert_eq!(dashboard.begin_session(session).await.unwrap(), Route::Dashboard);
    assert_eq!(
        dashboard.snapshot().await.greeting().as_deref(),
        Some("Welcome back, ana!")
    );

    server.lock().unwrap().tasks.push(json!({
        "id": 100, "title": "Existing", "description": null,
        "completed": true, "created_at": "2024-01-01T00:00:00"
    }));
    server.lock().unwrap().next_id = 100;
    dashboard.load_tasks().await.unwrap();

    dashboard.set_draft(TaskDraft::new("New")).await;
    assert_eq!(
        dashboard.create_task().await.unwrap(),
        MutationOutcome::Applied
    );

    let state = dashboard.snapshot().await;
    let ids: Vec<i64> = state.tasks.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![100, 101]);
    assert_eq!(state.metrics().completion_rate, 50);

    dashboard.logout().await.unwrap();
    assert!(store.get(STORAGE_KEY_TOKEN).await.unwrap().is_none());
    assert!(store.get(STORAGE_KEY_USER).await.unwrap().is_none());
}

#[tokio::test]
async fn test_unreachable_api_logs_out() {
    let temp = TempDir::new().unwrap();
    let store = Arc::new(
        FileClientStore::new(temp.path().join("client-state.json"))
            .await
            .unwrap(),
    );
    store.set(STORAGE_KEY_TOKEN, TOKEN).await.unwrap();
    store.set(STORAGE_KEY_THEME, "dark").await.unwrap();

    let dashboard = dashboard(HttpTaskApi::new(closed_port_url().await), store.clone());

    assert_eq!(dashboard.mount().await.unwrap(), Route::Unauthenticated);
    assert!(store.get(STORAGE_KEY_TOKEN).await.unwrap().is_none());

    let reopened = FileClientStore::new(store.path().clone()).await.unwrap();
    assert!(reopened.get(STORAGE_KEY_TOKEN).await.unwrap().is_none());
    assert!(reopened.get(STORAGE_KEY_THEME).await.unwrap().is_none());
}
