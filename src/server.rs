//! HTTP control surface: start/stop the scheduler, report counters, list
//! persisted insights. Everything interesting happens in the background
//! worker; these handlers only toggle and observe it.

use crate::scheduler::Scheduler;
use crate::state::{CounterSnapshot, RunCounters};
use crate::storage::{ArtifactKind, ArtifactStore};
use crate::types::{InsightSummary, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{error, info};

pub struct AppState {
    pub scheduler: Arc<Scheduler>,
    pub counters: Arc<RunCounters>,
    pub store: Arc<dyn ArtifactStore>,
    pub is_running: Arc<RwLock<bool>>,
    pub started_at: RwLock<Option<DateTime<Utc>>>,
    pub worker: Mutex<Option<JoinHandle<()>>>,
}

impl AppState {
    pub fn new(
        scheduler: Arc<Scheduler>,
        counters: Arc<RunCounters>,
        store: Arc<dyn ArtifactStore>,
    ) -> Self {
        let is_running = scheduler.running_flag();
        Self {
            scheduler,
            counters,
            store,
            is_running,
            started_at: RwLock::new(None),
            worker: Mutex::new(None),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub is_running: bool,
    #[serde(flatten)]
    pub counters: CounterSnapshot,
    pub uptime_seconds: f64,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/start", post(start_processing))
        .route("/stop", post(stop_processing))
        .route("/status", get(get_status))
        .route("/insights", get(list_insights))
        .route("/health", get(health_check))
        .with_state(state)
}

pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Control surface listening on {}", addr);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn start_processing(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    {
        let mut running = state.is_running.write().await;
        if *running {
            return (
                StatusCode::CONFLICT,
                Json(json!({ "detail": "Processing is already running" })),
            );
        }
        *running = true;
    }
    *state.started_at.write().await = Some(Utc::now());

    let scheduler = state.scheduler.clone();
    let handle = tokio::spawn(async move { scheduler.run().await });
    *state.worker.lock().await = Some(handle);

    info!("Processing started");
    (
        StatusCode::OK,
        Json(json!({ "message": "Processing started successfully" })),
    )
}

async fn stop_processing(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    {
        let mut running = state.is_running.write().await;
        if !*running {
            return (
                StatusCode::CONFLICT,
                Json(json!({ "detail": "Processing is not running" })),
            );
        }
        *running = false;
    }

    // In-flight work is abandoned best-effort; the loop itself exits at the
    // next between-batch flag check.
    if let Some(handle) = state.worker.lock().await.take() {
        handle.abort();
    }

    info!("Processing stopped");
    (
        StatusCode::OK,
        Json(json!({ "message": "Processing stopped successfully" })),
    )
}

async fn get_status(State(state): State<Arc<AppState>>) -> Json<SystemStatus> {
    let is_running = *state.is_running.read().await;
    let uptime_seconds = state
        .started_at
        .read()
        .await
        .map(|start| (Utc::now() - start).num_milliseconds() as f64 / 1000.0)
        .unwrap_or(0.0);

    Json(SystemStatus {
        is_running,
        counters: state.counters.snapshot(),
        uptime_seconds,
    })
}

async fn list_insights(State(state): State<Arc<AppState>>) -> Json<Vec<InsightSummary>> {
    let names = match state.store.list(ArtifactKind::Insight).await {
        Ok(names) => names,
        Err(e) => {
            error!("Error listing insight artifacts: {}", e);
            return Json(Vec::new());
        }
    };

    let mut summaries = Vec::with_capacity(names.len());
    for name in names {
        match state.store.read(ArtifactKind::Insight, &name).await {
            Ok(value) => summaries.push(summarize_insight(&name, &value)),
            Err(e) => error!("Error reading insight file {}: {}", name, e),
        }
    }
    Json(summaries)
}

fn summarize_insight(filename: &str, value: &Value) -> InsightSummary {
    InsightSummary {
        filename: filename.to_string(),
        user_name: value
            .get("user_name")
            .and_then(Value::as_str)
            .map(str::to_string),
        main_topic: value
            .get("main_topic")
            .and_then(Value::as_str)
            .unwrap_or("Unknown")
            .to_string(),
        created_at: value
            .get("created_at")
            .and_then(Value::as_str)
            .unwrap_or("Unknown")
            .to_string(),
    }
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
