use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::database::{DatabaseError, DatabaseManager, EntryRepository, HabitRepository, MemoryStore, PgStore};
use crate::handlers;
use crate::middleware::jwt_auth_middleware;

/// Shared handler state: configuration plus the two repositories.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub habits: Arc<dyn HabitRepository>,
    pub entries: Arc<dyn EntryRepository>,
}

impl AppState {
    pub fn new(config: AppConfig, habits: Arc<dyn HabitRepository>, entries: Arc<dyn EntryRepository>) -> Self {
        Self {
            config: Arc::new(config),
            habits,
            entries,
        }
    }

    /// Both repositories backed by one process-local store.
    pub fn in_memory(config: AppConfig) -> Self {
        let store = MemoryStore::new();
        Self::new(config, Arc::new(store.clone()), Arc::new(store))
    }

    /// PostgreSQL when `DATABASE_URL` is configured, otherwise in-memory.
    pub async fn from_config(config: AppConfig) -> Result<Self, DatabaseError> {
        if config.database.url.is_none() {
            tracing::warn!("DATABASE_URL not set; using in-memory store, data is lost on exit");
            return Ok(Self::in_memory(config));
        }

        let pool = DatabaseManager::connect(&config.database).await?;
        let store = PgStore::new(pool, config.database.enable_query_logging);
        Ok(Self::new(config, Arc::new(store.clone()), Arc::new(store)))
    }
}

pub fn app(state: AppState) -> Router {
    let config = state.config.clone();

    let mut router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Protected API
        .merge(protected_routes(state.clone()))
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes));

    if config.security.enable_cors {
        router = router.layer(cors_layer(&config.security.cors_origins));
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(habit_routes())
        .merge(entry_routes())
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

fn habit_routes() -> Router<AppState> {
    use handlers::habits;

    Router::new()
        .route("/habits", get(habits::habit_list).post(habits::habit_create))
        .route(
            "/habits/:id",
            get(habits::habit_get)
                .put(habits::habit_put)
                .patch(habits::habit_patch)
                .delete(habits::habit_delete),
        )
        // Archive state actions
        .route("/habits/:id/archive", post(habits::habit_archive))
        .route("/habits/:id/unarchive", post(habits::habit_unarchive))
}

fn entry_routes() -> Router<AppState> {
    use handlers::entries;

    Router::new()
        .route("/entries", get(entries::entry_list).post(entries::entry_create))
        .route(
            "/entries/:id",
            get(entries::entry_get)
                .put(entries::entry_put)
                .patch(entries::entry_patch)
                .delete(entries::entry_delete),
        )
}

/// `*` or an empty origin list allows any origin.
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", o);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Habit API (Rust)",
            "version": version,
            "description": "Habit tracking REST API built with Rust (Axum)",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "habits": "/habits[/:id] (protected)",
                "archive": "/habits/:id/archive, /habits/:id/unarchive (protected)",
                "entries": "/entries[/:id] (protected)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.habits.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                        "database": "unavailable"
                    }
                })),
            )
        }
    }
}
