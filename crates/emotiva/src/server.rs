//! Server startup and routing.
//!
//! Opens the database, seeds recommendation content, loads model artifacts
//! and serves the HTTP API. Handlers reach everything through `AppState`.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::Method,
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::{
    api,
    config::Config,
    metrics,
    ml::ModelRegistry,
    shared_state::AppState,
    store::EmotivaDatabase,
};

/// Run the API server until the listener fails.
pub async fn run_server(cfg: Config) -> anyhow::Result<()> {
    crate::telemetry::init_tracing();
    metrics::init_metrics();
    cfg.print_config();

    let database = match EmotivaDatabase::new(&cfg.database_path, cfg.db_pool_size) {
        Ok(db) => {
            info!("Database initialized at: {}", cfg.database_path.display());
            Arc::new(db)
        }
        Err(e) => {
            warn!("Failed to initialize database: {:#}. Falling back to in-memory.", e);
            Arc::new(EmotivaDatabase::new_in_memory()?)
        }
    };

    seed_content(&database, &cfg);

    let models = ModelRegistry::load(&cfg);
    if models.loaded_models().is_empty() {
        warn!("No models loaded, recommendation endpoints will answer 503");
    }

    let addr = cfg.api_addr()?;
    let state = AppState::new(cfg, database, models);

    info!("Starting HTTP server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, build_router(state)).await?;

    Ok(())
}

/// Import the recommendation seed file when one is present. Records already
/// in the database are replaced by id.
fn seed_content(database: &EmotivaDatabase, cfg: &Config) {
    let path = &cfg.content_seed_path;
    if !path.exists() {
        info!("No content seed at {}, skipping import", path.display());
        return;
    }
    if let Err(e) = database.content.import_from_file(path) {
        warn!("Failed to import content seed {}: {}", path.display(), e);
    }
}

/// Build the application router with every endpoint and the shared layers.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);
    let timeout = Duration::from_secs(state.config.request_timeout_seconds);

    Router::new()
        // Accounts
        .route("/user/register", post(api::register))
        .route("/user/signin", post(api::signin))
        .route("/user/update", put(api::update_profile))
        // Journals
        .route("/journals/add", post(api::add_journal))
        .route("/journals/get", post(api::get_journals))
        .route("/journals/update/:id", put(api::update_journal))
        .route("/journals/delete/:id", delete(api::delete_journal))
        // Recommendations
        .route("/recommend/mood", post(api::recommend_mood))
        .route("/recommend/sentiment", post(api::recommend_sentiment))
        .route("/sentiment", post(api::analyze_sentiment))
        // Operations
        .route("/admin/health", get(api::health))
        .route("/admin/stats", get(api::db_stats))
        .route("/metrics", get(metrics::get_metrics))
        .route("/healthz", get(|| async { "OK" }))
        .layer(middleware::from_fn(metrics::track_requests))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(timeout))
        .with_state(state)
}
