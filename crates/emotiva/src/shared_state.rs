//! Application state handed to every handler.
//!
//! Everything in here is either immutable after startup (config, models) or
//! internally synchronized (the connection pool), so the state is shared by
//! plain `Arc` clones with no locks.

use std::sync::Arc;
use std::time::Instant;

use crate::{config::Config, ml::ModelRegistry, store::EmotivaDatabase};

#[derive(Clone)]
pub struct AppState {
    pub database: Arc<EmotivaDatabase>,
    pub models: Arc<ModelRegistry>,
    pub config: Arc<Config>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: Config, database: Arc<EmotivaDatabase>, models: ModelRegistry) -> Self {
        Self {
            database,
            models: Arc::new(models),
            config: Arc::new(config),
            started_at: Instant::now(),
        }
    }
}
