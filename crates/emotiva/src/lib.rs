// Emotiva/crates/emotiva/src/lib.rs

pub mod api;
pub mod auth;
pub mod config;
pub mod metrics;
pub mod ml;
pub mod recommend;
pub mod server;
pub mod shared_state;
pub mod store;
pub mod telemetry;

// Public API exports
pub use config::Config;
pub use server::{build_router, run_server};
pub use shared_state::AppState;
pub use store::EmotivaDatabase;
pub use ml::ModelRegistry;
