// Emotiva/crates/emotiva/src/telemetry.rs

use tracing_subscriber::{fmt, EnvFilter};

/// Used when `RUST_LOG` is unset. `TraceLayer` reports request spans at
/// debug level, so that target is raised explicitly.
const DEFAULT_FILTER: &str = "info,tower_http=debug";

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_target(true)
        .with_level(true)
        .compact()
        .finish();

    // A second call keeps the first subscriber.
    let _ = tracing::subscriber::set_global_default(subscriber);
}
