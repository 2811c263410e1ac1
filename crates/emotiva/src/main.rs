// Emotiva/crates/emotiva/src/main.rs

#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use dotenvy::dotenv;
#[cfg(feature = "cli")]
use emotiva::{config::Config, run_server};

/// Mood-journaling API server. Flags override the environment.
#[cfg(feature = "cli")]
#[derive(Debug, Parser)]
#[command(name = "emotiva", version, about)]
struct Cli {
    /// Address to bind (API_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (API_PORT)
    #[arg(long)]
    port: Option<u16>,

    /// SQLite database file (DATABASE_PATH)
    #[arg(long)]
    database: Option<std::path::PathBuf>,
}

#[cfg(feature = "cli")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let cli = Cli::parse();

    let mut cfg = Config::from_env()?;
    if let Some(host) = cli.host {
        cfg.api_host = host;
    }
    if let Some(port) = cli.port {
        cfg.api_port = port;
    }
    if let Some(database) = cli.database {
        cfg.database_path = database;
    }

    run_server(cfg).await
}

#[cfg(not(feature = "cli"))]
fn main() {
    println!("CLI feature not enabled. Enable with --features cli");
}
