// Emotiva/crates/emotiva/src/config.rs

use anyhow::{Context, Result};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_host: String,
    pub api_port: u16,
    pub database_path: PathBuf,
    pub db_pool_size: u32,
    pub encoders_path: PathBuf,
    pub mood_model_path: PathBuf,
    pub sentiment_model_path: PathBuf,
    pub content_seed_path: PathBuf,
    pub request_timeout_seconds: u64,
}

impl Config {
    /// Read the configuration from the process environment.
    ///
    /// Loading a `.env` file is left to the binary so tests and embedders
    /// control the environment themselves.
    pub fn from_env() -> Result<Self> {
        let api_port = env::var("API_PORT")
            .unwrap_or_else(|_| "8000".into())
            .parse()
            .context("API_PORT must be a port number")?;

        let db_pool_size = env::var("DB_POOL_SIZE")
            .unwrap_or_else(|_| "10".into())
            .parse()
            .context("DB_POOL_SIZE must be a positive integer")?;

        let request_timeout_seconds = env::var("REQUEST_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .context("REQUEST_TIMEOUT_SECONDS must be a number of seconds")?;

        let cfg = Self {
            api_host: env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".into()),
            api_port,
            database_path: path_var("DATABASE_PATH", "./data/emotiva.db"),
            db_pool_size,
            encoders_path: path_var("ENCODERS_PATH", "./models/encoders.json"),
            mood_model_path: path_var("MOOD_MODEL_PATH", "./models/mood_classifier.json"),
            sentiment_model_path: path_var(
                "SENTIMENT_MODEL_PATH",
                "./models/sentiment_classifier.json",
            ),
            content_seed_path: path_var("CONTENT_SEED_PATH", "./data/recommendations.json"),
            request_timeout_seconds,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        if self.db_pool_size == 0 {
            anyhow::bail!("DB_POOL_SIZE must be at least 1");
        }
        if self.request_timeout_seconds == 0 {
            anyhow::bail!("REQUEST_TIMEOUT_SECONDS must be at least 1");
        }
        self.api_addr()?;
        Ok(())
    }

    pub fn print_config(&self) {
        info!("Current Configuration:");
        info!("- API: {}:{}", self.api_host, self.api_port);
        info!("- Database: {} (pool size {})", self.database_path.display(), self.db_pool_size);
        info!("- Encoders: {}", self.encoders_path.display());
        info!("- Mood Model: {}", self.mood_model_path.display());
        info!("- Sentiment Model: {}", self.sentiment_model_path.display());
        info!("- Content Seed: {}", self.content_seed_path.display());
        info!("- Request Timeout: {}s", self.request_timeout_seconds);
    }

    pub fn api_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.api_host, self.api_port)
            .parse()
            .with_context(|| format!("Invalid API address {}:{}", self.api_host, self.api_port))
    }
}

fn path_var(key: &str, default: &str) -> PathBuf {
    PathBuf::from(env::var(key).unwrap_or_else(|_| default.into()))
}
