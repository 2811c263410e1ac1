// Emotiva/crates/emotiva/src/api/mod.rs
//! API module - HTTP handlers, one file per resource

pub mod admin_api;
pub mod auth_api;
pub mod error;
pub mod extract;
pub mod journal_api;
pub mod recommend_api;

// Re-export API handlers
pub use admin_api::{db_stats, health};
pub use auth_api::{register, signin, update_profile};
pub use error::{ApiError, ErrorResponse, MessageResponse};
pub use extract::ValidatedJson;
pub use journal_api::{add_journal, delete_journal, get_journals, update_journal};
pub use recommend_api::{analyze_sentiment, recommend_mood, recommend_sentiment};
