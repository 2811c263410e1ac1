
//! Database schema definitions for users, journals and recommendation records
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

/// A registered account. `password` holds the PHC-format hash, never plaintext.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted by a profile edit. `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub password_hash: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.password_hash.is_none()
    }
}

/// Title, content and timestamp are kept as the client sent them, whatever
/// their JSON type, and stored as JSON text.
#[derive(Debug, Clone)]
pub struct NewJournal {
    pub email: String,
    pub title: serde_json::Value,
    pub content: serde_json::Value,
    pub timestamp: serde_json::Value,
}

/// Projection returned to clients when listing an owner's entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: serde_json::Value,
    pub content: serde_json::Value,
    pub timestamp: serde_json::Value,
}

/// A content block as authored. The `type` tag decides how it is reshaped;
/// the remaining keys are kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRecord {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub blocks: Vec<StoredBlock>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatabaseStats {
    pub total_users: i64,
    pub total_journals: i64,
    pub total_recommendations: i64,
    pub database_size_bytes: i64,
}
