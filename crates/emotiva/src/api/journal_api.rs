//! API endpoints for journal entries

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{error, info};
use validator::Validate;

use super::error::{api_error, ApiError, MessageResponse};
use super::extract::ValidatedJson;
use crate::shared_state::AppState;
use crate::store::{JournalEntry, NewJournal};

/// A key that is present counts, even when its value is `null`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// All four keys must be present. Apart from the owner email, values are
/// stored with whatever JSON type they arrive in.
#[derive(Debug, Deserialize, Validate)]
pub struct AddJournalRequest {
    #[validate(required)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "present")]
    #[validate(required)]
    pub title: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    #[validate(required)]
    pub content: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    #[validate(required)]
    pub timestamp: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddJournalResponse {
    pub message: String,
    pub id: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct GetJournalsRequest {
    #[validate(required)]
    pub email: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JournalsResponse {
    pub journals: Vec<JournalEntry>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateJournalRequest {
    #[serde(default, deserialize_with = "present")]
    #[validate(required)]
    pub title: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    #[validate(required)]
    pub content: Option<Value>,
}

/// POST /journals/add
pub async fn add_journal(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<AddJournalRequest>,
) -> Result<(StatusCode, Json<AddJournalResponse>), ApiError> {
    let journal = NewJournal {
        email: req.email.unwrap_or_default(),
        title: req.title.unwrap_or_default(),
        content: req.content.unwrap_or_default(),
        timestamp: req.timestamp.unwrap_or_default(),
    };
    info!("Adding journal for {}", journal.email);

    match state.database.journals.insert(&journal) {
        Ok(id) => Ok((
            StatusCode::CREATED,
            Json(AddJournalResponse {
                message: "Journal added successfully".to_string(),
                id,
            }),
        )),
        Err(e) => {
            error!("Failed to add journal for {}: {}", journal.email, e);
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {}", e)))
        }
    }
}

/// POST /journals/get
pub async fn get_journals(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<GetJournalsRequest>,
) -> Result<Json<JournalsResponse>, ApiError> {
    let email = req.email.unwrap_or_default();

    match state.database.journals.list_for_email(&email) {
        Ok(journals) => {
            info!("Found {} journals for {}", journals.len(), email);
            Ok(Json(JournalsResponse { journals }))
        }
        Err(e) => {
            error!("Failed to fetch journals for {}: {}", email, e);
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {}", e)))
        }
    }
}

/// PUT /journals/update/:id
pub async fn update_journal(
    State(state): State<AppState>,
    Path(journal_id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateJournalRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    info!("Updating journal: {}", journal_id);
    let title = req.title.unwrap_or_default();
    let content = req.content.unwrap_or_default();

    match state.database.journals.update(&journal_id, &title, &content) {
        Ok(true) => Ok(MessageResponse::new("Journal updated successfully")),
        Ok(false) => {
            info!("Journal not found for update: {}", journal_id);
            Err(api_error(StatusCode::NOT_FOUND, "Journal not found"))
        }
        Err(e) => {
            error!("Failed to update journal {}: {}", journal_id, e);
            Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error updating journal: {}", e),
            ))
        }
    }
}

/// DELETE /journals/delete/:id
pub async fn delete_journal(
    State(state): State<AppState>,
    Path(journal_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    info!("Deleting journal: {}", journal_id);

    match state.database.journals.delete(&journal_id) {
        Ok(true) => Ok(MessageResponse::new("Journal deleted successfully")),
        Ok(false) => {
            info!("Journal not found for deletion: {}", journal_id);
            Err(api_error(StatusCode::NOT_FOUND, "Journal not found"))
        }
        Err(e) => {
            error!("Failed to delete journal {}: {}", journal_id, e);
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {}", e)))
        }
    }
}
