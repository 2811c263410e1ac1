//! Recommendation endpoints.
//!
//! `/recommend/mood` runs the tabular pipeline (encode, predict, decode,
//! fetch, reshape). `/recommend/sentiment` and `/sentiment` classify free
//! text and branch to one of two fixed suggestions.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info};
use validator::Validate;

use super::error::{api_error, ApiError};
use super::extract::ValidatedJson;
use crate::ml::{LabelScore, MoodInput};
use crate::recommend::{reshape, suggestion_for, ContentBlock, Suggestion};
use crate::shared_state::AppState;

/// Attribute values may arrive as strings or numbers (ordinal scales); both
/// are reduced to the label text the encoders were fitted on.
#[derive(Debug, Deserialize, Validate)]
pub struct MoodRequest {
    #[validate(required)]
    pub mood: Option<Value>,
    #[validate(required)]
    pub intensity: Option<Value>,
    #[serde(rename = "socialInteraction")]
    #[validate(required)]
    pub social_interaction: Option<Value>,
    #[validate(required)]
    pub productivity: Option<Value>,
    #[validate(required)]
    pub overwhelmed: Option<Value>,
}

impl MoodRequest {
    fn into_input(self) -> MoodInput {
        MoodInput {
            mood: label_of(self.mood),
            intensity: label_of(self.intensity),
            social_interaction: label_of(self.social_interaction),
            productivity: label_of(self.productivity),
            overwhelmed: label_of(self.overwhelmed),
        }
    }
}

fn label_of(value: Option<Value>) -> String {
    match value {
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

#[derive(Debug, Serialize)]
pub struct MoodRecommendationResponse {
    pub emotion: String,
    pub title: Option<String>,
    pub content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SentimentRequest {
    #[validate(required)]
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SentimentRecommendationResponse {
    pub sentiment: String,
    pub score: f32,
    pub recommendation: Suggestion,
}

#[derive(Debug, Serialize)]
pub struct SentimentResponse {
    pub sentiment: String,
    pub recommendation: String,
}

/// POST /recommend/mood
pub async fn recommend_mood(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<MoodRequest>,
) -> Result<Json<MoodRecommendationResponse>, ApiError> {
    let Some(model) = state.models.mood.clone() else {
        error!("Mood recommender not loaded");
        return Err(api_error(StatusCode::SERVICE_UNAVAILABLE, "Mood recommender not available"));
    };

    let input = req.into_input();
    info!("Mood recommendation request: {:?}", input);

    let key = model.content_key(&input).map_err(|e| {
        error!("Mood prediction failed: {}", e);
        api_error(StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {}", e))
    })?;

    match state.database.content.get(&key) {
        Ok(Some(record)) => {
            let content = reshape(&record);
            info!("Recommending '{}' with {} blocks", key, content.len());
            Ok(Json(MoodRecommendationResponse {
                emotion: record.id,
                title: record.title,
                content,
            }))
        }
        Ok(None) => {
            info!("No recommendation record for '{}'", key);
            Err(api_error(StatusCode::NOT_FOUND, "Recommendation not found"))
        }
        Err(e) => {
            error!("Failed to fetch recommendation '{}': {}", key, e);
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {}", e)))
        }
    }
}

fn classify_text(state: &AppState, text: Option<String>) -> Result<LabelScore, ApiError> {
    let text = text.unwrap_or_default();
    if text.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Text cannot be empty"));
    }

    let Some(classifier) = state.models.sentiment.as_ref() else {
        error!("Sentiment classifier not loaded");
        return Err(api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "Sentiment classifier not available",
        ));
    };

    info!("Classifying text ({} chars)", text.chars().count());
    let top = classifier.top_label(&text).map_err(|e| {
        error!("Sentiment classification failed: {}", e);
        api_error(StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {}", e))
    })?;
    info!("Sentiment: {} ({:.3})", top.label, top.score);
    Ok(top)
}

/// POST /recommend/sentiment
pub async fn recommend_sentiment(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<SentimentRequest>,
) -> Result<Json<SentimentRecommendationResponse>, ApiError> {
    let top = classify_text(&state, req.text)?;
    let recommendation = suggestion_for(&top.label);

    Ok(Json(SentimentRecommendationResponse {
        sentiment: top.label,
        score: top.score,
        recommendation,
    }))
}

/// POST /sentiment
pub async fn analyze_sentiment(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<SentimentRequest>,
) -> Result<Json<SentimentResponse>, ApiError> {
    let top = classify_text(&state, req.text)?;
    let recommendation = suggestion_for(&top.label).title.to_string();

    Ok(Json(SentimentResponse {
        sentiment: top.label,
        recommendation,
    }))
}
