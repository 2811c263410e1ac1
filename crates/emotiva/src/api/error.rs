//! Error body shared by every handler: `{"message": "..."}`.

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::ValidationErrors;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}

/// Plain acknowledgement body, same shape as [`ErrorResponse`].
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self { message: message.into() })
    }
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(ErrorResponse { message: message.into() }))
}

/// One sentence per failed field, ordered by field name.
pub fn validation_message(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |err| match err.code.as_ref() {
                "required" => format!("{} is required", field),
                "email" => format!("{} is not a valid email address", field),
                "length" => format!("{} cannot be empty", field),
                other => format!("{} failed {} validation", field, other),
            })
        })
        .collect();
    messages.sort();
    messages.join("; ")
}
