//! Account endpoints: registration, sign-in and profile edit.
//!
//! Sign-in answers every failure with the same 401 so callers cannot tell a
//! missing account from a wrong password.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use validator::Validate;

use super::error::{api_error, ApiError, MessageResponse};
use super::extract::ValidatedJson;
use crate::auth::{hash_password, verify_password};
use crate::shared_state::AppState;
use crate::store::{ProfileUpdate, StoreError};

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(required)]
    pub name: Option<String>,
    #[validate(required, email)]
    pub email: Option<String>,
    #[validate(required)]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SigninRequest {
    #[validate(required)]
    pub email: Option<String>,
    #[validate(required)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SigninResponse {
    pub message: String,
    pub user: String,
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(required)]
    pub email: Option<String>,
    #[validate(length(min = 1))]
    pub name: Option<String>,
    #[validate(length(min = 1))]
    pub password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub message: String,
    pub name: String,
    pub email: String,
}

fn invalid_credentials() -> ApiError {
    api_error(StatusCode::UNAUTHORIZED, "Invalid credentials")
}

/// Argon2 is CPU-bound for tens of milliseconds, so it runs on the blocking
/// pool instead of a runtime worker.
async fn off_runtime<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work).await.map_err(|e| {
        error!("Password task failed: {}", e);
        api_error(StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {}", e))
    })
}

/// POST /user/register
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let name = req.name.unwrap_or_default();
    let email = req.email.unwrap_or_default();
    let password = req.password.unwrap_or_default();
    info!("Registration request for {}", email);

    let users = &state.database.users;
    match users.find_by_email(&email) {
        Ok(Some(_)) => {
            info!("Registration rejected, {} already exists", email);
            return Err(api_error(StatusCode::BAD_REQUEST, "User already exists"));
        }
        Ok(None) => {}
        Err(e) => {
            error!("Failed to look up {}: {}", email, e);
            return Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {}", e)));
        }
    }

    let password_hash = off_runtime(move || hash_password(&password))
        .await?
        .map_err(|e| {
            error!("Failed to hash password: {}", e);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {}", e))
        })?;

    match users.create_user(&name, &email, &password_hash) {
        Ok(_) => Ok((StatusCode::CREATED, MessageResponse::new("User registered successfully"))),
        // Lost a race with a concurrent registration of the same email.
        Err(StoreError::DuplicateEmail) => Err(api_error(StatusCode::BAD_REQUEST, "User already exists")),
        Err(e) => {
            error!("Failed to create user {}: {}", email, e);
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {}", e)))
        }
    }
}

/// POST /user/signin
pub async fn signin(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<SigninRequest>,
) -> Result<Json<SigninResponse>, ApiError> {
    let email = req.email.unwrap_or_default();
    let password = req.password.unwrap_or_default();
    info!("Sign-in attempt for {}", email);

    let user = match state.database.users.find_by_email(&email) {
        Ok(Some(user)) => user,
        Ok(None) => return Err(invalid_credentials()),
        Err(e) => {
            error!("Failed to look up {}: {}", email, e);
            return Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {}", e)));
        }
    };

    let stored_hash = user.password.clone();
    match off_runtime(move || verify_password(&password, &stored_hash)).await? {
        Ok(true) => {
            info!("Sign-in succeeded for {}", email);
            Ok(Json(SigninResponse {
                message: "Login successful".to_string(),
                user: user.name,
                email: user.email,
            }))
        }
        Ok(false) => Err(invalid_credentials()),
        Err(e) => {
            warn!("Stored hash for {} is unreadable: {}", email, e);
            Err(invalid_credentials())
        }
    }
}

/// PUT /user/update
pub async fn update_profile(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let email = req.email.unwrap_or_default();
    info!("Profile update for {}", email);

    let password_hash = match req.password {
        Some(password) => Some(off_runtime(move || hash_password(&password)).await?.map_err(|e| {
            error!("Failed to hash password: {}", e);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {}", e))
        })?),
        None => None,
    };
    let update = ProfileUpdate { name: req.name, password_hash };
    if update.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "No profile fields to update"));
    }

    match state.database.users.update_profile(&email, &update) {
        Ok(Some(user)) => Ok(Json(ProfileResponse {
            message: "Profile updated successfully".to_string(),
            name: user.name,
            email: user.email,
        })),
        Ok(None) => Err(api_error(StatusCode::NOT_FOUND, "User not found")),
        Err(e) => {
            error!("Failed to update profile for {}: {}", email, e);
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {}", e)))
        }
    }
}
