//! JSON body extractor that also runs `validator` rules, so handlers only see
//! requests whose required fields are present.

use axum::async_trait;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::Json;
use serde::de::DeserializeOwned;
use validator::Validate;

use super::error::{api_error, validation_message, ApiError};

pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| api_error(rejection.status(), rejection.body_text()))?;

        value
            .validate()
            .map_err(|errors| api_error(StatusCode::BAD_REQUEST, validation_message(&errors)))?;

        Ok(ValidatedJson(value))
    }
}
