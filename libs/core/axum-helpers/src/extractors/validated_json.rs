//! JSON extractor with automatic validation using the validator crate.

use crate::errors::AppError;
use axum::{
    extract::{FromRequest, Json, Request},
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use validator::Validate;

/// Deserializes the body as JSON, then runs `Validate`.
///
/// Malformed JSON is rejected through [`AppError::JsonExtractorRejection`],
/// constraint violations through [`AppError::ValidationError`] with a
/// per-field `details` map.
///
/// ```ignore
/// async fn create(ValidatedJson(payload): ValidatedJson<ProductPayload>) -> StatusCode {
///     StatusCode::CREATED
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::from(e).into_response())?;

        data.validate()
            .map_err(|e| AppError::from(e).into_response())?;

        Ok(ValidatedJson(data))
    }
}
