use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::AppError;

/// JSON body extractor that rejects malformed input with 400.
///
/// Syntax and type errors become [`AppError::BadRequest`]; rule violations
/// declared with `#[derive(Validate)]` become [`AppError::ValidationFailed`]
/// carrying the per-field detail list.
///
/// ```ignore
/// async fn create(ValidatedJson(input): ValidatedJson<CreateProject>) -> AppResult<..> { .. }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        value.validate()?;
        Ok(Self(value))
    }
}
