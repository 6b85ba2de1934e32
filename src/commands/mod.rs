pub mod catalog;
pub mod diagnose;
pub mod exercise;
pub mod export;
pub mod ideas;

use axum::extract::rejection::JsonRejection;
use axum::Json;

use crate::error::AppError;

/// Unwraps a JSON body, reporting malformed payloads as `{ error }` like every other failure.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::InvalidInput(rejection.body_text()))
}
