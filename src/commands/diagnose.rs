use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use super::json_body;
use crate::diagnosis::{diagnose, Diagnosis};
use crate::error::{AppError, Result};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct DiagnoseRequest {
    #[serde(default)]
    pub message: String,
}

/// `POST /diagnose`: maps a free-text message to a blockage.
pub async fn diagnose_message(
    State(state): State<AppState>,
    payload: std::result::Result<Json<DiagnoseRequest>, JsonRejection>,
) -> Result<Json<Diagnosis>> {
    let request = json_body(payload)?;
    if request.message.trim().is_empty() {
        return Err(AppError::InvalidInput("message is required".into()));
    }

    diagnose(&state.catalog, &request.message)
        .map(Json)
        .ok_or_else(|| AppError::NotFound("no blockage matched".into()))
}
