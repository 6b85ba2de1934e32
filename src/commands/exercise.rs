use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use super::json_body;
use crate::error::Result;
use crate::selector::{select_exercise, ExerciseSelection};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseRequest {
    pub blockage_id: Option<String>,
    pub last_technique: Option<String>,
}

/// `POST /exercise`: serves an exercise for the diagnosed blockage.
pub async fn generate_exercise(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ExerciseRequest>, JsonRejection>,
) -> Result<Json<ExerciseSelection>> {
    let request = json_body(payload)?;
    let blockage_id = request.blockage_id.unwrap_or_default();

    let selection = select_exercise(
        &state.catalog,
        &blockage_id,
        request.last_technique.as_deref(),
        &mut rand::thread_rng(),
    )?;

    Ok(Json(selection))
}
