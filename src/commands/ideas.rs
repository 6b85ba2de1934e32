use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::json_body;
use crate::error::Result;
use crate::selector::SelectError;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdeasRequest {
    #[serde(default)]
    pub prompt: String,
    pub blockage_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct IdeasResponse {
    pub ideas: String,
}

/// `POST /ideas`: open-ended idea generation through the configured model.
pub async fn generate_ideas(
    State(state): State<AppState>,
    payload: std::result::Result<Json<IdeasRequest>, JsonRejection>,
) -> Result<Json<IdeasResponse>> {
    let request = json_body(payload)?;

    let blockage = match request.blockage_id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => Some(
            state
                .catalog
                .blockage(id)
                .ok_or_else(|| SelectError::BlockageNotFound(id.to_string()))?,
        ),
        _ => None,
    };

    let ideas = state.ideas.generate(&request.prompt, blockage).await?;
    Ok(Json(IdeasResponse { ideas }))
}
