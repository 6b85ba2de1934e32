use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use super::json_body;
use crate::archive::{build_archive, ExportFile};
use crate::error::{AppError, Result};
use crate::util::slugify;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    #[serde(default)]
    pub project_name: String,
    #[serde(default)]
    pub files: Vec<ExportFile>,
}

/// `POST /export`: bundles project assets into a zip download.
pub async fn export_project(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ExportRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let request = json_body(payload)?;
    let max_files = state.export.max_files;
    let filename = format!("{}.zip", slugify(&request.project_name));

    // Compression is CPU-bound, keep it off the async workers.
    let bytes = tokio::task::spawn_blocking(move || {
        build_archive(&request.project_name, &request.files, max_files)
    })
    .await
    .map_err(|e| AppError::Custom(e.to_string()))??;

    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    ))
}
