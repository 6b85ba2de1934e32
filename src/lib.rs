use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

pub mod archive;
pub mod catalog;
mod commands;
pub mod config;
pub mod diagnosis;
pub mod error;
pub mod ideas;
pub mod selector;
pub mod util;

use catalog::Catalog;
use config::{AppConfig, ExportConfig};
use ideas::IdeaClient;

/// Shared, read-only state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub ideas: IdeaClient,
    pub export: ExportConfig,
}

impl AppState {
    pub fn new(config: &AppConfig, catalog: Catalog) -> error::Result<Self> {
        Ok(Self {
            catalog: Arc::new(catalog),
            ideas: IdeaClient::new(config.llm.clone())?,
            export: config.export.clone(),
        })
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(commands::catalog::health))
        .route("/blockages", get(commands::catalog::list_blockages))
        .route("/diagnose", post(commands::diagnose::diagnose_message))
        .route("/exercise", post(commands::exercise::generate_exercise))
        .route("/ideas", post(commands::ideas::generate_ideas))
        .route("/export", post(commands::export::export_project))
        .with_state(state)
}

/// Loads config and catalog, then serves until Ctrl-C.
pub async fn run() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    let catalog = Catalog::load(config.catalog_path.as_deref().map(Path::new))?;
    let state = AppState::new(&config, catalog)?;

    if !state.ideas.is_configured() {
        tracing::warn!("no LLM API key configured, /ideas will answer 503");
    }

    let address: SocketAddr = config.bind_address.parse()?;
    let listener = tokio::net::TcpListener::bind(address).await?;
    tracing::info!(%address, blockages = state.catalog.blockages().len(), "CreationX listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    fn app() -> Router {
        let catalog = Catalog::builtin().unwrap();
        router(AppState::new(&AppConfig::default(), catalog).unwrap())
    }

    async fn post_json(path: &str, body: &str) -> (StatusCode, Vec<u8>) {
        let request = Request::post(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    fn json(bytes: &[u8]) -> serde_json::Value {
        serde_json::from_slice(bytes).unwrap()
    }

    #[tokio::test]
    async fn test_exercise_avoids_last_technique() {
        let (status, body) = post_json(
            "/exercise",
            r#"{ "blockageId": "hoja_en_blanco", "lastTechnique": "brainstorm_libre" }"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let body = json(&body);
        assert_eq!(body["blockageId"], "hoja_en_blanco");
        assert_eq!(body["blockageLabel"], "Hoja en blanco");
        assert_eq!(body["techniqueId"], "constraint_game");
        assert_eq!(body["techniqueName"], "Juego de restricciones");
        assert!(body["exercise"].as_str().is_some_and(|e| !e.is_empty()));
    }

    #[tokio::test]
    async fn test_exercise_requires_blockage_id() {
        for payload in [r#"{}"#, r#"{ "blockageId": "  " }"#] {
            let (status, body) = post_json("/exercise", payload).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(json(&body)["error"], "blockageId is required");
        }
    }

    #[tokio::test]
    async fn test_exercise_unknown_blockage() {
        let (status, body) = post_json("/exercise", r#"{ "blockageId": "nonexistent-id" }"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json(&body)["error"], "blockage not found");
    }

    #[tokio::test]
    async fn test_malformed_body_is_json_error() {
        let (status, body) = post_json("/exercise", "{ nope").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json(&body)["error"].is_string());
    }

    #[tokio::test]
    async fn test_blockages_listing() {
        let request = Request::get("/blockages").body(Body::empty()).unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = json(&bytes);
        assert_eq!(body[0]["id"], "hoja_en_blanco");
        assert_eq!(body[0]["techniques"][1]["id"], "constraint_game");
    }

    #[tokio::test]
    async fn test_diagnose_endpoint() {
        let (status, body) = post_json("/diagnose", r#"{ "message": "Estoy atascado" }"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&body)["blockageId"], "estancamiento");

        let (status, body) = post_json("/diagnose", r#"{ "message": "hola" }"#).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json(&body)["error"], "no blockage matched");
    }

    #[tokio::test]
    async fn test_ideas_without_key_is_unavailable() {
        let (status, _) = post_json("/ideas", r#"{ "prompt": "un cartel" }"#).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        let (status, body) =
            post_json("/ideas", r#"{ "prompt": "un cartel", "blockageId": "nope" }"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json(&body)["error"], "blockage not found");
    }

    #[tokio::test]
    async fn test_export_returns_zip() {
        let request = Request::post("/export")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                r#"{ "projectName": "Mural", "files": [{ "path": "notas.md", "content": "hola" }] }"#,
            ))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/zip");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"mural.zip\""
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let archive = zip::ZipArchive::new(std::io::Cursor::new(bytes.to_vec())).unwrap();
        assert_eq!(archive.len(), 2);

        let (status, _) = post_json("/export", r#"{ "projectName": "x", "files": [] }"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
