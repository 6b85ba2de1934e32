use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::AppState;

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TechniqueSummary {
    pub id: String,
    pub name: String,
    pub description: String,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockageSummary {
    pub id: String,
    pub label: String,
    pub goal: String,
    pub techniques: Vec<TechniqueSummary>,
}

/// `GET /blockages`: the diagnosis menu, in dataset order.
pub async fn list_blockages(State(state): State<AppState>) -> Json<Vec<BlockageSummary>> {
    let catalog = &state.catalog;
    let summaries = catalog
        .blockages()
        .iter()
        .map(|b| {
            let mut techniques: Vec<TechniqueSummary> = Vec::new();
            for technique in b.techniques.iter().filter_map(|id| catalog.technique(id)) {
                if techniques.iter().all(|t| t.id != technique.id) {
                    techniques.push(TechniqueSummary {
                        id: technique.id.clone(),
                        name: technique.name.clone(),
                        description: technique.description.clone(),
                    });
                }
            }
            BlockageSummary {
                id: b.id.clone(),
                label: b.label.clone(),
                goal: b.goal.clone(),
                techniques,
            }
        })
        .collect();
    Json(summaries)
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "blockages": state.catalog.blockages().len(),
        "ideasEnabled": state.ideas.is_configured(),
    }))
}
