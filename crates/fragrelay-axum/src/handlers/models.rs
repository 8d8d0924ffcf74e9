//! Model listing handler.

use axum::Json;
use axum::extract::State;

use crate::dto::{ModelEntry, ModelList};
use crate::state::AppState;

/// List registered models in the OpenAI listing shape.
/// GET /v1/models
pub async fn list(State(state): State<AppState>) -> Json<ModelList> {
    let created = chrono::Utc::now().timestamp();
    let mut data: Vec<ModelEntry> = state
        .registry
        .ids()
        .into_iter()
        .map(|id| ModelEntry {
            id: id.to_string(),
            object: "model",
            created,
            owned_by: "e2b",
        })
        .collect();
    data.sort_by(|a, b| a.id.cmp(&b.id));

    tracing::info!(models = data.len(), "served model listing");
    Json(ModelList {
        object: "list",
        data,
    })
}
