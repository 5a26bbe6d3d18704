use axum::{Json, extract::State};

use crate::server::ServerState;

/// Tag vocabulary used by the client's suggestions.
pub async fn list(State(state): State<ServerState>) -> Json<Vec<String>> {
    Json(state.store.read().await.tags())
}
