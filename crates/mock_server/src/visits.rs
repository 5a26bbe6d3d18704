//! Visit API endpoints

use api_types::visit::{Visit, VisitPayload};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{ServerError, server::ServerState};

pub async fn create(
    State(state): State<ServerState>,
    Path(place_id): Path<i64>,
    Json(payload): Json<VisitPayload>,
) -> Result<(StatusCode, Json<Visit>), ServerError> {
    let mut store = state.store.write().await;
    let visit = store.add_visit(place_id, payload)?;
    Ok((StatusCode::CREATED, Json(visit)))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(visit_id): Path<i64>,
    Json(payload): Json<VisitPayload>,
) -> Result<Json<Visit>, ServerError> {
    let mut store = state.store.write().await;
    Ok(Json(store.update_visit(visit_id, payload)?))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(visit_id): Path<i64>,
) -> Result<StatusCode, ServerError> {
    let mut store = state.store.write().await;
    store.delete_visit(visit_id)?;
    Ok(StatusCode::NO_CONTENT)
}
