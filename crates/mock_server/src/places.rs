//! Place API endpoints

use api_types::place::{Place, PlacePayload};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_extra::extract::Query;

use crate::{ServerError, server::ServerState, store::ListQuery};

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Place>>, ServerError> {
    let store = state.store.read().await;
    Ok(Json(store.list_places(&query)?))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<PlacePayload>,
) -> Result<(StatusCode, Json<Place>), ServerError> {
    let mut store = state.store.write().await;
    let place = store.create_place(payload)?;
    Ok((StatusCode::CREATED, Json(place)))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<Place>, ServerError> {
    let store = state.store.read().await;
    Ok(Json(store.get_place(id)?))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<PlacePayload>,
) -> Result<Json<Place>, ServerError> {
    let mut store = state.store.write().await;
    Ok(Json(store.update_place(id, payload)?))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServerError> {
    let mut store = state.store.write().await;
    store.delete_place(id)?;
    Ok(StatusCode::NO_CONTENT)
}
