//! In-memory stand-in for the Voyager REST backend.
//!
//! Serves the same routes and JSON shapes the client expects so the client
//! can be exercised end-to-end without a database.

use axum::{Json, http::StatusCode, response::IntoResponse};

use serde::Serialize;
pub use server::{router, run, run_with_listener, spawn_with_listener};
pub use store::{ListQuery, Store, StoreError};

mod places;
mod server;
mod store;
mod tags;
mod visits;

pub enum ServerError {
    Store(StoreError),
}

#[derive(Serialize)]
struct Error {
    detail: String,
}

fn status_for_store_error(err: &StoreError) -> StatusCode {
    match err {
        StoreError::NotFound(_) => StatusCode::NOT_FOUND,
        StoreError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
        StoreError::BadQuery(_) => StatusCode::BAD_REQUEST,
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, detail) = match self {
            ServerError::Store(err) => (status_for_store_error(&err), err.to_string()),
        };

        if status.is_server_error() {
            tracing::error!("request failed: {detail}");
        } else {
            tracing::debug!(%status, "request rejected: {detail}");
        }
        (status, Json(Error { detail })).into_response()
    }
}

impl From<StoreError> for ServerError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let res = ServerError::from(StoreError::NotFound("place")).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn validation_maps_to_422() {
        let res = ServerError::from(StoreError::Invalid("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn bad_query_maps_to_400() {
        let res = ServerError::from(StoreError::BadQuery("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
