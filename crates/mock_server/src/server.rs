use axum::{
    Json, Router,
    extract::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
};
use serde::Serialize;
use tokio::sync::RwLock;

use std::{net::SocketAddr, sync::Arc};

use crate::{places, store::Store, tags, visits};

#[derive(Clone, Default)]
pub struct ServerState {
    pub store: Arc<RwLock<Store>>,
}

#[derive(Serialize)]
struct Root {
    message: &'static str,
}

async fn root() -> Json<Root> {
    Json(Root {
        message: "Voyager API",
    })
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let response = next.run(request).await;
    tracing::info!(%method, %uri, status = %response.status(), "handled request");
    response
}

/// Router over a fresh, empty store.
pub fn router() -> Router {
    router_with_state(ServerState::default())
}

fn router_with_state(state: ServerState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/places", get(places::list).post(places::create))
        .route(
            "/places/{id}",
            get(places::get)
                .put(places::update)
                .delete(places::delete),
        )
        .route("/places/{id}/visits", post(visits::create))
        .route("/visits/{id}", put(visits::update).delete(visits::delete))
        .route("/tags", get(tags::list))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

pub async fn run(addr: SocketAddr) {
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(listener: tokio::net::TcpListener) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router()).await
}

pub fn spawn_with_listener(
    listener: tokio::net::TcpListener,
) -> Result<SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
