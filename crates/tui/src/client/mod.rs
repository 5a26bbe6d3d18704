pub mod address;
pub mod geo;
pub mod query;

use api_types::{
    filter::Filters,
    place::{Place, PlacePayload},
    visit::{Visit, VisitPayload},
};
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::error::{AppError, Result};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("not found")]
    NotFound,
    #[error("{status}: {message}")]
    Server { status: StatusCode, message: String },
    #[error("server unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid url: {0}")]
    Url(String),
}

/// Thin async wrapper over the places REST API: one request per call, no
/// retries and no caching.
#[derive(Debug, Clone)]
pub struct Client {
    base_url: String,
    http: reqwest::Client,
}

impl Client {
    pub fn new(base_url: &str, http: reqwest::Client) -> Result<Self> {
        Url::parse(base_url).map_err(|err| AppError::BaseUrl {
            url: base_url.to_string(),
            reason: err.to_string(),
        })?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn endpoint(&self, path: &str) -> std::result::Result<Url, ClientError> {
        let raw = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        Url::parse(&raw).map_err(|err| ClientError::Url(format!("{raw}: {err}")))
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<&(impl serde::Serialize + ?Sized)>,
    ) -> std::result::Result<reqwest::Response, ClientError> {
        tracing::debug!(%method, %url, "api request");
        let mut req = self.http.request(method.clone(), url.clone());
        if let Some(body) = body {
            req = req.json(body);
        }

        let res = req.send().await.inspect_err(|err| {
            tracing::warn!(%method, %url, "api transport error: {err}");
        })?;
        let status = res.status();
        if status.is_success() {
            return Ok(res);
        }

        let text = res.text().await.unwrap_or_default();
        tracing::warn!(%method, %url, %status, "api request failed");
        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound);
        }
        Err(ClientError::Server {
            status,
            message: error_message(&text),
        })
    }

    async fn json<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<&(impl serde::Serialize + ?Sized)>,
    ) -> std::result::Result<T, ClientError> {
        let res = self.send(method, url, body).await?;
        Ok(res.json::<T>().await?)
    }

    pub async fn list_places(
        &self,
        filters: &Filters,
    ) -> std::result::Result<Vec<Place>, ClientError> {
        let mut url = self.endpoint("places")?;
        query::append_pairs(&mut url, &query::filter_pairs(filters));
        self.json(Method::GET, url, None::<&()>).await
    }

    pub async fn get_place(&self, id: i64) -> std::result::Result<Place, ClientError> {
        let url = self.endpoint(&format!("places/{id}"))?;
        self.json(Method::GET, url, None::<&()>).await
    }

    pub async fn create_place(
        &self,
        payload: &PlacePayload,
    ) -> std::result::Result<Place, ClientError> {
        let url = self.endpoint("places")?;
        self.json(Method::POST, url, Some(payload)).await
    }

    pub async fn update_place(
        &self,
        id: i64,
        payload: &PlacePayload,
    ) -> std::result::Result<Place, ClientError> {
        let url = self.endpoint(&format!("places/{id}"))?;
        self.json(Method::PUT, url, Some(payload)).await
    }

    pub async fn delete_place(&self, id: i64) -> std::result::Result<(), ClientError> {
        let url = self.endpoint(&format!("places/{id}"))?;
        self.send(Method::DELETE, url, None::<&()>).await?;
        Ok(())
    }

    pub async fn add_visit(
        &self,
        place_id: i64,
        payload: &VisitPayload,
    ) -> std::result::Result<Visit, ClientError> {
        let url = self.endpoint(&format!("places/{place_id}/visits"))?;
        self.json(Method::POST, url, Some(payload)).await
    }

    pub async fn update_visit(
        &self,
        visit_id: i64,
        payload: &VisitPayload,
    ) -> std::result::Result<Visit, ClientError> {
        let url = self.endpoint(&format!("visits/{visit_id}"))?;
        self.json(Method::PUT, url, Some(payload)).await
    }

    pub async fn delete_visit(&self, visit_id: i64) -> std::result::Result<(), ClientError> {
        let url = self.endpoint(&format!("visits/{visit_id}"))?;
        self.send(Method::DELETE, url, None::<&()>).await?;
        Ok(())
    }

    /// Tag vocabulary, lowercased.
    pub async fn list_tags(&self) -> std::result::Result<Vec<String>, ClientError> {
        let url = self.endpoint("tags")?;
        let tags: Vec<String> = self.json(Method::GET, url, None::<&()>).await?;
        Ok(tags.into_iter().map(|tag| tag.to_lowercase()).collect())
    }
}

/// Pulls a human readable message out of an error body.
///
/// FastAPI-style `{"detail": "..."}` and `{"error": "..."}` bodies are
/// understood; structured `detail` lists fall back to their first `msg`.
fn error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return "request failed".to_string();
    };
    let detail = value.get("detail").or_else(|| value.get("error"));
    match detail {
        Some(serde_json::Value::String(message)) => message.clone(),
        Some(serde_json::Value::Array(items)) => items
            .first()
            .and_then(|item| item.get("msg"))
            .and_then(|msg| msg.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| "validation error".to_string()),
        _ => "request failed".to_string(),
    }
}
