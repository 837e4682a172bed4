use std::sync::Arc;

use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{AppError, AppResult};
use crate::identity::SessionStore;

/// Every outbound backend call goes through here.
///
/// The bearer token is read from the session store right before sending. A 401 on any
/// endpoint clears the store and comes back as `AppError::AuthorizationRejected`; the
/// navigation owner decides where to go next. All other failures pass through.
#[derive(Clone)]
pub struct RequestPipeline {
    base: String,
    http: reqwest::Client,
    store: Arc<SessionStore>,
}

impl RequestPipeline {
    pub fn new(base_url: &str, store: Arc<SessionStore>) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| AppError::network("client_init".to_string(), e.to_string()))?;
        Self::with_client(base_url, store, http)
    }

    pub fn with_client(base_url: &str, store: Arc<SessionStore>, http: reqwest::Client) -> AppResult<Self> {
        let parsed = Url::parse(base_url)
            .map_err(|e| AppError::validation("invalid_base_url".to_string(), format!("{}: {}", base_url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(AppError::validation("invalid_base_url".to_string(), format!("unsupported scheme: {}", parsed.scheme())));
        }
        Ok(Self { base: base_url.trim_end_matches('/').to_string(), http, store })
    }

    pub fn base_url(&self) -> &str { &self.base }

    pub fn store(&self) -> &Arc<SessionStore> { &self.store }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') { format!("{}{}", self.base, path) } else { format!("{}/{}", self.base, path) }
    }

    /// Send one request and return the success body verbatim.
    pub async fn send_raw(&self, method: Method, path: &str, body: Option<serde_json::Value>) -> AppResult<String> {
        let url = self.url(path);
        let mut req = self.http.request(method.clone(), &url);
        if let Some(token) = self.store.token() {
            req = req.bearer_auth(token);
        }
        if let Some(b) = body {
            req = req.json(&b);
        }
        debug!(target: "learnhub::pipeline", %method, path, "send");
        let resp = req.send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        if status.is_success() {
            return Ok(text);
        }
        let err = AppError::from_status(status.as_u16(), &text);
        if err.is_authorization_rejected() {
            // cross-cutting: any endpoint, any caller
            if let Err(e) = self.store.clear() {
                warn!(target: "learnhub::pipeline", "could not clear session after 401: {}", e);
            }
            warn!(target: "learnhub::pipeline", %method, path, "authorization rejected; session cleared");
        } else {
            debug!(target: "learnhub::pipeline", %method, path, status = status.as_u16(), "request failed");
        }
        Err(err)
    }

    pub async fn send<R: DeserializeOwned>(&self, method: Method, path: &str, body: Option<serde_json::Value>) -> AppResult<R> {
        let text = self.send_raw(method, path, body).await?;
        decode_body(&text)
    }

    pub async fn get<R: DeserializeOwned>(&self, path: &str) -> AppResult<R> {
        self.send(Method::GET, path, None).await
    }

    pub async fn post<B: Serialize + ?Sized, R: DeserializeOwned>(&self, path: &str, body: &B) -> AppResult<R> {
        self.send(Method::POST, path, Some(serde_json::to_value(body)?)).await
    }

    pub async fn put<B: Serialize + ?Sized, R: DeserializeOwned>(&self, path: &str, body: &B) -> AppResult<R> {
        self.send(Method::PUT, path, Some(serde_json::to_value(body)?)).await
    }

    pub async fn delete<R: DeserializeOwned>(&self, path: &str) -> AppResult<R> {
        self.send(Method::DELETE, path, None).await
    }
}

/// An empty body decodes as JSON `null`, so `()`, `Option<T>` and `Value` all accept it.
pub(crate) fn decode_body<R: DeserializeOwned>(text: &str) -> AppResult<R> {
    if text.trim().is_empty() {
        return Ok(serde_json::from_value(serde_json::Value::Null)?);
    }
    Ok(serde_json::from_str(text)?)
}

/// Percent-encode one path segment.
pub(crate) fn seg(id: &str) -> String { urlencoding::encode(id).into_owned() }
