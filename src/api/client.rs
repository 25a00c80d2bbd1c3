//! Authenticated JSON requests against the admin API.
//!
//! Every call reads the bearer token from durable storage, so a session saved
//! by another handle (or cleared by a guard) is picked up without restarting.
//! The whole exchange, body included, races a single timer; dropping the
//! request future drops the timer with it.

use crate::api::error::ApiError;
use crate::config::join_url;
use crate::session::{
    state::{Session, STORAGE_KEY},
    storage::SessionStorage,
};
use reqwest::{header::ACCEPT, multipart::Form, Client, Method, RequestBuilder, Response, StatusCode};
use secrecy::ExposeSecret;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Every admin endpoint lives under this prefix of the API base URL.
pub const ADMIN_PREFIX: &str = "/admin";
/// Maximum number of error body characters surfaced to the operator.
const MAX_ERROR_CHARS: usize = 200;

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    timeout: Duration,
    storage: Arc<dyn SessionStorage>,
}

impl ApiClient {
    /// # Errors
    /// Returns [`ApiError::Network`] if the HTTP client cannot be built.
    pub fn new(
        user_agent: &str,
        base_url: &str,
        timeout: Duration,
        storage: Arc<dyn SessionStorage>,
    ) -> Result<Self, ApiError> {
        let http = Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|err| ApiError::Network(format!("Failed to initialize HTTP client: {err}")))?;

        Ok(Self {
            http,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            timeout,
            storage,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// `<base>/admin<path>`.
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        let admin = join_url(&self.base_url, ADMIN_PREFIX);
        let path = path.trim();
        if path.is_empty() {
            admin
        } else {
            join_url(&admin, path)
        }
    }

    /// Sends one request and decodes the JSON answer.
    ///
    /// # Errors
    /// Returns [`ApiError::Timeout`] when the timer fires first,
    /// [`ApiError::Network`] when the server cannot be reached, and
    /// [`ApiError::Api`] for non-success statuses or undecodable bodies.
    #[instrument(skip(self, body), fields(http.method = %method))]
    pub async fn request<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.url_for(path);
        let mut builder = self.authorized(method, &url);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        self.send(&url, builder).await
    }

    /// Posts a multipart form and decodes the JSON answer.
    ///
    /// # Errors
    /// Same as [`ApiClient::request`].
    #[instrument(skip(self, form))]
    pub async fn upload<T: DeserializeOwned>(&self, path: &str, form: Form) -> Result<T, ApiError> {
        let url = self.url_for(path);
        let builder = self.authorized(Method::POST, &url).multipart(form);
        self.send(&url, builder).await
    }

    fn authorized(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, url)
            .header(ACCEPT, "application/json");
        match self.bearer_token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, url: &str, builder: RequestBuilder) -> Result<T, ApiError> {
        let exchange = async {
            let response = builder.send().await.map_err(map_request_error)?;
            read_response(response).await
        };

        if let Ok(result) = tokio::time::timeout(self.timeout, exchange).await {
            result
        } else {
            warn!("request to {} timed out after {:?}", url, self.timeout);
            Err(ApiError::Timeout)
        }
    }

    /// # Errors
    /// See [`ApiClient::request`].
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request::<T, ()>(Method::GET, path, None).await
    }

    /// # Errors
    /// See [`ApiClient::request`].
    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::POST, path, Some(body)).await
    }

    /// # Errors
    /// See [`ApiClient::request`].
    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::PUT, path, Some(body)).await
    }

    /// # Errors
    /// See [`ApiClient::request`].
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request::<T, ()>(Method::DELETE, path, None).await
    }

    /// Token of the persisted session, if that session is valid.
    fn bearer_token(&self) -> Option<String> {
        let blob = match self.storage.get(STORAGE_KEY) {
            Ok(blob) => blob?,
            Err(err) => {
                warn!("failed to read persisted session: {}", err);
                return None;
            }
        };
        Session::from_persisted(&blob)
            .ok()
            .filter(Session::is_valid)
            .and_then(|session| session.token)
            .map(|token| token.expose_secret().to_string())
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

fn map_request_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout
    } else if err.is_builder() {
        ApiError::Network(format!("Failed to build request: {err}"))
    } else {
        ApiError::Network(err.to_string())
    }
}

async fn read_response<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.bytes().await.map_err(map_request_error)?;
    debug!("admin API answered {} ({} bytes)", status, body.len());

    if !status.is_success() {
        return Err(ApiError::Api {
            status: status.as_u16(),
            message: error_message(status, &body),
        });
    }

    decode_body(status, &body)
}

/// Empty bodies decode as JSON `null`.
fn decode_body<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> Result<T, ApiError> {
    let decode_error = |err: serde_json::Error| ApiError::Api {
        status: status.as_u16(),
        message: format!("Failed to decode response: {err}"),
    };

    let value = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Null
    } else {
        serde_json::from_slice(body).map_err(decode_error)?
    };
    serde_json::from_value(value).map_err(decode_error)
}

/// The body's `error` string, or `API request failed: <status> <reason>`.
fn error_message(status: StatusCode, body: &[u8]) -> String {
    serde_json::from_slice::<Value>(body)
        .ok()
        .as_ref()
        .and_then(|value| value.get("error"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|message| !message.is_empty())
        .map_or_else(
            || {
                format!(
                    "API request failed: {} {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or_default()
                )
                .trim_end()
                .to_string()
            },
            |message| message.chars().take(MAX_ERROR_CHARS).collect(),
        )
}
