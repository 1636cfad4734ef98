//! HTTP client for the MediCart API server.
//!
//! [`ApiClient`] implements the [`ChatApi`] and [`AuthApi`] seams the stores
//! depend on. Tests substitute scripted implementations of the same traits.

pub mod types;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::instrument;
use url::Url;

use medicart_core::{ChatMessage, Email, UserProfile};

use crate::config::ClientConfig;

pub use types::ChatReply;
use types::{
    AuthResponseBody, ChatRequest, ChatResponseBody, ErrorBody, HistoryRequest,
    HistoryResponseBody, LoginRequest, RegisterRequest,
};

/// Errors that can occur when talking to the API server.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure (connection refused, DNS, TLS, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server did not answer within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The server answered with an `error` message.
    #[error("server error: {0}")]
    Server(String),

    /// Non-success status with no usable error message.
    #[error("unexpected status {0}")]
    Status(u16),

    /// The body did not match the expected schema.
    #[error("unexpected response shape: {0}")]
    UnexpectedShape(String),

    /// The endpoint URL could not be built from the base URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ApiError {
    fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(err)
        }
    }
}

/// Chat endpoints.
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Send one user message and get the assistant's reply.
    async fn send_chat(&self, email: &Email, message: &str) -> Result<ChatReply, ApiError>;

    /// Fetch the stored transcript for a user, oldest first.
    async fn fetch_history(&self, email: &Email) -> Result<Vec<ChatMessage>, ApiError>;
}

/// Account endpoints.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Verify credentials and return the account profile.
    async fn login(&self, email: &Email, password: &str) -> Result<UserProfile, ApiError>;

    /// Create an account and return its profile.
    async fn register(
        &self,
        name: &str,
        email: &Email,
        password: &str,
    ) -> Result<UserProfile, ApiError>;
}

/// reqwest-backed API client.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client for the configured server.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.api_url.clone(),
            }),
        })
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + Sync + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.inner.base_url.join(path)?;
        let response = self
            .inner
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(ApiError::from_transport)?;

        Self::handle_response(response).await
    }

    async fn handle_response<R: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<R, ApiError> {
        let status = response.status();
        let body = response.text().await.map_err(ApiError::from_transport)?;

        if status.is_success() {
            serde_json::from_str(&body).map_err(|e| ApiError::UnexpectedShape(e.to_string()))
        } else {
            Err(Self::error_from_status(status, &body))
        }
    }

    fn error_from_status(status: StatusCode, body: &str) -> ApiError {
        serde_json::from_str::<ErrorBody>(body)
            .map_or(ApiError::Status(status.as_u16()), |e| {
                ApiError::Server(e.error)
            })
    }
}

#[async_trait]
impl ChatApi for ApiClient {
    #[instrument(skip(self, message), fields(email = %email, len = message.len()))]
    async fn send_chat(&self, email: &Email, message: &str) -> Result<ChatReply, ApiError> {
        let body: ChatResponseBody = self.post("chat", &ChatRequest { email, message }).await?;
        body.into_reply()
    }

    #[instrument(skip(self), fields(email = %email))]
    async fn fetch_history(&self, email: &Email) -> Result<Vec<ChatMessage>, ApiError> {
        let body: HistoryResponseBody = self
            .post("chat/history", &HistoryRequest { email })
            .await?;
        body.into_messages()
    }
}

#[async_trait]
impl AuthApi for ApiClient {
    #[instrument(skip(self, password), fields(email = %email))]
    async fn login(&self, email: &Email, password: &str) -> Result<UserProfile, ApiError> {
        let body: AuthResponseBody = self.post("login", &LoginRequest { email, password }).await?;
        body.into_user()
    }

    #[instrument(skip(self, password), fields(email = %email))]
    async fn register(
        &self,
        name: &str,
        email: &Email,
        password: &str,
    ) -> Result<UserProfile, ApiError> {
        let body: AuthResponseBody = self
            .post(
                "register",
                &RegisterRequest {
                    name,
                    email,
                    password,
                },
            )
            .await?;
        body.into_user()
    }
}
