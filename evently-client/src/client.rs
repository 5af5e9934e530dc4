use evently_core::{Role, Route};
use evently_store::app_config::ApiConfig;
use evently_store::Session;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;

use crate::error::ApiError;

/// Capacity of the navigation channel; only the latest redirect matters
const NAVIGATION_BUFFER: usize = 16;

/// HTTP client for the portal backend.
///
/// Holds the injected [`Session`] and attaches the calling role's token to
/// each request. Any 401/403 on an authenticated call clears every role
/// token and publishes [`Route::Root`] to navigation subscribers.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Session,
    nav_tx: broadcast::Sender<Route>,
}

impl ApiClient {
    /// * `base_url` - API root, e.g. `http://localhost:5000/api`.
    pub fn new(base_url: impl Into<String>, session: Session) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, session)
    }

    /// Reuse an existing [`reqwest::Client`] (connection pool, timeouts)
    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>, session: Session) -> Self {
        let (nav_tx, _) = broadcast::channel(NAVIGATION_BUFFER);
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
            nav_tx,
        }
    }

    pub fn from_config(config: &ApiConfig, session: Session) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().timeout(config.timeout()).build()?;
        Ok(Self::with_client(http, config.base_url.clone(), session))
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Redirects forced by the interceptor
    pub fn subscribe_navigation(&self) -> broadcast::Receiver<Route> {
        self.nav_tx.subscribe()
    }

    pub(crate) async fn get(&self, role: Role, path: &str) -> Result<Value, ApiError> {
        self.send::<()>(role, Method::GET, path, None).await
    }

    pub(crate) async fn post<B: Serialize + ?Sized>(
        &self,
        role: Role,
        path: &str,
        body: &B,
    ) -> Result<Value, ApiError> {
        self.send(role, Method::POST, path, Some(body)).await
    }

    pub(crate) async fn post_empty(&self, role: Role, path: &str) -> Result<Value, ApiError> {
        self.send::<()>(role, Method::POST, path, None).await
    }

    pub(crate) async fn patch<B: Serialize + ?Sized>(
        &self,
        role: Role,
        path: &str,
        body: Option<&B>,
    ) -> Result<Value, ApiError> {
        self.send(role, Method::PATCH, path, body).await
    }

    /// Authenticated request as `role`
    async fn send<B: Serialize + ?Sized>(
        &self,
        role: Role,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Value, ApiError> {
        let token = self.session.token(role).ok_or(ApiError::NotLoggedIn(role))?;

        let mut request = self
            .http
            .request(method.clone(), self.url(path))
            .bearer_auth(token.expose());
        if let Some(body) = body {
            request = request.json(body);
        }

        tracing::debug!(%method, path, %role, "API request");
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            self.force_logout(status);
            return Err(ApiError::Unauthorized {
                status: status.as_u16(),
            });
        }

        Self::parse_response(response).await
    }

    /// Unauthenticated request (login, signup). No interceptor: a 401 here
    /// means bad credentials, not an expired session.
    pub(crate) async fn post_public<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Value, ApiError> {
        let response = self.http.post(self.url(path)).json(body).send().await?;
        Self::parse_response(response).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn force_logout(&self, status: StatusCode) {
        tracing::warn!(status = status.as_u16(), "Authentication rejected, clearing session");
        if let Err(e) = self.session.clear_all() {
            tracing::error!(error = %e, "Failed to clear session after auth failure");
        }
        // No subscribers is fine: nobody is rendering
        let _ = self.nav_tx.send(Route::Root);
    }

    /// Map a non-2xx response to [`ApiError::Rejected`] carrying the
    /// backend's `message` (or `error`) field, else the body text.
    async fn parse_response(response: reqwest::Response) -> Result<Value, ApiError> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|v| crate::normalize::message(&v))
                .or_else(|| Some(text.trim().to_string()).filter(|t| !t.is_empty()))
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("Request failed")
                        .to_string()
                });
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| ApiError::shape("response", e.to_string()))
    }
}
