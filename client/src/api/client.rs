//! HTTP implementation of the `Gateway` over `reqwest`.
//!
//! The bearer token lives in a single shared cell that is read on every call,
//! so a refresh or logout is visible to the very next request.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

use crate::api::common::{decode_payload, status_to_api_error};
use crate::api::event::{ApprovalRequest, EventFilter};
use crate::api::gateway::Gateway;
use crate::api::user::UserFilter;
use crate::auth::models::{
    LoginRequest, LoginResponse, MeResponse, RefreshTokenRequest, RefreshTokenResponse,
};
use crate::config::Config;
use crate::errors::{ApiError, ApiResult};
use crate::models::{CalendarEvent, Event, Holiday, User};

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http_client: Client,
    access_token: Arc<RwLock<Option<String>>>,
}

impl ApiClient {
    /// Creates a client for `base_url` (e.g. `https://tooff.example.com/api`).
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> ApiResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| ApiError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client,
            access_token: Arc::new(RwLock::new(None)),
        })
    }

    pub fn from_config(config: &Config) -> ApiResult<Self> {
        Self::new(config.api_url.clone(), config.request_timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Builds a request carrying the current bearer token; refuses locally
    /// when there is none.
    async fn authorized(&self, method: Method, path: &str) -> ApiResult<RequestBuilder> {
        let token = self
            .access_token
            .read()
            .await
            .clone()
            .ok_or(ApiError::MissingToken)?;

        Ok(self
            .http_client
            .request(method, self.url(path))
            .bearer_auth(token))
    }

    fn anonymous(&self, method: Method, path: &str) -> RequestBuilder {
        self.http_client.request(method, self.url(path))
    }

    /// Sends the request and returns the body of a successful response.
    async fn execute(&self, request: RequestBuilder) -> ApiResult<String> {
        let request = request
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        debug!("{} {}", request.method(), request.url().path());

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if status.is_success() {
            Ok(body)
        } else {
            debug!("Request failed with status {}", status);
            Err(status_to_api_error(status, &body))
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let body = self.execute(request).await?;
        decode_payload(&body)
    }

    /// For endpoints whose success body carries nothing the client needs.
    async fn send(&self, request: RequestBuilder) -> ApiResult<()> {
        self.execute(request).await.map(|_| ())
    }

    async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let request = self.authorized(Method::POST, path).await?.json(body);
        self.fetch(request).await
    }
}

#[async_trait]
impl Gateway for ApiClient {
    async fn set_access_token(&self, token: Option<String>) {
        *self.access_token.write().await = token;
    }

    async fn has_access_token(&self) -> bool {
        self.access_token.read().await.is_some()
    }

    async fn login(&self, request: &LoginRequest) -> ApiResult<LoginResponse> {
        let request = self.anonymous(Method::POST, "/auth/login").json(request);
        self.fetch(request).await
    }

    async fn refresh(&self, refresh_token: &str) -> ApiResult<RefreshTokenResponse> {
        let body = RefreshTokenRequest {
            refresh_token: refresh_token.to_string(),
        };
        let request = self.anonymous(Method::POST, "/auth/refresh").json(&body);
        self.fetch(request).await
    }

    async fn me(&self) -> ApiResult<MeResponse> {
        let request = self.authorized(Method::GET, "/auth/me").await?;
        self.fetch(request).await
    }

    async fn logout(&self) -> ApiResult<()> {
        let request = self.authorized(Method::POST, "/auth/logout").await?;
        self.send(request).await
    }

    async fn get_events(&self, filter: &EventFilter) -> ApiResult<Vec<Event>> {
        let request = self
            .authorized(Method::GET, "/eventos")
            .await?
            .query(&filter.query());
        self.fetch(request).await
    }

    async fn approve_event(&self, id: i64, request: &ApprovalRequest) -> ApiResult<Event> {
        self.post_json(&format!("/eventos/{}/aprovar", id), request)
            .await
    }

    async fn reject_event(&self, id: i64, request: &ApprovalRequest) -> ApiResult<Event> {
        self.post_json(&format!("/eventos/{}/rejeitar", id), request)
            .await
    }

    async fn delete_event(&self, id: i64) -> ApiResult<()> {
        let request = self
            .authorized(Method::DELETE, &format!("/eventos/{}", id))
            .await?;
        self.send(request).await
    }

    async fn get_users(&self, filter: &UserFilter) -> ApiResult<Vec<User>> {
        let request = self
            .authorized(Method::GET, "/usuarios")
            .await?
            .query(&filter.query());
        self.fetch(request).await
    }

    async fn delete_user(&self, cpf: u64) -> ApiResult<()> {
        let request = self
            .authorized(Method::DELETE, &format!("/usuarios/{}", cpf))
            .await?;
        self.send(request).await
    }

    async fn get_calendar(&self, approved_only: bool) -> ApiResult<Vec<CalendarEvent>> {
        let request = self
            .authorized(Method::GET, "/calendario")
            .await?
            .query(&[("apenas_aprovados", approved_only)]);
        self.fetch(request).await
    }

    async fn get_national_holidays(&self) -> ApiResult<Vec<Holiday>> {
        let request = self.authorized(Method::GET, "/feriados/nacionais").await?;
        self.fetch(request).await
    }

    async fn get_state_holidays(&self, uf: &str) -> ApiResult<Vec<Holiday>> {
        let request = self
            .authorized(Method::GET, &format!("/feriados/estaduais/{}", uf))
            .await?;
        self.fetch(request).await
    }
}
