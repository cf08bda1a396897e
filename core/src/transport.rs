//! HTTP-backed `ServiceFacade`.
//!
//! This adapter owns transport details only: it executes the requests built
//! by `PawlogClient` with `reqwest` and hands the raw response back to
//! `PawlogClient::parse`. No retries and no response caching happen here.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::client::PawlogClient;
use crate::error::ApiError;
use crate::facade::ServiceFacade;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{
    AuthResponse, Cat, CatPatch, EnrichmentActivity, EnrichmentSuggestion, HealthLog, LoginRequest,
    NewEnrichmentActivity, NewHealthLog, SignupRequest, User, UserPatch,
};

#[derive(Debug, Clone)]
pub struct TransportAdapter {
    client: PawlogClient,
    http: Client,
}

impl TransportAdapter {
    /// Build an adapter for `base_url`, with an optional per-request timeout.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ApiError::Config(format!("cannot build HTTP client: {e}")))?;
        Ok(Self {
            client: PawlogClient::new(base_url),
            http,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.client = self.client.with_token(token);
        self
    }

    /// Perform one round-trip. Non-2xx statuses are returned as data.
    pub async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        tracing::debug!(method = request.method.as_str(), url = %request.path, "sending request");
        let mut builder = match request.method {
            HttpMethod::Get => self.http.get(&request.path),
            HttpMethod::Post => self.http.post(&request.path),
            HttpMethod::Patch => self.http.patch(&request.path),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let body = response.text().await.map_err(map_transport_error)?;
        tracing::debug!(status = status.as_u16(), url = %request.path, "received response");

        Ok(HttpResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            body,
        })
    }

    async fn round_trip<T: DeserializeOwned>(&self, request: HttpRequest) -> Result<T, ApiError> {
        let response = self.execute(request).await?;
        self.client.parse(response)
    }
}

fn map_transport_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Network(format!("request timed out: {err}"))
    } else {
        ApiError::Network(err.to_string())
    }
}

#[async_trait]
impl ServiceFacade for TransportAdapter {
    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let input = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.round_trip(self.client.build_login(&input)?).await
    }

    async fn signup(&self, input: &SignupRequest) -> Result<AuthResponse, ApiError> {
        self.round_trip(self.client.build_signup(input)?).await
    }

    async fn get_user(&self, id: u64) -> Result<User, ApiError> {
        self.round_trip(self.client.build_get_user(id)).await
    }

    async fn update_user(&self, id: u64, patch: &UserPatch) -> Result<User, ApiError> {
        self.round_trip(self.client.build_update_user(id, patch)?).await
    }

    async fn get_cat(&self, id: u64) -> Result<Cat, ApiError> {
        self.round_trip(self.client.build_get_cat(id)).await
    }

    async fn update_cat(&self, id: u64, patch: &CatPatch) -> Result<Cat, ApiError> {
        self.round_trip(self.client.build_update_cat(id, patch)?).await
    }

    async fn get_health_logs(&self, cat_id: u64) -> Result<Vec<HealthLog>, ApiError> {
        self.round_trip(self.client.build_get_health_logs(cat_id)).await
    }

    async fn add_health_log(&self, cat_id: u64, log: &NewHealthLog) -> Result<HealthLog, ApiError> {
        self.round_trip(self.client.build_add_health_log(cat_id, log)?).await
    }

    async fn get_enrichment_activities(&self, cat_id: u64) -> Result<Vec<EnrichmentActivity>, ApiError> {
        self.round_trip(self.client.build_get_enrichment_activities(cat_id))
            .await
    }

    async fn add_enrichment_activity(
        &self,
        cat_id: u64,
        activity: &NewEnrichmentActivity,
    ) -> Result<EnrichmentActivity, ApiError> {
        self.round_trip(self.client.build_add_enrichment_activity(cat_id, activity)?)
            .await
    }

    async fn get_enrichment_suggestions(&self, cat_id: u64) -> Result<Vec<EnrichmentSuggestion>, ApiError> {
        self.round_trip(self.client.build_get_enrichment_suggestions(cat_id))
            .await
    }
}
