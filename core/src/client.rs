//! Stateless request builder and response parser for the pawlog API.
//!
//! # Design
//! `PawlogClient` holds the base URL and an optional bearer token and nothing
//! else. Every facade operation has a `build_*` method producing an
//! `HttpRequest`; responses go through `parse`, which applies the status
//! mapping and JSON decoding shared by all endpoints.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{CatPatch, LoginRequest, NewEnrichmentActivity, NewHealthLog, SignupRequest, UserPatch};

#[derive(Debug, Clone)]
pub struct PawlogClient {
    base_url: String,
    token: Option<String>,
}

impl PawlogClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Attach `authorization: Bearer <token>` to every request built afterwards.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_login(&self, input: &LoginRequest) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/auth/login", input)
    }

    pub fn build_signup(&self, input: &SignupRequest) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/auth/signup", input)
    }

    pub fn build_get_user(&self, id: u64) -> HttpRequest {
        self.request(HttpMethod::Get, &format!("/users/{id}"))
    }

    pub fn build_update_user(&self, id: u64, patch: &UserPatch) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Patch, &format!("/users/{id}"), patch)
    }

    pub fn build_get_cat(&self, id: u64) -> HttpRequest {
        self.request(HttpMethod::Get, &format!("/cats/{id}"))
    }

    pub fn build_update_cat(&self, id: u64, patch: &CatPatch) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Patch, &format!("/cats/{id}"), patch)
    }

    pub fn build_get_health_logs(&self, cat_id: u64) -> HttpRequest {
        self.request(HttpMethod::Get, &format!("/cats/{cat_id}/healthLogs"))
    }

    pub fn build_add_health_log(&self, cat_id: u64, log: &NewHealthLog) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, &format!("/cats/{cat_id}/healthLogs"), log)
    }

    pub fn build_get_enrichment_activities(&self, cat_id: u64) -> HttpRequest {
        self.request(HttpMethod::Get, &format!("/cats/{cat_id}/enrichmentActivities"))
    }

    pub fn build_add_enrichment_activity(
        &self,
        cat_id: u64,
        activity: &NewEnrichmentActivity,
    ) -> Result<HttpRequest, ApiError> {
        self.json_request(
            HttpMethod::Post,
            &format!("/cats/{cat_id}/enrichmentActivities"),
            activity,
        )
    }

    pub fn build_get_enrichment_suggestions(&self, cat_id: u64) -> HttpRequest {
        self.request(HttpMethod::Get, &format!("/cats/{cat_id}/enrichmentSuggestions"))
    }

    /// Decode a response, mapping any non-2xx status to an `ApiError`.
    pub fn parse<T: DeserializeOwned>(&self, response: HttpResponse) -> Result<T, ApiError> {
        check_status(&response)?;
        serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
    }

    fn request(&self, method: HttpMethod, endpoint: &str) -> HttpRequest {
        let mut headers = vec![("content-type".to_string(), "application/json".to_string())];
        if let Some(token) = &self.token {
            headers.push(("authorization".to_string(), format!("Bearer {token}")));
        }
        HttpRequest {
            method,
            path: format!("{}{endpoint}", self.base_url),
            headers,
            body: None,
        }
    }

    fn json_request<B: Serialize>(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: &B,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            body: Some(body),
            ..self.request(method, endpoint)
        })
    }
}

/// Map non-success status codes using only the status line.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::from_status(response.status, &response.reason))
}
