//! The single interface every caller uses to reach the backend.
//!
//! # Design
//! `ServiceFacade` has exactly two implementations: `TransportAdapter` (real
//! HTTP) and `MockProvider` (in-memory store). `connect` picks one from the
//! configuration and the choice holds for the life of the process; nothing
//! downstream branches on which provider is active.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::mock::{MockProvider, MockStore};
use crate::transport::TransportAdapter;
use crate::types::{
    AuthResponse, Cat, CatPatch, EnrichmentActivity, EnrichmentSuggestion, HealthLog,
    NewEnrichmentActivity, NewHealthLog, SignupRequest, User, UserPatch,
};

#[async_trait]
pub trait ServiceFacade: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError>;

    async fn signup(&self, input: &SignupRequest) -> Result<AuthResponse, ApiError>;

    async fn get_user(&self, id: u64) -> Result<User, ApiError>;

    async fn update_user(&self, id: u64, patch: &UserPatch) -> Result<User, ApiError>;

    async fn get_cat(&self, id: u64) -> Result<Cat, ApiError>;

    async fn update_cat(&self, id: u64, patch: &CatPatch) -> Result<Cat, ApiError>;

    /// Most recent first.
    async fn get_health_logs(&self, cat_id: u64) -> Result<Vec<HealthLog>, ApiError>;

    async fn add_health_log(&self, cat_id: u64, log: &NewHealthLog) -> Result<HealthLog, ApiError>;

    /// Most recent first.
    async fn get_enrichment_activities(&self, cat_id: u64) -> Result<Vec<EnrichmentActivity>, ApiError>;

    async fn add_enrichment_activity(
        &self,
        cat_id: u64,
        activity: &NewEnrichmentActivity,
    ) -> Result<EnrichmentActivity, ApiError>;

    async fn get_enrichment_suggestions(&self, cat_id: u64) -> Result<Vec<EnrichmentSuggestion>, ApiError>;
}

/// Compose the facade for this process.
///
/// `token` is attached as a bearer credential by the HTTP transport; the mock
/// ignores it.
pub fn connect(config: &ClientConfig, token: Option<&str>) -> Result<Arc<dyn ServiceFacade>, ApiError> {
    if config.use_mock_api {
        tracing::info!("using in-memory mock provider");
        let store = Arc::new(MockStore::seeded());
        return Ok(Arc::new(MockProvider::new(store, config.mock_latency)));
    }
    tracing::info!(base_url = %config.api_base_url, "using HTTP transport");
    let mut adapter = TransportAdapter::new(&config.api_base_url, config.request_timeout)?;
    if let Some(token) = token {
        adapter = adapter.with_token(token);
    }
    Ok(Arc::new(adapter))
}
