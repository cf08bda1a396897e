//! Data-access core for the pawlog cat-care client.
//!
//! # Overview
//! Callers read and write users, cats, health logs and enrichment records
//! through one `ServiceFacade`, backed either by the HTTP backend
//! (`TransportAdapter`) or by an in-memory store (`MockProvider`). Reads go
//! through `QueryClient`, which caches per key, shares in-flight requests and
//! invalidates the affected keys after writes.
//!
//! # Design
//! - `PawlogClient` builds `HttpRequest`s and parses `HttpResponse`s without
//!   I/O; `TransportAdapter` executes them with `reqwest`.
//! - The provider is chosen once by `facade::connect` from `ClientConfig`.
//! - Both providers report failures with the same `ApiError` variants and
//!   status codes.
//! - DTOs are plain serde types with camelCase wire names.

pub mod client;
pub mod config;
pub mod error;
pub mod facade;
pub mod http;
pub mod mock;
pub mod query;
pub mod session;
pub mod transport;
pub mod types;

pub use client::PawlogClient;
pub use config::ClientConfig;
pub use error::ApiError;
pub use facade::{connect, ServiceFacade};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use mock::{MockLatency, MockProvider, MockStore, MOCK_TOKEN};
pub use query::{QueryClient, QueryData, QueryKey, QueryKind, QuerySnapshot, QueryStatus};
pub use session::{FileSessionStore, MemorySessionStore, Session, SessionStore};
pub use transport::TransportAdapter;
pub use types::{
    AuthResponse, Cat, CatPatch, EnrichmentActivity, EnrichmentSuggestion, ErrorBody, HealthLog,
    LoginRequest, NewEnrichmentActivity, NewHealthLog, SignupRequest, User, UserPatch,
};
