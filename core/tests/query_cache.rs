//! Caching, de-duplication and invalidation in `QueryClient`.
//!
//! Time is paused in these tests so the mock's simulated latency keeps
//! requests in flight deterministically until the runtime is idle.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use futures_util::FutureExt;
use pawlog_core::mock::MockData;
use pawlog_core::{
    ApiError, AuthResponse, Cat, CatPatch, EnrichmentActivity, EnrichmentSuggestion, HealthLog,
    MockLatency, MockProvider, MockStore, NewEnrichmentActivity, NewHealthLog, QueryClient,
    QueryData, QueryKey, QueryKind, QueryStatus, ServiceFacade, SignupRequest, User, UserPatch,
};

/// Delegates to a `MockProvider` and counts calls per operation.
struct CountingFacade {
    inner: MockProvider,
    calls: HashMap<&'static str, AtomicUsize>,
}

impl CountingFacade {
    fn new(store: MockStore, latency: MockLatency) -> Self {
        let calls = [
            "get_user",
            "get_cat",
            "get_health_logs",
            "get_enrichment_activities",
            "get_enrichment_suggestions",
        ]
        .into_iter()
        .map(|name| (name, AtomicUsize::new(0)))
        .collect();
        Self {
            inner: MockProvider::new(Arc::new(store), latency),
            calls,
        }
    }

    fn record(&self, name: &'static str) {
        if let Some(counter) = self.calls.get(name) {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn calls(&self, name: &str) -> usize {
        self.calls[name].load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ServiceFacade for CountingFacade {
    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        self.inner.login(email, password).await
    }

    async fn signup(&self, input: &SignupRequest) -> Result<AuthResponse, ApiError> {
        self.inner.signup(input).await
    }

    async fn get_user(&self, id: u64) -> Result<User, ApiError> {
        self.record("get_user");
        self.inner.get_user(id).await
    }

    async fn update_user(&self, id: u64, patch: &UserPatch) -> Result<User, ApiError> {
        self.inner.update_user(id, patch).await
    }

    async fn get_cat(&self, id: u64) -> Result<Cat, ApiError> {
        self.record("get_cat");
        self.inner.get_cat(id).await
    }

    async fn update_cat(&self, id: u64, patch: &CatPatch) -> Result<Cat, ApiError> {
        self.inner.update_cat(id, patch).await
    }

    async fn get_health_logs(&self, cat_id: u64) -> Result<Vec<HealthLog>, ApiError> {
        self.record("get_health_logs");
        self.inner.get_health_logs(cat_id).await
    }

    async fn add_health_log(&self, cat_id: u64, log: &NewHealthLog) -> Result<HealthLog, ApiError> {
        self.inner.add_health_log(cat_id, log).await
    }

    async fn get_enrichment_activities(&self, cat_id: u64) -> Result<Vec<EnrichmentActivity>, ApiError> {
        self.record("get_enrichment_activities");
        self.inner.get_enrichment_activities(cat_id).await
    }

    async fn add_enrichment_activity(
        &self,
        cat_id: u64,
        activity: &NewEnrichmentActivity,
    ) -> Result<EnrichmentActivity, ApiError> {
        self.inner.add_enrichment_activity(cat_id, activity).await
    }

    async fn get_enrichment_suggestions(&self, cat_id: u64) -> Result<Vec<EnrichmentSuggestion>, ApiError> {
        self.record("get_enrichment_suggestions");
        self.inner.get_enrichment_suggestions(cat_id).await
    }
}

fn client_with(store: MockStore) -> (QueryClient, Arc<CountingFacade>) {
    let facade = Arc::new(CountingFacade::new(store, MockLatency::realistic()));
    (QueryClient::new(facade.clone()), facade)
}

fn seeded() -> (QueryClient, Arc<CountingFacade>) {
    client_with(MockStore::seeded())
}

fn cat(id: u64, name: &str) -> Cat {
    Cat {
        id,
        name: name.to_string(),
        birth_date: NaiveDate::from_ymd_opt(2021, 3, 4).unwrap(),
        breed: "Tabby".to_string(),
        temperament: vec!["curious".to_string()],
        profile_picture: String::new(),
    }
}

/// Store with cats 7 and 8 and no logs.
fn two_cats() -> MockStore {
    MockStore::new(MockData {
        cats: vec![cat(7, "Pepper"), cat(8, "Salt")],
        ..MockData::default()
    })
}

fn new_log() -> NewHealthLog {
    NewHealthLog {
        date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        litter_box_habits: "Normal".to_string(),
        energy_level: 4,
        skin_condition: "Healthy".to_string(),
        notes: "Morning check".to_string(),
    }
}

// --- de-duplication ---

#[tokio::test(start_paused = true)]
async fn concurrent_reads_share_one_request() {
    let (client, facade) = client_with(two_cats());
    let (a, b) = tokio::join!(client.cat(7), client.cat(7));
    assert_eq!(a.unwrap(), b.unwrap());
    assert_eq!(facade.calls("get_cat"), 1);
}

#[tokio::test(start_paused = true)]
async fn concurrent_failing_reads_share_one_error() {
    let (client, facade) = seeded();
    let (a, b) = tokio::join!(client.cat(7), client.cat(7));
    let (a, b) = (a.unwrap_err(), b.unwrap_err());
    assert_eq!(a, b);
    assert_eq!(a, ApiError::not_found("Cat not found"));
    assert_eq!(facade.calls("get_cat"), 1);
}

#[tokio::test(start_paused = true)]
async fn refetch_joins_in_flight_request() {
    let (client, facade) = seeded();
    let (read, refetched) = tokio::join!(client.cat(1), client.refetch(QueryKey::cat(1)));
    assert_eq!(QueryData::Cat(read.unwrap()), refetched.unwrap());
    assert_eq!(facade.calls("get_cat"), 1);
}

// --- state machine ---

#[tokio::test(start_paused = true)]
async fn status_moves_from_idle_through_loading_to_success() {
    let (client, _) = seeded();
    let key = QueryKey::cat(1);
    assert_eq!(client.snapshot(&key).status, QueryStatus::Idle);

    // Poll once: the fetch starts but the simulated latency keeps it pending.
    assert!(client.cat(1).now_or_never().is_none());
    assert_eq!(client.snapshot(&key).status, QueryStatus::Loading);

    let cat = client.cat(1).await.unwrap();
    let snapshot = client.snapshot(&key);
    assert_eq!(snapshot.status, QueryStatus::Success);
    assert_eq!(snapshot.data, Some(QueryData::Cat(cat)));
    assert!(snapshot.error.is_none());
    assert!(!snapshot.stale);
}

#[tokio::test(start_paused = true)]
async fn abandoned_read_still_commits() {
    let (client, facade) = seeded();
    assert!(client.health_logs(1).now_or_never().is_none());

    // Let the spawned fetch finish with no caller waiting on it.
    tokio::time::sleep(std::time::Duration::from_secs(1)).await;
    assert_eq!(
        client.snapshot(&QueryKey::health_logs(1)).status,
        QueryStatus::Success
    );

    client.health_logs(1).await.unwrap();
    assert_eq!(facade.calls("get_health_logs"), 1);
}

#[tokio::test(start_paused = true)]
async fn fresh_results_are_served_from_cache() {
    let (client, facade) = seeded();
    let first = client.enrichment_suggestions(1).await.unwrap();
    let second = client.enrichment_suggestions(1).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(facade.calls("get_enrichment_suggestions"), 1);
}

#[tokio::test(start_paused = true)]
async fn errors_persist_until_refetched() {
    let (client, facade) = seeded();
    let key = QueryKey::cat(999);

    let err = client.cat(999).await.unwrap_err();
    assert_eq!(err.message(), "Cat not found");
    assert_eq!(client.snapshot(&key).status, QueryStatus::Error);
    assert_eq!(client.snapshot(&key).error, Some(err.clone()));

    assert_eq!(client.cat(999).await.unwrap_err(), err);
    assert_eq!(facade.calls("get_cat"), 1);

    assert!(client.refetch(key).await.is_err());
    assert_eq!(facade.calls("get_cat"), 2);
}

// --- invalidation ---

#[tokio::test(start_paused = true)]
async fn adding_a_log_invalidates_only_that_cats_list() {
    let (client, facade) = client_with(two_cats());
    assert!(client.health_logs(7).await.unwrap().is_empty());
    assert!(client.health_logs(8).await.unwrap().is_empty());
    assert_eq!(facade.calls("get_health_logs"), 2);

    let added = client.add_health_log(7, &new_log()).await.unwrap();
    assert!(client.snapshot(&QueryKey::health_logs(7)).stale);
    let untouched = client.snapshot(&QueryKey::health_logs(8));
    assert!(!untouched.stale);
    assert_eq!(untouched.data, Some(QueryData::HealthLogs(Vec::new())));

    let logs = client.health_logs(7).await.unwrap();
    assert_eq!(logs, vec![added]);
    client.health_logs(8).await.unwrap();
    assert_eq!(facade.calls("get_health_logs"), 3);
}

#[tokio::test(start_paused = true)]
async fn explicit_invalidation_is_scoped_to_key() {
    let (client, facade) = client_with(two_cats());
    client.health_logs(7).await.unwrap();
    client.health_logs(8).await.unwrap();

    assert_eq!(client.invalidate(&QueryKey::health_logs(7)), 1);
    assert_eq!(client.snapshot(&QueryKey::health_logs(7)).status, QueryStatus::Success);

    client.health_logs(8).await.unwrap();
    assert_eq!(facade.calls("get_health_logs"), 2);
    client.health_logs(7).await.unwrap();
    assert_eq!(facade.calls("get_health_logs"), 3);
}

#[tokio::test(start_paused = true)]
async fn adding_an_activity_refreshes_activity_list() {
    let (client, facade) = seeded();
    assert_eq!(client.enrichment_activities(1).await.unwrap().len(), 2);

    let activity = NewEnrichmentActivity {
        name: "Cat Tunnel".to_string(),
        description: "Collapsible play tunnel".to_string(),
        last_tried: None,
        enjoyment_rating: Some(3),
    };
    let added = client.add_enrichment_activity(1, &activity).await.unwrap();
    let list = client.enrichment_activities(1).await.unwrap();
    assert_eq!(list.len(), 3);
    assert_eq!(list[0], added);
    assert_eq!(facade.calls("get_enrichment_activities"), 2);
}

#[tokio::test(start_paused = true)]
async fn failed_write_does_not_invalidate() {
    let (client, _) = seeded();
    client.health_logs(1).await.unwrap();
    assert!(client.add_health_log(999, &new_log()).await.is_err());
    assert!(!client.snapshot(&QueryKey::health_logs(1)).stale);
}

#[tokio::test(start_paused = true)]
async fn update_cat_invalidates_cat_key() {
    let (client, facade) = seeded();
    client.cat(1).await.unwrap();

    let patch = CatPatch {
        breed: Some("Tabby".to_string()),
        ..CatPatch::default()
    };
    client.update_cat(1, &patch).await.unwrap();
    let cat = client.cat(1).await.unwrap();
    assert_eq!(cat.breed, "Tabby");
    assert_eq!(cat.name, "Whiskers");
    assert_eq!(facade.calls("get_cat"), 2);
}

#[tokio::test(start_paused = true)]
async fn update_user_invalidates_user_key() {
    let (client, facade) = seeded();
    assert_eq!(client.user(2).await.unwrap().name, "Jane Smith");
    let patch = UserPatch {
        name: Some("Jane Doe".to_string()),
        ..UserPatch::default()
    };
    client.update_user(2, &patch).await.unwrap();
    assert_eq!(client.user(2).await.unwrap().name, "Jane Doe");
    assert_eq!(facade.calls("get_user"), 2);
}

#[tokio::test(start_paused = true)]
async fn invalidate_where_matches_predicate() {
    let (client, _) = seeded();
    client.cat(1).await.unwrap();
    client.health_logs(1).await.unwrap();
    client.enrichment_activities(1).await.unwrap();
    client.health_logs(2).await.unwrap();

    let count = client.invalidate_where(|key| key.id == 1 && key.kind != QueryKind::Cat);
    assert_eq!(count, 2);
    assert!(!client.snapshot(&QueryKey::cat(1)).stale);
    assert!(client.snapshot(&QueryKey::health_logs(1)).stale);
    assert!(client.snapshot(&QueryKey::enrichment_activities(1)).stale);
    assert!(!client.snapshot(&QueryKey::health_logs(2)).stale);
}

#[tokio::test(start_paused = true)]
async fn result_invalidated_in_flight_is_discarded() {
    let (client, facade) = seeded();
    let key = QueryKey::cat(1);
    assert!(client.cat(1).now_or_never().is_none());

    client.invalidate(&key);
    let patch = CatPatch {
        name: Some("Renamed".to_string()),
        ..CatPatch::default()
    };
    client.facade().update_cat(1, &patch).await.unwrap();

    let cat = client.cat(1).await.unwrap();
    assert_eq!(cat.name, "Renamed");
    assert_eq!(facade.calls("get_cat"), 2);

    // Give the detached first fetch time to finish; it must not overwrite.
    tokio::time::sleep(std::time::Duration::from_secs(1)).await;
    let snapshot = client.snapshot(&key);
    assert_eq!(snapshot.data, Some(QueryData::Cat(cat)));
    assert!(!snapshot.stale);
}

#[tokio::test(start_paused = true)]
async fn fetch_started_before_clear_does_not_commit() {
    let (client, facade) = seeded();
    let key = QueryKey::cat(1);
    assert!(client.cat(1).now_or_never().is_none());
    client.clear();

    // The first lookup lands at 300ms, the second at 400ms.
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    assert!(client.cat(1).now_or_never().is_none());
    tokio::time::sleep(std::time::Duration::from_millis(250)).await;

    let snapshot = client.snapshot(&key);
    assert_eq!(snapshot.status, QueryStatus::Loading);
    assert_eq!(snapshot.data, None);

    client.cat(1).await.unwrap();
    assert_eq!(client.snapshot(&key).status, QueryStatus::Success);
    assert_eq!(facade.calls("get_cat"), 2);
}

#[tokio::test(start_paused = true)]
async fn clear_forgets_everything() {
    let (client, facade) = seeded();
    client.cat(1).await.unwrap();
    client.clear();
    assert_eq!(client.snapshot(&QueryKey::cat(1)).status, QueryStatus::Idle);
    client.cat(1).await.unwrap();
    assert_eq!(facade.calls("get_cat"), 2);
}
