//! Request cache layered over a `ServiceFacade`.
//!
//! # Design
//! Every read is addressed by a `QueryKey` (operation plus the id it is
//! scoped to). The cache is an explicit `QueryKey -> Entry` map where each
//! entry records status, last good data, last error, a stale flag and, while
//! a fetch runs, the shared in-flight future.
//!
//! - Reads served from a fresh success or error entry never reach the facade.
//! - Overlapping reads for one key await the same `Shared` future, so the
//!   facade is called once and every caller sees the same value or error.
//! - Writes invalidate only the keys they can change (the list under the same
//!   cat, or the updated entity).
//! - Fetches run as spawned tasks. Dropping the caller's future does not
//!   cancel them and their result is still committed, unless the key was
//!   invalidated or cleared meanwhile; then the result is discarded and the
//!   next read fetches again.
//!
//! The map lock is never held across an `.await`.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;

use crate::error::ApiError;
use crate::facade::ServiceFacade;
use crate::types::{
    Cat, CatPatch, EnrichmentActivity, EnrichmentSuggestion, HealthLog, NewEnrichmentActivity,
    NewHealthLog, User, UserPatch,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QueryKind {
    User,
    Cat,
    HealthLogs,
    EnrichmentActivities,
    EnrichmentSuggestions,
}

impl QueryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            QueryKind::User => "user",
            QueryKind::Cat => "cat",
            QueryKind::HealthLogs => "healthLogs",
            QueryKind::EnrichmentActivities => "enrichmentActivities",
            QueryKind::EnrichmentSuggestions => "enrichmentSuggestions",
        }
    }
}

/// Composite cache key, e.g. `["healthLogs", 7]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey {
    pub kind: QueryKind,
    /// Entity id for `User`/`Cat`, parent cat id for the list kinds.
    pub id: u64,
}

impl QueryKey {
    pub fn user(id: u64) -> Self {
        Self { kind: QueryKind::User, id }
    }

    pub fn cat(id: u64) -> Self {
        Self { kind: QueryKind::Cat, id }
    }

    pub fn health_logs(cat_id: u64) -> Self {
        Self {
            kind: QueryKind::HealthLogs,
            id: cat_id,
        }
    }

    pub fn enrichment_activities(cat_id: u64) -> Self {
        Self {
            kind: QueryKind::EnrichmentActivities,
            id: cat_id,
        }
    }

    pub fn enrichment_suggestions(cat_id: u64) -> Self {
        Self {
            kind: QueryKind::EnrichmentSuggestions,
            id: cat_id,
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[\"{}\", {}]", self.kind.as_str(), self.id)
    }
}

/// A cached result. One variant per `QueryKind`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryData {
    User(User),
    Cat(Cat),
    HealthLogs(Vec<HealthLog>),
    EnrichmentActivities(Vec<EnrichmentActivity>),
    EnrichmentSuggestions(Vec<EnrichmentSuggestion>),
}

macro_rules! query_data_conversion {
    ($variant:ident, $ty:ty) => {
        impl TryFrom<QueryData> for $ty {
            type Error = ApiError;

            fn try_from(data: QueryData) -> Result<Self, ApiError> {
                match data {
                    QueryData::$variant(value) => Ok(value),
                    other => Err(ApiError::Deserialization(format!(
                        "cached data has unexpected shape: {other:?}"
                    ))),
                }
            }
        }
    };
}

query_data_conversion!(User, User);
query_data_conversion!(Cat, Cat);
query_data_conversion!(HealthLogs, Vec<HealthLog>);
query_data_conversion!(EnrichmentActivities, Vec<EnrichmentActivity>);
query_data_conversion!(EnrichmentSuggestions, Vec<EnrichmentSuggestion>);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

/// Observable state of one key.
///
/// `data` keeps the last successful result even while a refetch is loading
/// or after a failed refetch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QuerySnapshot {
    pub status: QueryStatus,
    pub data: Option<QueryData>,
    pub error: Option<ApiError>,
    pub stale: bool,
}

type SharedFetch = Shared<BoxFuture<'static, Result<QueryData, ApiError>>>;

#[derive(Default)]
struct Entry {
    snapshot: QuerySnapshot,
    /// Stamp of the current fetch, drawn from `Inner::generations`. A fetch
    /// commits only if the entry still carries its stamp.
    generation: u64,
    in_flight: Option<SharedFetch>,
}

struct Inner {
    facade: Arc<dyn ServiceFacade>,
    entries: Mutex<HashMap<QueryKey, Entry>>,
    /// Only ever increases, so stamps stay unique across `clear`.
    generations: AtomicU64,
}

impl Inner {
    fn next_generation(&self) -> u64 {
        self.generations.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn commit(&self, key: QueryKey, generation: u64, result: &Result<QueryData, ApiError>) {
        let mut entries = self.entries.lock();
        let Some(entry) = entries.get_mut(&key) else {
            tracing::debug!(%key, "query result discarded: entry removed");
            return;
        };
        if entry.generation != generation {
            tracing::debug!(%key, "query result discarded: superseded while in flight");
            return;
        }
        entry.in_flight = None;
        entry.snapshot.stale = false;
        match result {
            Ok(data) => {
                tracing::debug!(%key, "query succeeded");
                entry.snapshot.status = QueryStatus::Success;
                entry.snapshot.data = Some(data.clone());
                entry.snapshot.error = None;
            }
            Err(err) => {
                tracing::debug!(%key, error = %err, "query failed");
                entry.snapshot.status = QueryStatus::Error;
                entry.snapshot.error = Some(err.clone());
            }
        }
    }
}

/// Cached, de-duplicating front for a `ServiceFacade`.
#[derive(Clone)]
pub struct QueryClient {
    inner: Arc<Inner>,
}

impl fmt::Debug for QueryClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryClient")
            .field("entries", &self.inner.entries.lock().len())
            .finish()
    }
}

impl QueryClient {
    pub fn new(facade: Arc<dyn ServiceFacade>) -> Self {
        Self {
            inner: Arc::new(Inner {
                facade,
                entries: Mutex::new(HashMap::new()),
                generations: AtomicU64::new(0),
            }),
        }
    }

    /// The underlying facade, for uncached operations such as login.
    pub fn facade(&self) -> &Arc<dyn ServiceFacade> {
        &self.inner.facade
    }

    pub async fn user(&self, id: u64) -> Result<User, ApiError> {
        self.read(QueryKey::user(id)).await
    }

    pub async fn cat(&self, id: u64) -> Result<Cat, ApiError> {
        self.read(QueryKey::cat(id)).await
    }

    pub async fn health_logs(&self, cat_id: u64) -> Result<Vec<HealthLog>, ApiError> {
        self.read(QueryKey::health_logs(cat_id)).await
    }

    pub async fn enrichment_activities(&self, cat_id: u64) -> Result<Vec<EnrichmentActivity>, ApiError> {
        self.read(QueryKey::enrichment_activities(cat_id)).await
    }

    pub async fn enrichment_suggestions(&self, cat_id: u64) -> Result<Vec<EnrichmentSuggestion>, ApiError> {
        self.read(QueryKey::enrichment_suggestions(cat_id)).await
    }

    /// Read through the cache and convert to the key's record type.
    pub async fn read<T>(&self, key: QueryKey) -> Result<T, ApiError>
    where
        T: TryFrom<QueryData, Error = ApiError>,
    {
        self.fetch(key, false).await.and_then(T::try_from)
    }

    /// Fetch `key` again even if a fresh result is cached. Joins an
    /// in-flight fetch instead of starting a second one.
    pub async fn refetch(&self, key: QueryKey) -> Result<QueryData, ApiError> {
        self.fetch(key, true).await
    }

    pub async fn add_health_log(&self, cat_id: u64, log: &NewHealthLog) -> Result<HealthLog, ApiError> {
        let log = self.inner.facade.add_health_log(cat_id, log).await?;
        self.invalidate(&QueryKey::health_logs(cat_id));
        Ok(log)
    }

    pub async fn add_enrichment_activity(
        &self,
        cat_id: u64,
        activity: &NewEnrichmentActivity,
    ) -> Result<EnrichmentActivity, ApiError> {
        let activity = self
            .inner
            .facade
            .add_enrichment_activity(cat_id, activity)
            .await?;
        self.invalidate(&QueryKey::enrichment_activities(cat_id));
        Ok(activity)
    }

    pub async fn update_cat(&self, id: u64, patch: &CatPatch) -> Result<Cat, ApiError> {
        let cat = self.inner.facade.update_cat(id, patch).await?;
        self.invalidate(&QueryKey::cat(id));
        Ok(cat)
    }

    pub async fn update_user(&self, id: u64, patch: &UserPatch) -> Result<User, ApiError> {
        let user = self.inner.facade.update_user(id, patch).await?;
        self.invalidate(&QueryKey::user(id));
        Ok(user)
    }

    /// Current state of `key`; `Idle` if it was never requested.
    pub fn snapshot(&self, key: &QueryKey) -> QuerySnapshot {
        self.inner
            .entries
            .lock()
            .get(key)
            .map(|entry| entry.snapshot.clone())
            .unwrap_or_default()
    }

    /// Mark `key` stale. Returns the number of entries affected (0 or 1).
    pub fn invalidate(&self, key: &QueryKey) -> usize {
        self.invalidate_where(|candidate| candidate == key)
    }

    /// Mark every cached key matching `predicate` stale and detach any fetch
    /// in flight for it.
    pub fn invalidate_where<P>(&self, predicate: P) -> usize
    where
        P: Fn(&QueryKey) -> bool,
    {
        let mut entries = self.inner.entries.lock();
        let mut count = 0;
        for (key, entry) in entries.iter_mut() {
            if !predicate(key) {
                continue;
            }
            entry.snapshot.stale = true;
            entry.generation = self.inner.next_generation();
            if entry.in_flight.take().is_some() {
                entry.snapshot.status = if entry.snapshot.data.is_some() {
                    QueryStatus::Success
                } else {
                    QueryStatus::Idle
                };
            }
            tracing::debug!(%key, "query invalidated");
            count += 1;
        }
        count
    }

    /// Drop every cached entry, e.g. on logout.
    pub fn clear(&self) {
        self.inner.entries.lock().clear();
    }

    async fn fetch(&self, key: QueryKey, force: bool) -> Result<QueryData, ApiError> {
        let pending = {
            let mut entries = self.inner.entries.lock();
            let entry = entries.entry(key).or_default();
            if let Some(pending) = &entry.in_flight {
                tracing::debug!(%key, "joining in-flight query");
                pending.clone()
            } else {
                if !force && !entry.snapshot.stale {
                    if let Some(cached) = cached_result(&entry.snapshot) {
                        tracing::debug!(%key, "query cache hit");
                        return cached;
                    }
                }
                self.start(key, entry)
            }
        };
        pending.await
    }

    fn start(&self, key: QueryKey, entry: &mut Entry) -> SharedFetch {
        tracing::debug!(%key, "query loading");
        entry.snapshot.status = QueryStatus::Loading;
        let generation = self.inner.next_generation();
        entry.generation = generation;
        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(async move {
            let result = run_query(inner.facade.as_ref(), key).await;
            inner.commit(key, generation, &result);
            result
        });
        let pending = async move {
            task.await
                .unwrap_or_else(|e| Err(ApiError::Network(format!("query task failed: {e}"))))
        }
        .boxed()
        .shared();
        entry.in_flight = Some(pending.clone());
        pending
    }
}

/// A settled entry answers reads until it is invalidated.
fn cached_result(snapshot: &QuerySnapshot) -> Option<Result<QueryData, ApiError>> {
    match snapshot.status {
        QueryStatus::Success => snapshot.data.clone().map(Ok),
        QueryStatus::Error => snapshot.error.clone().map(Err),
        QueryStatus::Idle | QueryStatus::Loading => None,
    }
}

async fn run_query(facade: &dyn ServiceFacade, key: QueryKey) -> Result<QueryData, ApiError> {
    match key.kind {
        QueryKind::User => facade.get_user(key.id).await.map(QueryData::User),
        QueryKind::Cat => facade.get_cat(key.id).await.map(QueryData::Cat),
        QueryKind::HealthLogs => facade
            .get_health_logs(key.id)
            .await
            .map(QueryData::HealthLogs),
        QueryKind::EnrichmentActivities => facade
            .get_enrichment_activities(key.id)
            .await
            .map(QueryData::EnrichmentActivities),
        QueryKind::EnrichmentSuggestions => facade
            .get_enrichment_suggestions(key.id)
            .await
            .map(QueryData::EnrichmentSuggestions),
    }
}
