//! In-memory stand-in for the pawlog backend.
//!
//! # Design
//! `MockStore` owns all records behind one async `RwLock` and is shared by
//! `Arc`; each test can build its own isolated store. `MockProvider` sleeps
//! before every operation so callers see realistic loading states, then
//! applies the same validation and status codes the real backend uses.
//!
//! Health logs and enrichment activities are kept per cat, newest first.
//! New identifiers are one past the largest identifier in the collection, so
//! they stay unique even if records are added out of order.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;

use crate::error::ApiError;
use crate::facade::ServiceFacade;
use crate::types::{
    AuthResponse, Cat, CatPatch, EnrichmentActivity, EnrichmentSuggestion, HealthLog,
    NewEnrichmentActivity, NewHealthLog, SignupRequest, User, UserPatch,
};

/// Token handed out by mock login and signup.
pub const MOCK_TOKEN: &str = "mock-token";

/// Simulated network delay per operation class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockLatency {
    /// login and signup
    pub auth: Duration,
    /// update_user and update_cat
    pub update: Duration,
    /// get_user and get_cat
    pub lookup: Duration,
    /// list reads and adds
    pub list: Duration,
}

impl MockLatency {
    pub fn realistic() -> Self {
        Self {
            auth: Duration::from_millis(500),
            update: Duration::from_millis(500),
            lookup: Duration::from_millis(300),
            list: Duration::from_millis(200),
        }
    }

    pub fn none() -> Self {
        Self {
            auth: Duration::ZERO,
            update: Duration::ZERO,
            lookup: Duration::ZERO,
            list: Duration::ZERO,
        }
    }
}

impl Default for MockLatency {
    fn default() -> Self {
        Self::realistic()
    }
}

/// Raw collections held by a `MockStore`.
#[derive(Debug, Clone, Default)]
pub struct MockData {
    pub users: Vec<User>,
    pub cats: Vec<Cat>,
    pub health_logs: HashMap<u64, Vec<HealthLog>>,
    pub enrichment_activities: HashMap<u64, Vec<EnrichmentActivity>>,
    pub enrichment_suggestions: Vec<EnrichmentSuggestion>,
}

impl MockData {
    fn cat_exists(&self, cat_id: u64) -> Result<(), ApiError> {
        if self.cats.iter().any(|c| c.id == cat_id) {
            Ok(())
        } else {
            Err(cat_not_found())
        }
    }

    fn next_health_log_id(&self) -> u64 {
        self.health_logs
            .values()
            .flatten()
            .map(|l| l.id)
            .max()
            .unwrap_or(0)
            + 1
    }

    fn next_activity_id(&self) -> u64 {
        self.enrichment_activities
            .values()
            .flatten()
            .map(|a| a.id)
            .max()
            .unwrap_or(0)
            + 1
    }
}

/// Process-local record store with an explicit lifecycle.
#[derive(Debug, Default)]
pub struct MockStore {
    data: RwLock<MockData>,
}

impl MockStore {
    pub fn new(data: MockData) -> Self {
        Self {
            data: RwLock::new(data),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Store pre-populated with the development dataset.
    pub fn seeded() -> Self {
        Self::new(seed_data())
    }

    /// Copy of the current contents.
    pub async fn snapshot(&self) -> MockData {
        self.data.read().await.clone()
    }
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

fn seed_data() -> MockData {
    let users = vec![
        User {
            id: 1,
            name: "John Doe".to_string(),
            email: "john@example.com".to_string(),
            password: Some("cat123".to_string()),
        },
        User {
            id: 2,
            name: "Jane Smith".to_string(),
            email: "jane@example.com".to_string(),
            password: Some("meowmeow".to_string()),
        },
    ];
    let cats = vec![
        Cat {
            id: 1,
            name: "Whiskers".to_string(),
            birth_date: date(2020, 5, 15),
            breed: "Domestic Shorthair".to_string(),
            temperament: vec!["calm".to_string(), "affectionate".to_string()],
            profile_picture: "https://images.freeimages.com/images/large-previews/855/adorable-striped-cat-0410-5697589.jpg".to_string(),
        },
        Cat {
            id: 2,
            name: "Mittens".to_string(),
            birth_date: date(2018, 12, 1),
            breed: "Siamese".to_string(),
            temperament: vec!["wary".to_string(), "energetic".to_string()],
            profile_picture: "https://images.freeimages.com/images/premium/previews/1822/18227379-cat.jpg".to_string(),
        },
    ];
    let health_logs = HashMap::from([(
        1,
        vec![
            HealthLog {
                id: 1,
                date: date(2023, 11, 15),
                litter_box_habits: "Normal".to_string(),
                energy_level: 4,
                skin_condition: "Healthy".to_string(),
                notes: "Everything seems normal".to_string(),
            },
            HealthLog {
                id: 2,
                date: date(2023, 11, 10),
                litter_box_habits: "Slightly less frequent".to_string(),
                energy_level: 3,
                skin_condition: "Healthy".to_string(),
                notes: "Ate slightly less today".to_string(),
            },
        ],
    )]);
    let enrichment_activities = HashMap::from([(
        1,
        vec![
            EnrichmentActivity {
                id: 1,
                name: "Feather Wand".to_string(),
                description: "Interactive play with feather wand toy".to_string(),
                last_tried: Some(date(2023, 11, 14)),
                enjoyment_rating: Some(5),
            },
            EnrichmentActivity {
                id: 2,
                name: "Puzzle Feeder".to_string(),
                description: "Food dispensing puzzle toy".to_string(),
                last_tried: Some(date(2023, 11, 12)),
                enjoyment_rating: Some(4),
            },
        ],
    )]);
    let enrichment_suggestions = vec![
        EnrichmentSuggestion {
            id: 1,
            name: "Cardboard Box Fort".to_string(),
            description: "Create a small fort with cardboard boxes".to_string(),
            reason: "Your cat enjoys hiding and exploring small spaces".to_string(),
        },
        EnrichmentSuggestion {
            id: 2,
            name: "Window Perch".to_string(),
            description: "Set up a perch by a window with bird feeder outside".to_string(),
            reason: "Your cat shows interest in watching birds".to_string(),
        },
        EnrichmentSuggestion {
            id: 3,
            name: "Treat Hunt".to_string(),
            description: "Hide treats around the house for your cat to find".to_string(),
            reason: "Encourages natural hunting behaviors".to_string(),
        },
    ];
    MockData {
        users,
        cats,
        health_logs,
        enrichment_activities,
        enrichment_suggestions,
    }
}

fn user_not_found() -> ApiError {
    ApiError::not_found("User not found")
}

fn cat_not_found() -> ApiError {
    ApiError::not_found("Cat not found")
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// `ServiceFacade` over a `MockStore`.
#[derive(Debug, Clone)]
pub struct MockProvider {
    store: Arc<MockStore>,
    latency: MockLatency,
}

impl MockProvider {
    pub fn new(store: Arc<MockStore>, latency: MockLatency) -> Self {
        Self { store, latency }
    }

    pub fn store(&self) -> &Arc<MockStore> {
        &self.store
    }

    async fn pause(&self, delay: Duration) {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl ServiceFacade for MockProvider {
    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        self.pause(self.latency.auth).await;
        let data = self.store.data.read().await;
        let user = data
            .users
            .iter()
            .find(|u| u.email == email && u.password.as_deref() == Some(password))
            .ok_or_else(|| ApiError::auth("Invalid credentials"))?;
        tracing::debug!(user_id = user.id, "mock login");
        Ok(AuthResponse {
            token: MOCK_TOKEN.to_string(),
            user: user.sanitized(),
        })
    }

    async fn signup(&self, input: &SignupRequest) -> Result<AuthResponse, ApiError> {
        self.pause(self.latency.auth).await;
        if [&input.name, &input.email, &input.password, &input.password_confirmation]
            .into_iter()
            .any(|field| is_blank(field))
        {
            return Err(ApiError::validation("All fields are required"));
        }
        if input.password != input.password_confirmation {
            return Err(ApiError::validation("Passwords do not match"));
        }

        let mut data = self.store.data.write().await;
        if data.users.iter().any(|u| u.email == input.email) {
            return Err(ApiError::conflict("Email already registered"));
        }
        let id = data.users.iter().map(|u| u.id).max().unwrap_or(0) + 1;
        let user = User {
            id,
            name: input.name.clone(),
            email: input.email.clone(),
            password: Some(input.password.clone()),
        };
        let sanitized = user.sanitized();
        data.users.push(user);
        tracing::debug!(user_id = id, "mock signup");
        Ok(AuthResponse {
            token: MOCK_TOKEN.to_string(),
            user: sanitized,
        })
    }

    async fn get_user(&self, id: u64) -> Result<User, ApiError> {
        self.pause(self.latency.lookup).await;
        let data = self.store.data.read().await;
        data.users
            .iter()
            .find(|u| u.id == id)
            .map(User::sanitized)
            .ok_or_else(user_not_found)
    }

    async fn update_user(&self, id: u64, patch: &UserPatch) -> Result<User, ApiError> {
        self.pause(self.latency.update).await;
        let mut data = self.store.data.write().await;
        let user = data
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(user_not_found)?;
        patch.clone().apply(user);
        Ok(user.sanitized())
    }

    async fn get_cat(&self, id: u64) -> Result<Cat, ApiError> {
        self.pause(self.latency.lookup).await;
        let data = self.store.data.read().await;
        data.cats
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(cat_not_found)
    }

    async fn update_cat(&self, id: u64, patch: &CatPatch) -> Result<Cat, ApiError> {
        self.pause(self.latency.update).await;
        let mut data = self.store.data.write().await;
        let cat = data
            .cats
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(cat_not_found)?;
        patch.clone().apply(cat);
        Ok(cat.clone())
    }

    async fn get_health_logs(&self, cat_id: u64) -> Result<Vec<HealthLog>, ApiError> {
        self.pause(self.latency.list).await;
        let data = self.store.data.read().await;
        data.cat_exists(cat_id)?;
        Ok(data.health_logs.get(&cat_id).cloned().unwrap_or_default())
    }

    async fn add_health_log(&self, cat_id: u64, log: &NewHealthLog) -> Result<HealthLog, ApiError> {
        self.pause(self.latency.list).await;
        let mut data = self.store.data.write().await;
        data.cat_exists(cat_id)?;
        let log = log.clone().with_id(data.next_health_log_id());
        data.health_logs.entry(cat_id).or_default().insert(0, log.clone());
        tracing::debug!(cat_id, log_id = log.id, "mock health log added");
        Ok(log)
    }

    async fn get_enrichment_activities(&self, cat_id: u64) -> Result<Vec<EnrichmentActivity>, ApiError> {
        self.pause(self.latency.list).await;
        let data = self.store.data.read().await;
        data.cat_exists(cat_id)?;
        Ok(data
            .enrichment_activities
            .get(&cat_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn add_enrichment_activity(
        &self,
        cat_id: u64,
        activity: &NewEnrichmentActivity,
    ) -> Result<EnrichmentActivity, ApiError> {
        self.pause(self.latency.list).await;
        let mut data = self.store.data.write().await;
        data.cat_exists(cat_id)?;
        let activity = activity.clone().with_id(data.next_activity_id());
        data.enrichment_activities
            .entry(cat_id)
            .or_default()
            .insert(0, activity.clone());
        tracing::debug!(cat_id, activity_id = activity.id, "mock enrichment activity added");
        Ok(activity)
    }

    async fn get_enrichment_suggestions(&self, cat_id: u64) -> Result<Vec<EnrichmentSuggestion>, ApiError> {
        self.pause(self.latency.list).await;
        let data = self.store.data.read().await;
        data.cat_exists(cat_id)?;
        Ok(data.enrichment_suggestions.clone())
    }
}
