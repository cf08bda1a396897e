//! Persisted authentication session.
//!
//! A small string key-value store holds the token and the signed-in user
//! under fixed keys. It is read once at start-up and cleared on logout.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::error::ApiError;
use crate::types::{AuthResponse, User};

pub const AUTH_TOKEN_KEY: &str = "auth_token";
pub const AUTH_USER_KEY: &str = "auth_user";

pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, ApiError>;

    fn set(&self, key: &str, value: &str) -> Result<(), ApiError>;

    fn remove(&self, key: &str) -> Result<(), ApiError>;
}

/// Keys and values kept in a single JSON object file.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, ApiError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(err) => {
                return Err(ApiError::Session(format!(
                    "read {}: {err}",
                    self.path.display()
                )))
            }
        };
        serde_json::from_str(&raw)
            .map_err(|err| ApiError::Session(format!("parse {}: {err}", self.path.display())))
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), ApiError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|err| {
                ApiError::Session(format!("create {}: {err}", parent.display()))
            })?;
        }
        let raw = serde_json::to_string_pretty(entries)
            .map_err(|err| ApiError::Session(err.to_string()))?;
        fs::write(&self.path, raw)
            .map_err(|err| ApiError::Session(format!("write {}: {err}", self.path.display())))
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> Result<Option<String>, ApiError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ApiError> {
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), ApiError> {
        let mut entries = self.read_all()?;
        if entries.remove(key).is_some() {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Result<Option<String>, ApiError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ApiError> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), ApiError> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

/// The signed-in caregiver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user: User,
}

impl From<AuthResponse> for Session {
    fn from(auth: AuthResponse) -> Self {
        Self {
            token: auth.token,
            user: auth.user.sanitized(),
        }
    }
}

impl Session {
    /// `None` unless both keys are present.
    pub fn load(store: &dyn SessionStore) -> Result<Option<Self>, ApiError> {
        let (Some(token), Some(user)) = (store.get(AUTH_TOKEN_KEY)?, store.get(AUTH_USER_KEY)?) else {
            return Ok(None);
        };
        let user: User = serde_json::from_str(&user)
            .map_err(|err| ApiError::Session(format!("stored user is malformed: {err}")))?;
        Ok(Some(Self { token, user }))
    }

    pub fn save(&self, store: &dyn SessionStore) -> Result<(), ApiError> {
        let user = serde_json::to_string(&self.user.sanitized())
            .map_err(|err| ApiError::Session(err.to_string()))?;
        store.set(AUTH_TOKEN_KEY, &self.token)?;
        store.set(AUTH_USER_KEY, &user)
    }

    pub fn clear(store: &dyn SessionStore) -> Result<(), ApiError> {
        store.remove(AUTH_TOKEN_KEY)?;
        store.remove(AUTH_USER_KEY)
    }
}
