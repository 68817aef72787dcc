// ============================
// crates/app-lib/src/access/session.rs
// ============================
//! The persistent local session slot.
//!
//! A single key-value slot holds the active access code across app
//! restarts. The store is written whenever a code is generated or a login
//! succeeds, and read on startup and on every feed load.
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::fs as tokio_fs;

use crate::error::AppError;
use memoria_common::AccessCode;

/// Key under which the active access code is stored.
pub const SESSION_KEY: &str = "accessCode";

/// Trait for the device key-value store holding session state
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Read a value; `None` when the key was never set
    async fn get(&self, key: &str) -> Result<Option<String>, AppError>;

    /// Write a value, overwriting any previous one. No expiry.
    async fn set(&self, key: &str, value: &str) -> Result<(), AppError>;

    /// The access code of the active lobby, if one was stored.
    async fn active_code(&self) -> Result<Option<AccessCode>, AppError> {
        Ok(self.get(SESSION_KEY).await?.map(AccessCode::from))
    }

    /// Remember `code` as the active lobby.
    async fn set_active_code(&self, code: &AccessCode) -> Result<(), AppError> {
        self.set(SESSION_KEY, code.as_str()).await
    }
}

/// File-backed session store: one JSON object per device
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    async fn read_slots(&self) -> Result<HashMap<String, String>, AppError> {
        let raw = match tokio_fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(HashMap::new())
            },
            Err(err) => return Err(err.into()),
        };

        Ok(serde_json::from_str(&raw)?)
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let slots = self.read_slots().await?;
        Ok(slots.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        let mut slots = self.read_slots().await?;
        slots.insert(key.to_owned(), value.to_owned());

        if let Some(parent) = self.path.parent() {
            tokio_fs::create_dir_all(parent).await?;
        }
        tokio_fs::write(&self.path, serde_json::to_vec(&slots)?).await?;
        Ok(())
    }
}

/// In-memory session store, used by tests
#[derive(Default)]
pub struct MemorySessionStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.slots.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.slots.lock().insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}
