// ============================
// crates/app-lib/src/storage.rs
// ============================
//! Document-store collaborators with a flat-file implementation.
//!
//! The lobby directory and the feed store are the two remote collections
//! the app talks to. Both are modeled as traits so the core never knows
//! which backend it is wired to; the default [`FlatFileStore`] keeps the
//! same document layout on local disk (`lobbies/<code>/...`), and
//! [`MemoryStore`] backs tests.
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::{fs as tokio_fs, io::AsyncWriteExt};

use crate::error::AppError;
use memoria_common::{AccessCode, LobbyRecord, PostRecord, LOBBIES_COLLECTION, POSTS_SUBCOLLECTION};

/// Trait for the lobby directory collaborator
#[async_trait]
pub trait LobbyDirectory: Send + Sync {
    /// Register a lobby record under its access code
    async fn put_lobby(&self, lobby: &LobbyRecord) -> Result<(), AppError>;

    /// Look up a lobby by access code; `None` when no such lobby exists
    async fn get_lobby(&self, code: &AccessCode) -> Result<Option<LobbyRecord>, AppError>;
}

/// Trait for the feed store collaborator
#[async_trait]
pub trait FeedStore: Send + Sync {
    /// Append a post document to the lobby's feed
    async fn add_post(&self, code: &AccessCode, post: &PostRecord) -> Result<(), AppError>;

    /// Read all post documents for a lobby, in store order
    ///
    /// No ordering is guaranteed here; callers sort by creation time.
    async fn list_posts(&self, code: &AccessCode) -> Result<Vec<PostRecord>, AppError>;
}

/// Flat-file implementation of both store traits
#[derive(Clone)]
pub struct FlatFileStore {
    root: PathBuf,
}

impl FlatFileStore {
    pub fn new<P: AsRef<Path>>(root: P) -> anyhow::Result<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(root.join(LOBBIES_COLLECTION))?;
        Ok(Self { root })
    }

    fn lobby_dir(&self, code: &AccessCode) -> PathBuf {
        self.root.join(LOBBIES_COLLECTION).join(code.as_str())
    }

    fn posts_log(&self, code: &AccessCode) -> PathBuf {
        self.lobby_dir(code)
            .join(format!("{POSTS_SUBCOLLECTION}.log"))
    }
}

#[async_trait]
impl LobbyDirectory for FlatFileStore {
    /// Write the lobby document to `lobbies/<code>/lobby.json`.
    async fn put_lobby(&self, lobby: &LobbyRecord) -> Result<(), AppError> {
        let dir = self.lobby_dir(&lobby.access_code);
        tokio_fs::create_dir_all(&dir).await?;

        let doc = serde_json::to_vec(lobby)?;
        tokio_fs::write(dir.join("lobby.json"), doc).await?;
        Ok(())
    }

    async fn get_lobby(&self, code: &AccessCode) -> Result<Option<LobbyRecord>, AppError> {
        let path = self.lobby_dir(code).join("lobby.json");

        let raw = match tokio_fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        Ok(Some(serde_json::from_str(&raw)?))
    }
}

#[async_trait]
impl FeedStore for FlatFileStore {
    /// Append one post document as a JSON line to the lobby's post log.
    async fn add_post(&self, code: &AccessCode, post: &PostRecord) -> Result<(), AppError> {
        let path = self.posts_log(code);

        // ensure directory exists
        tokio_fs::create_dir_all(path.parent().unwrap()).await?;

        let line = serde_json::to_string(post)?;
        let mut file = tokio_fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(AppError::from)?;

        file.write_all(line.as_bytes()).await?;
        file.write_all(b"\n").await?;
        Ok(())
    }

    async fn list_posts(&self, code: &AccessCode) -> Result<Vec<PostRecord>, AppError> {
        let path = self.posts_log(code);

        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = tokio_fs::read_to_string(&path).await?;
        let mut posts = Vec::new();
        for line in content.lines().filter(|line| !line.trim().is_empty()) {
            posts.push(serde_json::from_str(line)?);
        }

        Ok(posts)
    }
}

/// In-memory implementation of both store traits, used by tests
#[derive(Clone, Default)]
pub struct MemoryStore {
    lobbies: Arc<DashMap<String, LobbyRecord>>,
    posts: Arc<DashMap<String, Vec<PostRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LobbyDirectory for MemoryStore {
    async fn put_lobby(&self, lobby: &LobbyRecord) -> Result<(), AppError> {
        self.lobbies
            .insert(lobby.access_code.as_str().to_owned(), lobby.clone());
        Ok(())
    }

    async fn get_lobby(&self, code: &AccessCode) -> Result<Option<LobbyRecord>, AppError> {
        Ok(self
            .lobbies
            .get(code.as_str())
            .map(|entry| entry.value().clone()))
    }
}

#[async_trait]
impl FeedStore for MemoryStore {
    async fn add_post(&self, code: &AccessCode, post: &PostRecord) -> Result<(), AppError> {
        self.posts
            .entry(code.as_str().to_owned())
            .or_default()
            .push(post.clone());
        Ok(())
    }

    async fn list_posts(&self, code: &AccessCode) -> Result<Vec<PostRecord>, AppError> {
        Ok(self
            .posts
            .get(code.as_str())
            .map(|entry| entry.value().clone())
            .unwrap_or_default())
    }
}
