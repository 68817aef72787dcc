// ============================
// crates/app-lib/src/lib.rs
// ============================
//! Core app-lib functionality for the memoria lobby/feed application.

pub mod access;
pub mod config;
pub mod error;
pub mod feed;
pub mod media;
pub mod storage;

use std::sync::Arc;

use crate::access::gate::{AccessGate, CodeIssuer};
use crate::access::session::SessionStore;
use crate::config::Settings;
use crate::feed::FeedController;
use crate::media::{LocalMediaLibrary, MediaGateway};
use crate::storage::{FeedStore, FlatFileStore, LobbyDirectory};

/// Application state shared across the app's controllers
#[derive(Clone)]
pub struct AppState<S> {
    /// Document store backing the lobby directory and the feed
    pub store: Arc<S>,
    /// Persistent session slot
    pub session: Arc<dyn SessionStore>,
    /// Image picker / gallery collaborator
    pub media: Arc<dyn MediaGateway>,
    /// Settings
    pub settings: Arc<Settings>,
}

impl<S> AppState<S>
where
    S: LobbyDirectory + FeedStore + 'static,
{
    /// Create a new application state
    pub fn new(
        store: S,
        session: impl SessionStore + 'static,
        media: impl MediaGateway + 'static,
        settings: Settings,
    ) -> Self {
        Self {
            store: Arc::new(store),
            session: Arc::new(session),
            media: Arc::new(media),
            settings: Arc::new(settings),
        }
    }

    /// The login gate for this state's collaborators
    pub fn gate(&self) -> AccessGate<S> {
        AccessGate::new(Arc::clone(&self.store), Arc::clone(&self.session))
    }

    /// The code issuer for this state's collaborators
    pub fn code_issuer(&self) -> CodeIssuer<S> {
        CodeIssuer::new(Arc::clone(&self.store), Arc::clone(&self.session))
    }

    /// A fresh feed controller (one per screen activation)
    pub fn feed(&self) -> FeedController<S> {
        FeedController::new(
            Arc::clone(&self.store),
            Arc::clone(&self.session),
            Arc::clone(&self.media),
        )
    }
}

impl AppState<FlatFileStore> {
    /// Wire up the default flat-file backends described by `settings`.
    pub fn from_settings(settings: Settings) -> anyhow::Result<Self> {
        let store = FlatFileStore::new(&settings.data_dir)?;
        let session = access::session::FileSessionStore::new(&settings.session_file);
        let media = LocalMediaLibrary::new(&settings.media_dir, &settings.gallery_dir);
        Ok(Self::new(store, session, media, settings))
    }
}
