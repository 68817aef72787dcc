// ==================
// crates/app-lib/src/feed.rs
// ==================
//! Feed Controller Module
//!
//! The controller owns the state one feed screen works with: the
//! in-memory post list, the draft text, the current image selection and
//! the active lobby code. It is instantiated per screen and drives the
//! feed store, session store and media gateway collaborators.
//!
//! Two invariants hold throughout:
//! - A successful submit clears the draft but does NOT append the new
//!   post to the in-memory list; the list only changes on the next
//!   [`FeedController::load_feed`].
//! - Removing a post is local-only. The store keeps the document; only
//!   the in-memory list (or the pending selection) is touched.
use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use metrics::counter;
use tracing::{debug, error, info};

use crate::access::session::SessionStore;
use crate::error::AppError;
use crate::media::MediaGateway;
use crate::storage::FeedStore;
use memoria_common::{AccessCode, PostRecord};

/// Result of a feed reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedRefresh {
    /// No access code stored; the feed stays empty with no user-visible error.
    NoSession,
    /// The list was replaced with this many posts.
    Loaded(usize),
}

/// What a local remove actually removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// The target was the not-yet-submitted selection; only it was cleared.
    ClearedSelection,
    /// This many posts left the in-memory list. The store is untouched.
    RemovedFromFeed(usize),
}

/// Outcome of driving the image picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickOutcome {
    Picked(String),
    Cancelled,
}

/// Per-screen feed state and operations.
pub struct FeedController<F> {
    store: Arc<F>,
    session: Arc<dyn SessionStore>,
    media: Arc<dyn MediaGateway>,
    posts: Vec<PostRecord>,
    draft_text: String,
    selected_image: Option<String>,
    active_code: Option<AccessCode>,
}

impl<F: FeedStore> FeedController<F> {
    pub fn new(
        store: Arc<F>,
        session: Arc<dyn SessionStore>,
        media: Arc<dyn MediaGateway>,
    ) -> Self {
        Self {
            store,
            session,
            media,
            posts: Vec::new(),
            draft_text: String::new(),
            selected_image: None,
            active_code: None,
        }
    }

    /// The posts currently shown, oldest first.
    pub fn posts(&self) -> &[PostRecord] {
        &self.posts
    }

    pub fn active_code(&self) -> Option<&AccessCode> {
        self.active_code.as_ref()
    }

    pub fn draft_text(&self) -> &str {
        &self.draft_text
    }

    pub fn set_draft_text(&mut self, text: impl Into<String>) {
        self.draft_text = text.into();
    }

    pub fn selected_image(&self) -> Option<&str> {
        self.selected_image.as_deref()
    }

    /// Reload the feed for the lobby stored in the session slot.
    ///
    /// With no stored code the feed stays empty and nothing is surfaced.
    /// A fetch failure propagates and leaves the previous list in place.
    pub async fn load_feed(&mut self) -> Result<FeedRefresh, AppError> {
        let Some(code) = self.session.active_code().await? else {
            debug!("no stored access code, feed stays empty");
            return Ok(FeedRefresh::NoSession);
        };

        self.active_code = Some(code.clone());

        match self.store.list_posts(&code).await {
            Ok(mut posts) => {
                posts.sort_by_key(|post| post.created_at);
                let count = posts.len();
                self.posts = posts;
                info!(%code, count, "feed loaded");
                Ok(FeedRefresh::Loaded(count))
            },
            Err(err) => {
                error!(%code, error = %err, "failed to load posts");
                Err(err)
            },
        }
    }

    /// Submit the current draft as a new post.
    ///
    /// Both preconditions are checked before any store call: the draft
    /// must have text or an image, and a lobby code must be active. On
    /// success the draft is cleared; the in-memory list is not updated
    /// until the next reload.
    pub async fn submit_post(&mut self) -> Result<(), AppError> {
        let Some(post) = PostRecord::compose(
            &self.draft_text,
            self.selected_image.as_deref(),
            Utc::now(),
        ) else {
            return Err(AppError::EmptyDraft);
        };

        let code = match &self.active_code {
            Some(code) if !code.is_blank() => code.clone(),
            _ => return Err(AppError::MissingCode),
        };

        self.store.add_post(&code, &post).await?;

        counter!("post.created").increment(1);
        info!(%code, post_id = %post.id, "post submitted");

        self.draft_text.clear();
        self.selected_image = None;
        Ok(())
    }

    /// Remove `uri` locally: either the pending selection, or every
    /// listed post carrying that image reference. Never touches the store.
    pub fn remove_post(&mut self, uri: &str) -> RemoveOutcome {
        if self.selected_image.as_deref() == Some(uri) {
            self.selected_image = None;
            debug!(%uri, "image selection cleared");
            return RemoveOutcome::ClearedSelection;
        }

        let before = self.posts.len();
        self.posts.retain(|post| !post.has_image(uri));
        let removed = before - self.posts.len();
        debug!(%uri, removed, "posts hidden from feed");
        RemoveOutcome::RemovedFromFeed(removed)
    }

    /// Drive the picker for `source`; a successful pick becomes the
    /// current selection.
    pub async fn pick_image(&mut self, source: &Path) -> Result<PickOutcome, AppError> {
        match self.media.pick_image(source).await? {
            Some(uri) => {
                self.selected_image = Some(uri.clone());
                Ok(PickOutcome::Picked(uri))
            },
            None => Ok(PickOutcome::Cancelled),
        }
    }

    /// Save an image (the selection or a post's) into the gallery.
    pub async fn export_image(&self, uri: &str) -> Result<(), AppError> {
        self.media.save_to_gallery(uri).await
    }
}
