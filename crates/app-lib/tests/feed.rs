// ==========================
// crates/app-lib/tests/feed.rs
// ==========================
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use memoria_app_lib::access::session::{MemorySessionStore, SessionStore};
use memoria_app_lib::error::AppError;
use memoria_app_lib::feed::{FeedController, FeedRefresh, PickOutcome, RemoveOutcome};
use memoria_app_lib::media::MediaGateway;
use memoria_app_lib::storage::{FeedStore, MemoryStore};
use memoria_common::{AccessCode, PostRecord};

/// Feed store that counts every call it receives.
#[derive(Clone, Default)]
struct CountingStore {
    inner: MemoryStore,
    writes: Arc<AtomicUsize>,
    reads: Arc<AtomicUsize>,
}

impl CountingStore {
    fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FeedStore for CountingStore {
    async fn add_post(&self, code: &AccessCode, post: &PostRecord) -> Result<(), AppError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.add_post(code, post).await
    }

    async fn list_posts(&self, code: &AccessCode) -> Result<Vec<PostRecord>, AppError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.list_posts(code).await
    }
}

/// Picker stub that always returns the same URI.
struct FixedPicker(Option<String>);

#[async_trait]
impl MediaGateway for FixedPicker {
    async fn pick_image(&self, _source: &Path) -> Result<Option<String>, AppError> {
        Ok(self.0.clone())
    }

    async fn save_to_gallery(&self, _uri: &str) -> Result<(), AppError> {
        Ok(())
    }
}

async fn controller_with_session(
    store: CountingStore,
    code: &str,
    picker: FixedPicker,
) -> FeedController<CountingStore> {
    let session: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
    session.set_active_code(&AccessCode::from(code)).await.unwrap();

    let mut feed = FeedController::new(Arc::new(store), session, Arc::new(picker));
    feed.load_feed().await.unwrap();
    feed
}

#[tokio::test]
async fn test_submit_writes_once_and_clears_draft() {
    let store = CountingStore::default();
    let mut feed =
        controller_with_session(store.clone(), "482913", FixedPicker(None)).await;

    feed.set_draft_text("a new memory");
    feed.submit_post().await.unwrap();

    // Exactly one store write, draft cleared
    assert_eq!(store.writes(), 1);
    assert_eq!(feed.draft_text(), "");
    assert!(feed.selected_image().is_none());

    // The in-memory list only refreshes on the next load
    assert!(feed.posts().is_empty());
    let refresh = feed.load_feed().await.unwrap();
    assert_eq!(refresh, FeedRefresh::Loaded(1));
    assert_eq!(feed.posts()[0].text.as_deref(), Some("a new memory"));
}

#[tokio::test]
async fn test_empty_draft_makes_no_store_call() {
    let store = CountingStore::default();
    let mut feed =
        controller_with_session(store.clone(), "482913", FixedPicker(None)).await;
    let reads_after_load = store.reads();

    feed.set_draft_text("   ");
    let result = feed.submit_post().await;

    assert!(matches!(result, Err(AppError::EmptyDraft)));
    assert_eq!(store.writes(), 0);
    assert_eq!(store.reads(), reads_after_load);
}

#[tokio::test]
async fn test_missing_code_makes_no_store_call() {
    let store = CountingStore::default();
    let session: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());

    // No stored code: the controller never learns an active lobby
    let mut feed = FeedController::new(
        Arc::new(store.clone()),
        session,
        Arc::new(FixedPicker(None)),
    );
    assert_eq!(feed.load_feed().await.unwrap(), FeedRefresh::NoSession);

    feed.set_draft_text("text is present");
    let result = feed.submit_post().await;

    assert!(matches!(result, Err(AppError::MissingCode)));
    assert_eq!(store.writes(), 0);
}

#[tokio::test]
async fn test_blank_code_makes_no_store_call() {
    let store = CountingStore::default();
    let mut feed = controller_with_session(store.clone(), "   ", FixedPicker(None)).await;

    feed.set_draft_text("text is present");
    let result = feed.submit_post().await;

    assert!(matches!(result, Err(AppError::MissingCode)));
    assert_eq!(store.writes(), 0);
}

#[tokio::test]
async fn test_image_only_post_is_accepted() {
    let store = CountingStore::default();
    let mut feed = controller_with_session(
        store.clone(),
        "482913",
        FixedPicker(Some("file:///pick.png".into())),
    )
    .await;

    let outcome = feed.pick_image(Path::new("pick.png")).await.unwrap();
    assert_eq!(outcome, PickOutcome::Picked("file:///pick.png".into()));

    feed.submit_post().await.unwrap();
    assert_eq!(store.writes(), 1);
    assert!(feed.selected_image().is_none());
}

#[tokio::test]
async fn test_remove_selection_leaves_feed_alone() {
    let store = CountingStore::default();
    let code = AccessCode::from("482913");

    // Two persisted posts
    for uri in ["file:///a.png", "file:///b.png"] {
        let post = PostRecord::compose("", Some(uri), Utc::now()).unwrap();
        store.inner.add_post(&code, &post).await.unwrap();
    }

    let mut feed = controller_with_session(
        store.clone(),
        "482913",
        FixedPicker(Some("file:///sel.png".into())),
    )
    .await;
    feed.load_feed().await.unwrap();
    feed.pick_image(Path::new("sel.png")).await.unwrap();

    // Removing the unsubmitted selection clears only the selection
    let outcome = feed.remove_post("file:///sel.png");
    assert_eq!(outcome, RemoveOutcome::ClearedSelection);
    assert!(feed.selected_image().is_none());
    assert_eq!(feed.posts().len(), 2);
    assert_eq!(store.inner.list_posts(&code).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_remove_post_is_local_only() {
    let store = CountingStore::default();
    let code = AccessCode::from("482913");

    let keep = PostRecord::compose("words", None, Utc::now()).unwrap();
    let hidden = PostRecord::compose("", Some("file:///gone.png"), Utc::now()).unwrap();
    store.inner.add_post(&code, &keep).await.unwrap();
    store.inner.add_post(&code, &hidden).await.unwrap();

    let mut feed =
        controller_with_session(store.clone(), "482913", FixedPicker(None)).await;
    assert_eq!(feed.posts().len(), 2);

    let outcome = feed.remove_post("file:///gone.png");
    assert_eq!(outcome, RemoveOutcome::RemovedFromFeed(1));
    assert_eq!(feed.posts().len(), 1);
    assert_eq!(feed.posts()[0].text.as_deref(), Some("words"));

    // The store still holds both documents
    assert_eq!(store.inner.list_posts(&code).await.unwrap().len(), 2);

    // A reload brings the hidden post back
    feed.load_feed().await.unwrap();
    assert_eq!(feed.posts().len(), 2);
}

#[tokio::test]
async fn test_restored_session_loads_exactly_the_lobby_posts() {
    let store = CountingStore::default();
    let code = AccessCode::from("482913");

    let text_post = PostRecord::compose("hi", None, Utc::now()).unwrap();
    let image_post = PostRecord::compose("", Some("x"), Utc::now()).unwrap();
    store.inner.add_post(&code, &text_post).await.unwrap();
    store.inner.add_post(&code, &image_post).await.unwrap();

    // Another lobby's posts must not bleed in
    let other = AccessCode::from("111111");
    let stray = PostRecord::compose("other lobby", None, Utc::now()).unwrap();
    store.inner.add_post(&other, &stray).await.unwrap();

    let feed = controller_with_session(store, "482913", FixedPicker(None)).await;

    assert_eq!(feed.active_code(), Some(&code));
    assert_eq!(feed.posts().len(), 2);
    assert_eq!(feed.posts()[0].text.as_deref(), Some("hi"));
    assert_eq!(feed.posts()[1].image_uri.as_deref(), Some("x"));
}

#[tokio::test]
async fn test_cancelled_pick_changes_nothing() {
    let store = CountingStore::default();
    let mut feed =
        controller_with_session(store, "482913", FixedPicker(None)).await;

    let outcome = feed.pick_image(Path::new("whatever.png")).await.unwrap();

    assert_eq!(outcome, PickOutcome::Cancelled);
    assert!(feed.selected_image().is_none());
}
