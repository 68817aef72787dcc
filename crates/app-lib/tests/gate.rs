// ==========================
// crates/app-lib/tests/gate.rs
// ==========================
use std::sync::Arc;

use async_trait::async_trait;
use tempfile::TempDir;

use memoria_app_lib::access::gate::{AccessDecision, AccessGate, CodeIssuer};
use memoria_app_lib::access::session::{MemorySessionStore, SessionStore};
use memoria_app_lib::error::AppError;
use memoria_app_lib::feed::{FeedController, FeedRefresh};
use memoria_app_lib::media::MediaGateway;
use memoria_app_lib::storage::{FeedStore, FlatFileStore, LobbyDirectory, MemoryStore};
use memoria_common::{AccessCode, LobbyRecord, PostRecord, CODE_MAX, CODE_MIN};

/// Media gateway that never gets used by these tests.
struct NoMedia;

#[async_trait]
impl MediaGateway for NoMedia {
    async fn pick_image(&self, _source: &std::path::Path) -> Result<Option<String>, AppError> {
        Ok(None)
    }

    async fn save_to_gallery(&self, _uri: &str) -> Result<(), AppError> {
        Ok(())
    }
}

/// Directory whose writes always fail, as if the backend were down.
struct DownDirectory;

#[async_trait]
impl LobbyDirectory for DownDirectory {
    async fn put_lobby(&self, _lobby: &LobbyRecord) -> Result<(), AppError> {
        Err(AppError::Backend("directory unreachable".into()))
    }

    async fn get_lobby(&self, _code: &AccessCode) -> Result<Option<LobbyRecord>, AppError> {
        Err(AppError::Backend("directory unreachable".into()))
    }
}

#[tokio::test]
async fn test_unknown_code_is_denied() {
    let directory = Arc::new(MemoryStore::new());
    let session: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
    let gate = AccessGate::new(directory, Arc::clone(&session));

    // Empty directory: "000000" cannot be granted
    let decision = gate
        .validate_code(&AccessCode::from("000000"))
        .await
        .unwrap();

    assert_eq!(decision, AccessDecision::Denied);
    // No state change on denial
    assert!(session.active_code().await.unwrap().is_none());
}

#[tokio::test]
async fn test_known_code_is_granted_and_feed_reads_its_posts() {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(FlatFileStore::new(temp_dir.path()).unwrap());
    let session: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());

    let code = AccessCode::from("000000");
    store.put_lobby(&LobbyRecord::new(code.clone())).await.unwrap();
    let post = PostRecord::compose("welcome", None, chrono::Utc::now()).unwrap();
    store.add_post(&code, &post).await.unwrap();

    // Validation persists the code to the session
    let gate = AccessGate::new(Arc::clone(&store), Arc::clone(&session));
    let decision = gate.validate_code(&code).await.unwrap();
    assert_eq!(decision, AccessDecision::Granted);
    assert_eq!(session.active_code().await.unwrap().unwrap(), code);

    // The subsequent feed load reads the lobby's postagens sub-collection
    let mut feed = FeedController::new(store, session, Arc::new(NoMedia));
    let refresh = feed.load_feed().await.unwrap();
    assert_eq!(refresh, FeedRefresh::Loaded(1));
    assert_eq!(feed.posts()[0].text.as_deref(), Some("welcome"));
    assert!(temp_dir
        .path()
        .join("lobbies")
        .join("000000")
        .join("postagens.log")
        .exists());
}

#[tokio::test]
async fn test_directory_failure_propagates_without_state_change() {
    let session: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
    let gate = AccessGate::new(Arc::new(DownDirectory), Arc::clone(&session));

    let result = gate.validate_code(&AccessCode::from("123456")).await;

    assert!(matches!(result, Err(AppError::Backend(_))));
    assert!(session.active_code().await.unwrap().is_none());
}

#[tokio::test]
async fn test_issue_registers_lobby_and_session() {
    let directory = Arc::new(MemoryStore::new());
    let session: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
    let issuer = CodeIssuer::new(Arc::clone(&directory), Arc::clone(&session));

    let issued = issuer.issue().await.unwrap();

    assert!(issued.registered);
    let value: u32 = issued.code.as_str().parse().unwrap();
    assert!((CODE_MIN..=CODE_MAX).contains(&value));

    // The lobby is in the directory and the session remembers the code
    assert!(directory.get_lobby(&issued.code).await.unwrap().is_some());
    assert_eq!(session.active_code().await.unwrap().unwrap(), issued.code);
}

#[tokio::test]
async fn test_issue_survives_registration_failure() {
    let session: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
    let issuer = CodeIssuer::new(Arc::new(DownDirectory), Arc::clone(&session));

    // The code is still issued and remembered locally
    let issued = issuer.issue().await.unwrap();

    assert!(!issued.registered);
    assert_eq!(session.active_code().await.unwrap().unwrap(), issued.code);
}
