// ================
// crates/common/src/lib.rs
// ================
//! Common types shared between the memoria app core and its backing
//! document store: access codes, lobby records and post documents.
//! Field names follow the store's camelCase document schema.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Name of the top-level lobby collection in the document store.
pub const LOBBIES_COLLECTION: &str = "lobbies";

/// Name of the per-lobby post sub-collection in the document store.
pub const POSTS_SUBCOLLECTION: &str = "postagens";

/// Smallest value an access code can take (inclusive).
pub const CODE_MIN: u32 = 100_000;

/// Largest value an access code can take (inclusive).
pub const CODE_MAX: u32 = 999_999;

/// A lobby access code.
///
/// Freshly generated codes are 6-digit numeric strings, but codes that
/// arrive from user input are carried as free-form text: the gate looks
/// them up verbatim rather than rejecting them up front.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessCode(String);

impl AccessCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the code is empty after trimming, i.e. nothing was typed.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<String> for AccessCode {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl From<&str> for AccessCode {
    fn from(raw: &str) -> Self {
        Self(raw.to_owned())
    }
}

impl AsRef<str> for AccessCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccessCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A lobby document, keyed in the directory by its access code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LobbyRecord {
    pub access_code: AccessCode,
    pub created_at: DateTime<Utc>,
}

impl LobbyRecord {
    /// Build a lobby record stamped with the current time.
    pub fn new(access_code: AccessCode) -> Self {
        Self {
            access_code,
            created_at: Utc::now(),
        }
    }
}

/// A single feed post.
///
/// At least one of `text` / `image_uri` is present; [`PostRecord::compose`]
/// is the only way to build one and refuses an empty draft. The id stands
/// in for the store's auto-generated document id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_uri: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl PostRecord {
    /// Build a post from a draft, normalizing whitespace-only text away.
    ///
    /// Returns `None` when both the trimmed text and the image are absent.
    pub fn compose(
        text: &str,
        image_uri: Option<&str>,
        created_at: DateTime<Utc>,
    ) -> Option<Self> {
        let text = text.trim();
        let text = (!text.is_empty()).then(|| text.to_owned());
        let image_uri = image_uri.map(str::to_owned);

        if text.is_none() && image_uri.is_none() {
            return None;
        }

        Some(Self {
            id: Uuid::new_v4(),
            text,
            image_uri,
            created_at,
        })
    }

    /// True when the post carries an image reference equal to `uri`.
    pub fn has_image(&self, uri: &str) -> bool {
        self.image_uri.as_deref() == Some(uri)
    }
}
