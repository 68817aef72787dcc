// ============================
// crates/app-lib/src/media.rs
// ============================
//! Media gateway: the image picker and gallery-save collaborator.
//!
//! The platform picker and media library live outside the core; this
//! trait is their contract. The default implementation works against the
//! local filesystem: picking imports a file into the app's media
//! directory, saving copies it into the gallery directory. Filesystem
//! permission failures map to the permission error the platform flow
//! would surface.
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use metrics::counter;
use tokio::fs as tokio_fs;
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;

/// Trait for the device media picker and library
#[async_trait]
pub trait MediaGateway: Send + Sync {
    /// Import an image; `Ok(None)` means the picker was cancelled.
    ///
    /// Non-image sources are rejected, and a permission failure aborts
    /// the flow with [`AppError::PermissionDenied`].
    async fn pick_image(&self, source: &Path) -> Result<Option<String>, AppError>;

    /// Persist an image URI into the device gallery.
    async fn save_to_gallery(&self, uri: &str) -> Result<(), AppError>;
}

/// Filesystem-backed media gateway
pub struct LocalMediaLibrary {
    media_dir: PathBuf,
    gallery_dir: PathBuf,
}

impl LocalMediaLibrary {
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(media_dir: P, gallery_dir: Q) -> Self {
        Self {
            media_dir: media_dir.as_ref().to_path_buf(),
            gallery_dir: gallery_dir.as_ref().to_path_buf(),
        }
    }

    fn map_fs_err(err: std::io::Error, path: &Path) -> AppError {
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => AppError::PermissionDenied,
            std::io::ErrorKind::NotFound => {
                AppError::InvalidInput(format!("no such file: {}", path.display()))
            },
            _ => err.into(),
        }
    }
}

#[async_trait]
impl MediaGateway for LocalMediaLibrary {
    async fn pick_image(&self, source: &Path) -> Result<Option<String>, AppError> {
        tokio_fs::metadata(source)
            .await
            .map_err(|err| Self::map_fs_err(err, source))?;

        let mime = mime_guess::from_path(source).first();
        if !mime.is_some_and(|m| m.type_() == mime_guess::mime::IMAGE) {
            return Err(AppError::NotAnImage(source.display().to_string()));
        }

        let file_name = source
            .file_name()
            .ok_or_else(|| AppError::InvalidInput(format!("not a file: {}", source.display())))?;

        // Imported copies get a fresh name so repeated picks never clash
        let dest = self
            .media_dir
            .join(format!("{}-{}", Uuid::new_v4(), file_name.to_string_lossy()));

        tokio_fs::create_dir_all(&self.media_dir)
            .await
            .map_err(|err| Self::map_fs_err(err, &self.media_dir))?;
        tokio_fs::copy(source, &dest)
            .await
            .map_err(|err| Self::map_fs_err(err, source))?;

        info!(source = %source.display(), uri = %dest.display(), "image imported");
        Ok(Some(dest.display().to_string()))
    }

    async fn save_to_gallery(&self, uri: &str) -> Result<(), AppError> {
        let source = Path::new(uri);
        let file_name = source
            .file_name()
            .ok_or_else(|| AppError::InvalidInput(format!("not a file: {uri}")))?;

        tokio_fs::create_dir_all(&self.gallery_dir)
            .await
            .map_err(|err| Self::map_fs_err(err, &self.gallery_dir))?;
        tokio_fs::copy(source, self.gallery_dir.join(file_name))
            .await
            .map_err(|err| Self::map_fs_err(err, source))?;

        counter!("gallery.saved").increment(1);
        info!(%uri, "image saved to gallery");
        Ok(())
    }
}
