// crates/app-lib/src/error.rs

//! Central error type for the app core.
use thiserror::Error;

/// Application error types with error codes and user-facing messages.
///
/// Every error is terminal for the action that raised it; nothing is
/// retried automatically.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("post needs text or an image")]
    EmptyDraft,

    #[error("no active lobby code")]
    MissingCode,

    #[error("unknown access code")]
    CodeNotFound,

    #[error("media library permission denied")]
    PermissionDenied,

    #[error("not an image: {0}")]
    NotAnImage(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("backend error: {0}")]
    Backend(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::EmptyDraft => "VAL_001",
            AppError::MissingCode => "VAL_002",
            AppError::NotAnImage(_) => "VAL_003",
            AppError::InvalidInput(_) => "VAL_004",
            AppError::CodeNotFound => "NF_001",
            AppError::PermissionDenied => "PERM_001",
            AppError::Backend(_) => "BE_001",
            AppError::Io(_) => "IO_001",
            AppError::Json(_) => "JSON_001",
        }
    }

    /// The notification text shown to the user for this error.
    ///
    /// Validation and permission errors carry a specific prompt; anything
    /// that went wrong talking to the store collapses into one generic
    /// message, matching what the app surfaces.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::EmptyDraft => "Add some text or an image to create a post!",
            AppError::MissingCode => "Enter a lobby code before posting!",
            AppError::CodeNotFound => "Invalid code!",
            AppError::PermissionDenied => {
                "We need permission to access your photo library!"
            },
            AppError::NotAnImage(_) | AppError::InvalidInput(_) => {
                "That file doesn't look like an image."
            },
            AppError::Backend(_) | AppError::Io(_) | AppError::Json(_) => {
                "Something went wrong talking to the server."
            },
        }
    }

    /// True for errors raised before any store call was attempted.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AppError::EmptyDraft
                | AppError::MissingCode
                | AppError::NotAnImage(_)
                | AppError::InvalidInput(_)
        )
    }
}
