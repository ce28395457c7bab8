//! Error types for ClosetHaus
//!
//! All errors use thiserror for structured error handling.
//! These errors can be serialized to the frontend, and every variant maps
//! to a user-facing notice through [`AppError::user_message`].

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Storage write failed: {0}")]
    StorageWriteError(String),

    #[error("Invalid classification: {0}")]
    InvalidClassification(String),

    #[error("Both a headshot and a full body photo are required")]
    MissingReferenceImages,

    #[error("At least one clothing item must be selected")]
    EmptySelection,

    #[error("The generation service returned no image")]
    NoImageProduced,

    #[error("Selection changed while the outfit was being generated")]
    StaleGeneration,

    #[error("Remote service error ({status}): {message}")]
    Remote { status: u16, message: String },

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Invalid room transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Application state is still loading")]
    NotInitialized,

    #[error("Clothing item not found: {0}")]
    ItemNotFound(String),

    #[error("{0}")]
    Generic(String),
}

impl AppError {
    /// Message shown to the user when an action fails.
    pub fn user_message(&self) -> String {
        match self {
            AppError::StorageUnavailable(_) | AppError::StorageWriteError(_) | AppError::Database(_) => {
                "Failed to save your wardrobe. Your changes are kept for this session.".to_string()
            }
            AppError::InvalidClassification(_) => {
                "Couldn't recognise that item. Try a clearer photo of a top, bottom, shoes or accessory."
                    .to_string()
            }
            AppError::MissingReferenceImages => {
                "Please upload both a headshot and a full body photo first.".to_string()
            }
            AppError::EmptySelection => "Please select at least one item to try on.".to_string(),
            AppError::NoImageProduced => {
                "No outfit image was produced. Please try again.".to_string()
            }
            AppError::StaleGeneration => {
                "Your selection changed while the outfit was being generated.".to_string()
            }
            AppError::Remote { message, .. } => format!("{} Please try again.", message),
            AppError::Http(_) => {
                "Failed to connect to the styling service. Is the backend running?".to_string()
            }
            AppError::InvalidImage(reason) => format!("That image can't be used: {}", reason),
            AppError::NotInitialized => "Still loading ClosetHaus...".to_string(),
            AppError::ItemNotFound(_) => "That item is no longer in your closet.".to_string(),
            other => other.to_string(),
        }
    }

    /// Whether the user may simply re-trigger the action.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AppError::Http(_)
                | AppError::Remote { .. }
                | AppError::NoImageProduced
                | AppError::StaleGeneration
        )
    }
}

impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
