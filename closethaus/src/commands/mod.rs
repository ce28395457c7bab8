//! Commands exposed to the frontend
//!
//! One function per user action. Every failure is logged here and turned
//! into the notice shown to the user; nothing propagates further.
//! - `onboarding`: reference photo uploads
//! - `closet`: catalog uploads and removals
//! - `mirror`: selection, generation and saving outfits

pub mod closet;
pub mod mirror;
pub mod onboarding;

pub use closet::*;
pub use mirror::*;
pub use onboarding::*;

use crate::app::AppState;
use crate::error::AppError;
use crate::services::{Phase, Room};
use serde::Serialize;

/// Result handed back to the frontend; the error is a user-facing notice
pub type CommandResult<T> = std::result::Result<T, String>;

pub(crate) fn notice(action: &str, err: AppError) -> String {
    match &err {
        AppError::StorageUnavailable(_) | AppError::StorageWriteError(_) | AppError::Database(_) => {
            tracing::error!("{} failed: {}", action, err)
        }
        _ => tracing::warn!("{} failed: {}", action, err),
    }
    err.user_message()
}

// ===== Navigation =====

/// Move to another room
pub async fn navigate(state: &AppState, room: Room) -> CommandResult<Room> {
    state
        .coordinator
        .navigate(room)
        .await
        .map_err(|e| notice("Navigate", e))
}

/// The back button
pub async fn go_back(state: &AppState) -> CommandResult<Room> {
    state
        .coordinator
        .back()
        .await
        .map_err(|e| notice("Go back", e))
}

/// Summary of the session for the shell
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppStatus {
    pub version: String,
    pub phase: Phase,
    pub room: Room,
    pub onboarded: bool,
    pub item_count: usize,
    pub outfit_count: usize,
}

/// Get application status
pub async fn app_status(state: &AppState) -> AppStatus {
    let snapshot = state.coordinator.snapshot().await;

    AppStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        phase: state.coordinator.phase().await,
        room: state.coordinator.room().await,
        onboarded: snapshot.user_images.is_complete(),
        item_count: snapshot.clothing_items.len(),
        outfit_count: snapshot.outfits.len(),
    }
}
