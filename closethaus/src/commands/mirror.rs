//! Mirror commands

use super::{notice, CommandResult};
use crate::app::AppState;
use crate::database::{ClothingItem, Outfit};

/// Select or deselect a closet item for the try-on
pub async fn toggle_selection(state: &AppState, item_id: &str) -> CommandResult<Vec<ClothingItem>> {
    state
        .mirror_service
        .toggle_selection(item_id)
        .await
        .map_err(|e| notice("Toggle selection", e))
}

/// Generate a try-on image for the current selection
pub async fn generate_outfit(state: &AppState) -> CommandResult<String> {
    state
        .mirror_service
        .generate()
        .await
        .map_err(|e| notice("Generate outfit", e))
}

/// Save the last generated image as an outfit
pub async fn save_generated_outfit(state: &AppState) -> CommandResult<Option<Outfit>> {
    state
        .mirror_service
        .save_generated()
        .await
        .map_err(|e| notice("Save outfit", e))
}

/// Saved outfits, most recent first
pub async fn list_outfits(state: &AppState) -> Vec<Outfit> {
    state.coordinator.outfits().await
}
