//! Closet commands
//!
//! Catalog uploads, manual entry and removal.

use super::{notice, CommandResult};
use crate::app::AppState;
use crate::database::{ClothingCategory, ClothingItem, ImageRef};
use serde::Serialize;

/// Items of one category, in catalog order
#[derive(Debug, Clone, Serialize)]
pub struct CategoryGroup {
    pub category: ClothingCategory,
    pub items: Vec<ClothingItem>,
}

/// Classify an uploaded photo and add it to the closet
pub async fn upload_clothing(state: &AppState, data_url: &str) -> CommandResult<ClothingItem> {
    let image = ImageRef::from_data_url(data_url).map_err(|e| notice("Upload clothing", e))?;

    state
        .closet_service
        .add_from_upload(image)
        .await
        .map_err(|e| notice("Upload clothing", e))
}

/// Add an item with a name and category chosen by the user
pub async fn add_clothing_manually(
    state: &AppState,
    name: &str,
    category: ClothingCategory,
    data_url: &str,
) -> CommandResult<ClothingItem> {
    let image = ImageRef::from_data_url(data_url).map_err(|e| notice("Add clothing", e))?;

    state
        .closet_service
        .add_manual(name, category, image)
        .await
        .map_err(|e| notice("Add clothing", e))
}

/// Delete an item from the closet and from the current mirror selection
pub async fn remove_clothing(state: &AppState, id: &str) -> CommandResult<ClothingItem> {
    let removed = state
        .closet_service
        .remove(id)
        .await
        .map_err(|e| notice("Remove clothing", e))?;

    state.mirror_service.forget_item(id).await;
    Ok(removed)
}

/// The closet grouped by category
pub async fn list_closet(state: &AppState) -> Vec<CategoryGroup> {
    state
        .closet_service
        .grouped()
        .await
        .into_iter()
        .map(|(category, items)| CategoryGroup { category, items })
        .collect()
}
