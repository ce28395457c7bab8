//! Repository layer for the wardrobe collections
//!
//! Translates the three typed collections to and from the store's untyped
//! records, one fixed key per collection. Collections are always written
//! whole; there are no partial updates.

use super::models::*;
use crate::error::{AppError, Result};
use crate::storage::{Collection, Store};
use serde::de::DeserializeOwned;

/// A full collection value ready to be written
#[derive(Debug, Clone, PartialEq)]
pub enum CollectionUpdate {
    UserImages(UserImages),
    ClothingItems(Vec<ClothingItem>),
    SavedOutfits(Vec<Outfit>),
}

impl CollectionUpdate {
    pub fn collection(&self) -> Collection {
        match self {
            CollectionUpdate::UserImages(_) => Collection::UserImages,
            CollectionUpdate::ClothingItems(_) => Collection::ClothingItems,
            CollectionUpdate::SavedOutfits(_) => Collection::SavedOutfits,
        }
    }
}

/// Repository for wardrobe collections
#[derive(Clone)]
pub struct Repository {
    store: Store,
}

impl Repository {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Load every collection.
    ///
    /// Absent or unreadable records fall back to their empty defaults; only
    /// an unavailable store fails the load.
    pub async fn load_all(&self) -> Result<Snapshot> {
        let user_images: UserImages = self.load_or_default(Collection::UserImages).await?;
        let clothing_items: Vec<ClothingItem> = self.load_or_default(Collection::ClothingItems).await?;
        let outfits: Vec<Outfit> = self.load_or_default(Collection::SavedOutfits).await?;

        tracing::info!(
            "Loaded wardrobe: {} items, {} outfits, onboarded: {}",
            clothing_items.len(),
            outfits.len(),
            user_images.is_complete()
        );

        Ok(Snapshot {
            user_images,
            clothing_items,
            outfits,
        })
    }

    async fn load_or_default<T: DeserializeOwned + Default>(&self, collection: Collection) -> Result<T> {
        match self.store.get::<T>(collection, collection.key()).await {
            Ok(Some(value)) => Ok(value),
            Ok(None) => {
                tracing::debug!("No stored record for {}, using defaults", collection);
                Ok(T::default())
            }
            Err(AppError::Serialization(e)) => {
                tracing::warn!("Stored {} record is unreadable, using defaults: {}", collection, e);
                Ok(T::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Write one whole collection under its fixed key
    pub async fn save(&self, update: &CollectionUpdate) -> Result<()> {
        let collection = update.collection();

        match update {
            CollectionUpdate::UserImages(images) => {
                self.store.put(collection, collection.key(), images).await?
            }
            CollectionUpdate::ClothingItems(items) => {
                self.store.put(collection, collection.key(), items).await?
            }
            CollectionUpdate::SavedOutfits(outfits) => {
                self.store.put(collection, collection.key(), outfits).await?
            }
        }

        tracing::debug!("Saved collection: {}", collection);
        Ok(())
    }

    pub async fn save_user_images(&self, images: &UserImages) -> Result<()> {
        self.save(&CollectionUpdate::UserImages(images.clone())).await
    }

    pub async fn save_clothing_items(&self, items: &[ClothingItem]) -> Result<()> {
        self.save(&CollectionUpdate::ClothingItems(items.to_vec())).await
    }

    pub async fn save_outfits(&self, outfits: &[Outfit]) -> Result<()> {
        self.save(&CollectionUpdate::SavedOutfits(outfits.to_vec())).await
    }

    pub fn store(&self) -> &Store {
        &self.store
    }
}
