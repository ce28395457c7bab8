//! Closet service
//!
//! Adds garments to the catalog, either from a classified upload or by
//! hand, and removes them. Classification results only reach the catalog
//! through the coordinator.

use crate::database::{ClothingCategory, ClothingItem, ImageRef, NewClothingItem};
use crate::error::{AppError, Result};
use crate::remote::StylistClient;
use crate::services::coordinator::{Coordinator, Phase};
use std::sync::Arc;

/// Service for managing the clothing catalog
#[derive(Clone)]
pub struct ClosetService {
    coordinator: Arc<Coordinator>,
    client: StylistClient,
}

impl ClosetService {
    pub fn new(coordinator: Arc<Coordinator>, client: StylistClient) -> Self {
        Self { coordinator, client }
    }

    /// Classify an uploaded photo and add the resulting item.
    ///
    /// Any failure, including an out-of-set category, leaves the catalog as it was.
    pub async fn add_from_upload(&self, image: ImageRef) -> Result<ClothingItem> {
        if self.coordinator.phase().await != Phase::Initialized {
            return Err(AppError::NotInitialized);
        }

        let classification = self.client.classify(&image).await?;

        self.coordinator
            .add_clothing_item(NewClothingItem {
                name: classification.name,
                category: classification.category,
                image,
            })
            .await
    }

    /// Add an item with a user-chosen name and category
    pub async fn add_manual(&self, name: &str, category: ClothingCategory, image: ImageRef) -> Result<ClothingItem> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Generic(
                "Please provide a name and an image for the item.".to_string(),
            ));
        }
        image.validate()?;

        self.coordinator
            .add_clothing_item(NewClothingItem {
                name: name.to_string(),
                category,
                image,
            })
            .await
    }

    pub async fn remove(&self, id: &str) -> Result<ClothingItem> {
        self.coordinator.remove_clothing_item(id).await
    }

    pub async fn grouped(&self) -> Vec<(ClothingCategory, Vec<ClothingItem>)> {
        self.coordinator.items_by_category().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Repository;
    use crate::remote::client::tests::StubApi;
    use crate::storage::Store;
    use crate::test_support::sample_image;
    use std::sync::atomic::Ordering;
    use tempfile::TempDir;

    async fn create_test_service(stub: Arc<StubApi>) -> (ClosetService, Arc<Coordinator>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let repo = Repository::new(Store::new(temp_dir.path().join("test.db")));
        let coordinator = Arc::new(Coordinator::new(repo, true));
        coordinator.initialize().await;

        let service = ClosetService::new(coordinator.clone(), StylistClient::new(stub));
        (service, coordinator, temp_dir)
    }

    #[tokio::test]
    async fn test_upload_adds_classified_item() {
        let stub = Arc::new(StubApi::classifying("Blue Denim Jacket", "Top"));
        let (service, coordinator, _temp) = create_test_service(stub).await;

        let item = service.add_from_upload(sample_image()).await.unwrap();

        assert_eq!(item.name, "Blue Denim Jacket");
        assert_eq!(item.category, ClothingCategory::Top);
        assert_eq!(coordinator.clothing_items().await, vec![item]);
    }

    #[tokio::test]
    async fn test_invalid_category_leaves_catalog_untouched() {
        let stub = Arc::new(StubApi::classifying("Sun Hat", "Hat"));
        let (service, coordinator, _temp) = create_test_service(stub).await;
        let mut events = coordinator.subscribe();

        let result = service.add_from_upload(sample_image()).await;
        coordinator.flush().await;

        assert!(matches!(result, Err(AppError::InvalidClassification(_))));
        assert!(coordinator.clothing_items().await.is_empty());
        assert!(events.try_recv().is_err(), "no save should have been scheduled");
    }

    #[tokio::test]
    async fn test_upload_before_initialize_skips_network() {
        let temp_dir = TempDir::new().unwrap();
        let repo = Repository::new(Store::new(temp_dir.path().join("test.db")));
        let coordinator = Arc::new(Coordinator::new(repo, true));
        let stub = Arc::new(StubApi::classifying("Tee", "Top"));
        let service = ClosetService::new(coordinator, StylistClient::new(stub.clone()));

        let result = service.add_from_upload(sample_image()).await;

        assert!(matches!(result, Err(AppError::NotInitialized)));
        assert_eq!(stub.classify_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_manual_add_requires_name() {
        let (service, coordinator, _temp) = create_test_service(Arc::new(StubApi::default())).await;

        assert!(service
            .add_manual("   ", ClothingCategory::Bottom, sample_image())
            .await
            .is_err());

        let item = service
            .add_manual("Pleated Skirt", ClothingCategory::Bottom, sample_image())
            .await
            .unwrap();
        assert_eq!(coordinator.clothing_items().await, vec![item]);
    }
}
