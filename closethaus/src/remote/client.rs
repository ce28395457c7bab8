//! Validating client for the styling service
//!
//! Known-invalid requests fail here without a network round-trip, and
//! responses are checked against the closed category set before anything
//! reaches the wardrobe.

use super::{ClassifyRequest, ClothingItemPayload, GenerateRequest, ReferencePair, StylistApi};
use crate::database::{ClothingCategory, ClothingItem, ImageRef, UserImages};
use crate::error::{AppError, Result};
use serde::Serialize;
use std::sync::Arc;

/// A validated classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub name: String,
    pub category: ClothingCategory,
}

#[derive(Clone)]
pub struct StylistClient {
    api: Arc<dyn StylistApi>,
}

impl StylistClient {
    pub fn new(api: Arc<dyn StylistApi>) -> Self {
        Self { api }
    }

    /// Name and categorize a garment photo
    pub async fn classify(&self, image: &ImageRef) -> Result<Classification> {
        image.validate()?;

        tracing::info!("Classifying {} image", image.mime_type);

        let response = self
            .api
            .classify(&ClassifyRequest {
                image: image.clone(),
            })
            .await
            .inspect_err(|e| tracing::warn!("Classification failed: {}", e))?;

        let name = response
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| AppError::InvalidClassification("response has no name".to_string()))?;

        let category: ClothingCategory = response
            .category
            .ok_or_else(|| AppError::InvalidClassification("response has no category".to_string()))?
            .parse()?;

        tracing::info!("Classified as {} ({})", name, category);

        Ok(Classification { name, category })
    }

    /// Render the user wearing `items`; returns bare base64 image data.
    pub async fn generate_outfit(&self, user_images: &UserImages, items: &[ClothingItem]) -> Result<String> {
        let (headshot, full_body) = match (&user_images.headshot, &user_images.full_body) {
            (Some(headshot), Some(full_body)) => (headshot.clone(), full_body.clone()),
            _ => return Err(AppError::MissingReferenceImages),
        };

        if items.is_empty() {
            return Err(AppError::EmptySelection);
        }

        tracing::info!("Generating outfit with {} items", items.len());

        let request = GenerateRequest {
            user_images: ReferencePair {
                headshot,
                full_body,
            },
            items: items.iter().map(ClothingItemPayload::from).collect(),
        };

        let response = self
            .api
            .generate(&request)
            .await
            .inspect_err(|e| tracing::warn!("Outfit generation failed: {}", e))?;

        response
            .base64_image
            .map(|image| strip_data_url(&image).to_string())
            .filter(|image| !image.is_empty())
            .ok_or(AppError::NoImageProduced)
    }
}

/// Drop a `data:<mime>;base64,` prefix if the service added one
fn strip_data_url(image: &str) -> &str {
    if image.starts_with("data:") {
        if let Some((_, payload)) = image.split_once(";base64,") {
            return payload;
        }
    }
    image
}
