//! Remote classification and generation
//!
//! The styling service is an external collaborator reached through the
//! backend proxy. [`StylistApi`] is the raw transport seam; [`StylistClient`]
//! validates requests before they leave and normalizes what comes back.

pub mod client;
pub mod http;

pub use client::{Classification, StylistClient};
pub use http::HttpStylistApi;

use crate::database::{ClothingCategory, ClothingItem, ImageRef};
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/classify`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifyRequest {
    pub image: ImageRef,
}

/// Untrusted classification answer; every field is checked by the client
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassifyResponse {
    pub name: Option<String>,
    pub category: Option<String>,
}

/// Both reference photos, required for generation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferencePair {
    pub headshot: ImageRef,
    pub full_body: ImageRef,
}

/// A garment as sent to the generator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClothingItemPayload {
    pub name: String,
    pub category: ClothingCategory,
    pub image: ImageRef,
}

impl From<&ClothingItem> for ClothingItemPayload {
    fn from(item: &ClothingItem) -> Self {
        Self {
            name: item.name.clone(),
            category: item.category,
            image: item.image.clone(),
        }
    }
}

/// Body of `POST /api/generate`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub user_images: ReferencePair,
    pub items: Vec<ClothingItemPayload>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub base64_image: Option<String>,
}

/// Transport to the styling service
#[async_trait]
pub trait StylistApi: Send + Sync {
    async fn classify(&self, request: &ClassifyRequest) -> Result<ClassifyResponse>;

    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse>;
}
