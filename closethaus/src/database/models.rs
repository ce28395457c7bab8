//! Wardrobe models
//!
//! Rust structs representing the persisted entities.
//! All models use serde with camelCase field names so stored records keep
//! the same shape the web frontend reads and writes.

use crate::config::{IMAGE_MIME_PREFIX, MAX_IMAGE_BYTES};
use crate::error::{AppError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicI64, Ordering};

/// An image carried inline as base64 text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRef {
    pub mime_type: String,
    /// Base64 of the raw image bytes, without a data-URL prefix
    pub data: String,
}

impl ImageRef {
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// Split a `data:<mime>;base64,<payload>` URL into an image reference.
    pub fn from_data_url(url: &str) -> Result<Self> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| AppError::InvalidImage("not a data URL".to_string()))?;

        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| AppError::InvalidImage("data URL has no payload".to_string()))?;

        let mime_type = header
            .strip_suffix(";base64")
            .ok_or_else(|| AppError::InvalidImage("data URL is not base64 encoded".to_string()))?;

        let image = Self::new(mime_type, payload);
        image.validate()?;
        Ok(image)
    }

    /// Rebuild the data URL for display
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    /// Check the MIME type, the encoding and the decoded size.
    pub fn validate(&self) -> Result<()> {
        if !self.mime_type.starts_with(IMAGE_MIME_PREFIX) {
            return Err(AppError::InvalidImage(format!(
                "unsupported type '{}'",
                self.mime_type
            )));
        }

        if self.data.is_empty() {
            return Err(AppError::InvalidImage("image data is empty".to_string()));
        }

        // Reject oversize payloads before paying for the decode
        if self.data.len() / 4 * 3 > MAX_IMAGE_BYTES + 3 {
            return Err(AppError::InvalidImage(format!(
                "image exceeds {} bytes",
                MAX_IMAGE_BYTES
            )));
        }

        let decoded = STANDARD
            .decode(self.data.as_bytes())
            .map_err(|e| AppError::InvalidImage(format!("invalid base64: {}", e)))?;

        if decoded.len() > MAX_IMAGE_BYTES {
            return Err(AppError::InvalidImage(format!(
                "image exceeds {} bytes",
                MAX_IMAGE_BYTES
            )));
        }

        Ok(())
    }
}

/// Which of the two onboarding photos an upload replaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReferenceKind {
    Headshot,
    FullBody,
}

/// The user's reference photos
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserImages {
    pub headshot: Option<ImageRef>,
    pub full_body: Option<ImageRef>,
}

impl UserImages {
    pub fn new(headshot: ImageRef, full_body: ImageRef) -> Self {
        Self {
            headshot: Some(headshot),
            full_body: Some(full_body),
        }
    }

    /// Both reference photos are present
    pub fn is_complete(&self) -> bool {
        self.headshot.is_some() && self.full_body.is_some()
    }

    pub fn set(&mut self, kind: ReferenceKind, image: ImageRef) {
        match kind {
            ReferenceKind::Headshot => self.headshot = Some(image),
            ReferenceKind::FullBody => self.full_body = Some(image),
        }
    }
}

/// Closed set of garment categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ClothingCategory {
    Top,
    Bottom,
    Shoes,
    Accessory,
}

impl ClothingCategory {
    /// Display order used by the closet and the mirror selector
    pub const ALL: [ClothingCategory; 4] = [
        ClothingCategory::Top,
        ClothingCategory::Bottom,
        ClothingCategory::Shoes,
        ClothingCategory::Accessory,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClothingCategory::Top => "Top",
            ClothingCategory::Bottom => "Bottom",
            ClothingCategory::Shoes => "Shoes",
            ClothingCategory::Accessory => "Accessory",
        }
    }
}

impl fmt::Display for ClothingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClothingCategory {
    type Err = AppError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ClothingCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s.trim())
            .ok_or_else(|| AppError::InvalidClassification(format!("unknown category '{}'", s)))
    }
}

/// A garment in the user's catalog. Never edited after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClothingItem {
    pub id: String,
    pub name: String,
    pub category: ClothingCategory,
    pub image: ImageRef,
}

/// Create clothing item request
#[derive(Debug, Clone, Deserialize)]
pub struct NewClothingItem {
    pub name: String,
    pub category: ClothingCategory,
    pub image: ImageRef,
}

impl NewClothingItem {
    /// Assign a fresh id
    pub fn into_item(self) -> ClothingItem {
        ClothingItem {
            id: next_id(),
            name: self.name,
            category: self.category,
            image: self.image,
        }
    }
}

/// A saved try-on result.
///
/// `items` is a copy of the garments at save time, so deleting one from the
/// catalog later leaves the outfit intact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outfit {
    pub id: String,
    /// Base64 of the generated composite
    pub image: String,
    pub items: Vec<ClothingItem>,
}

impl Outfit {
    pub fn new(image: String, items: Vec<ClothingItem>) -> Self {
        Self {
            id: next_id(),
            image,
            items,
        }
    }
}

/// In-memory copy of every collection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub user_images: UserImages,
    pub clothing_items: Vec<ClothingItem>,
    pub outfits: Vec<Outfit>,
}

static LAST_ID: AtomicI64 = AtomicI64::new(0);

/// Time-based id, strictly increasing within the process
pub fn next_id() -> String {
    let now = Utc::now().timestamp_millis();
    let mut last = LAST_ID.load(Ordering::Relaxed);

    loop {
        let candidate = if now > last { now } else { last + 1 };
        match LAST_ID.compare_exchange_weak(last, candidate, Ordering::SeqCst, Ordering::Relaxed) {
            Ok(_) => return candidate.to_string(),
            Err(actual) => last = actual,
        }
    }
}

/// Keep later ids above an id read back from storage.
///
/// Non-numeric ids are ignored.
pub fn observe_id(id: &str) {
    if let Ok(value) = id.parse::<i64>() {
        LAST_ID.fetch_max(value, Ordering::SeqCst);
    }
}
